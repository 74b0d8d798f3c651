use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::Utc;

use crate::config::AppConfig;
use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::notifications::requests::{CleanupQuery, NotificationListQuery, ReminderRunQuery};
use crate::models::users::entities::UserRole;
use crate::services::NotificationService;

// 当前用户的通知列表
pub async fn list_notifications(
    req: HttpRequest,
    service: web::Data<NotificationService>,
    query: web::Query<NotificationListQuery>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let list = service.list(user.id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(list, "获取通知列表成功")))
}

// 未读数量
pub async fn unread_count(
    req: HttpRequest,
    service: web::Data<NotificationService>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let count = service.unread_count(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(count, "获取未读数量成功")))
}

// 标记单条已读
pub async fn mark_read(
    req: HttpRequest,
    service: web::Data<NotificationService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let delivery = service.mark_read(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(delivery, "已标记为已读")))
}

// 全部标记已读
pub async fn mark_all_read(
    req: HttpRequest,
    service: web::Data<NotificationService>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let result = service.mark_all_read(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "已全部标记为已读")))
}

// 某班级相关的通知
pub async fn list_class_notifications(
    req: HttpRequest,
    service: web::Data<NotificationService>,
    path: web::Path<i64>,
    query: web::Query<NotificationListQuery>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let list = service
        .list_for_class(&user, path.into_inner(), query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(list, "获取班级通知成功")))
}

// 手动触发截止提醒
pub async fn run_deadline_reminders(
    service: web::Data<NotificationService>,
    query: web::Query<ReminderRunQuery>,
) -> ActixResult<HttpResponse> {
    let window_hours = query
        .window_hours
        .filter(|h| *h > 0)
        .unwrap_or(AppConfig::get().scheduler.reminder_window_hours);
    let summary = service.deadline_reminders(Utc::now(), window_hours).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "截止提醒已执行")))
}

// 通知统计
pub async fn notification_stats(
    service: web::Data<NotificationService>,
) -> ActixResult<HttpResponse> {
    let stats = service.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "获取通知统计成功")))
}

// 清理旧通知
pub async fn cleanup_notifications(
    service: web::Data<NotificationService>,
    query: web::Query<CleanupQuery>,
) -> ActixResult<HttpResponse> {
    let result = service
        .cleanup_old_notifications(query.days, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "旧通知清理完成")))
}

// 配置路由
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(list_notifications)))
            .service(web::resource("/unread-count").route(web::get().to(unread_count)))
            .service(web::resource("/read-all").route(web::patch().to(mark_all_read)))
            .service(
                web::resource("/class/{class_id}").route(web::get().to(list_class_notifications)),
            )
            // 管理员维护接口
            .service(
                web::resource("/deadline-reminders")
                    .route(web::post().to(run_deadline_reminders))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/stats")
                    .route(web::get().to(notification_stats))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/cleanup")
                    .route(web::delete().to(cleanup_notifications))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(web::resource("/{id}/read").route(web::patch().to(mark_read))),
    );
}
