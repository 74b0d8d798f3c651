use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::users::entities::UserRole;
use crate::services::ReportService;

// 教师看板
pub async fn my_dashboard(
    req: HttpRequest,
    service: web::Data<ReportService>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let dashboard = service.teacher_dashboard(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(dashboard, "获取看板成功")))
}

// 配置路由
pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teachers/me")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/dashboard").route(web::get().to(my_dashboard))),
    );
}
