use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::assignments::requests::{CreateAssignmentRequest, UpdateAssignmentRequest};
use crate::models::submissions::requests::SubmitAssignmentRequest;
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, SubmissionService};

// 创建作业（草稿）
pub async fn create_assignment(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let created = service.create(&user, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(created, "作业创建成功")))
}

// 获取作业详情
pub async fn get_assignment(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let detail = service.get_detail(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "获取作业详情成功")))
}

// 更新作业
pub async fn update_assignment(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let updated = service
        .update(path.into_inner(), user.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "作业更新成功")))
}

// 删除作业
pub async fn delete_assignment(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    service.delete(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("作业删除成功")))
}

// 发布作业
pub async fn publish_assignment(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let published = service.publish(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(published, "作业发布成功")))
}

// 学生提交作业
pub async fn submit_assignment(
    req: HttpRequest,
    service: web::Data<SubmissionService>,
    path: web::Path<i64>,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let response = service
        .submit(path.into_inner(), &user, body.into_inner())
        .await?;
    let message = response.message.clone();
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
}

// 教师查看作业的最新提交
pub async fn list_submissions(
    req: HttpRequest,
    service: web::Data<SubmissionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let items = service.list_for_assignment(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "获取提交列表成功")))
}

// 学生查看自己的提交历史
pub async fn submission_history(
    req: HttpRequest,
    service: web::Data<SubmissionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let history = service.history(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(history, "获取提交历史成功")))
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_assignment)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{id}")
                    // 详情 - 业务层检查班级关系
                    .route(web::get().to(get_assignment))
                    .route(
                        web::put()
                            .to(update_assignment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_assignment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/publish").route(
                    web::patch()
                        .to(publish_assignment)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{id}/submit").route(
                    web::post()
                        .to(submit_assignment)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            )
            .service(
                web::resource("/{id}/submissions").route(
                    web::get()
                        .to(list_submissions)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{id}/history").route(
                    web::get()
                        .to(submission_history)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            ),
    );
}
