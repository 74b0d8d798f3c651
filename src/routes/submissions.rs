use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::users::entities::UserRole;
use crate::services::SubmissionService;

// 批改提交
pub async fn grade_submission(
    req: HttpRequest,
    service: web::Data<SubmissionService>,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let graded = service
        .grade(path.into_inner(), user.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(graded, "批改成功")))
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/grade")
                    .route(web::put().to(grade_submission))
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            ),
    );
}
