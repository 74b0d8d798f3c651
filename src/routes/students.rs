use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::reports::StudentAssignmentsQuery;
use crate::models::users::entities::UserRole;
use crate::services::ReportService;

// 学生跨班级作业概览
pub async fn my_assignments(
    req: HttpRequest,
    service: web::Data<ReportService>,
    query: web::Query<StudentAssignmentsQuery>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let overview = service
        .student_assignments(user.id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(overview, "获取作业概览成功")))
}

// 学生成绩
pub async fn my_grades(
    req: HttpRequest,
    service: web::Data<ReportService>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let grades = service.student_grades(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(grades, "获取成绩成功")))
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students/me")
            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/assignments").route(web::get().to(my_assignments)))
            .service(web::resource("/grades").route(web::get().to(my_grades))),
    );
}
