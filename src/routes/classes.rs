use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT};
use crate::models::ApiResponse;
use crate::models::classes::requests::JoinClassRequest;
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, ClassService};

// 通过选课码加入班级
pub async fn join_class(
    req: HttpRequest,
    service: web::Data<ClassService>,
    body: web::Json<JoinClassRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let class = service.join_by_code(&user, &body.enrollment_code).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(class, "加入班级成功")))
}

// 列出班级作业（按角色返回不同形态）
pub async fn list_class_assignments(
    req: HttpRequest,
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let list = service.list_for_class(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(list, "获取作业列表成功")))
}

// 配置路由
pub fn configure_class_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/join")
                    .route(web::post().to(join_class))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/{class_id}/assignments")
                    // 业务层检查班级成员资格
                    .route(web::get().to(list_class_assignments)),
            ),
    );
}
