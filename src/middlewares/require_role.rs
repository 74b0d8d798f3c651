/*!
 * 基于角色的访问控制中间件
 *
 * 必须在 RequireJWT 之后使用：
 *
 * ```rust,ignore
 * web::resource("/dashboard")
 *     .route(web::get().to(teacher_dashboard))
 *     .wrap(RequireRole::new_any(UserRole::teacher_roles()))
 * ```
 *
 * 班级级别的权限（授课、选课）由服务层检查，这里只看全局角色。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::{
    middlewares::RequireJWT,
    models::{ErrorCode, users::entities::UserRole},
};

use super::create_error_response;

/// 允许访问的角色集合，均来自 `UserRole::*_roles()`
#[derive(Clone, Copy)]
pub struct RequireRole {
    allowed: &'static [&'static UserRole],
}

impl RequireRole {
    pub fn new_any(allowed: &'static [&'static UserRole]) -> Self {
        Self { allowed }
    }

    fn allows(&self, role: &UserRole) -> bool {
        self.allowed.iter().any(|r| *r == role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            gate: *self,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    gate: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let gate = self.gate;

        Box::pin(async move {
            let (status, code, message) = match RequireJWT::extract_user_role(req.request()) {
                Some(role) if gate.allows(&role) => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some(role) => {
                    info!("角色 {} 无权访问 {}", role, req.path());
                    (StatusCode::FORBIDDEN, ErrorCode::Forbidden, "当前角色无权执行此操作")
                }
                // 未挂载 RequireJWT
                None => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, "需要登录"),
            };

            Ok(req.into_response(
                create_error_response(status, code, message).map_into_right_body(),
            ))
        })
    }
}
