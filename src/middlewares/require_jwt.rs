/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <JWT_TOKEN>`，从存储中加载用户并放入请求扩展，
 * 处理程序通过 [`RequireJWT::current_user`] 取得调用者身份。
 *
 * ```rust,ignore
 * web::scope("/api/v1")
 *     .wrap(RequireJWT)
 *     .route("/notifications", web::get().to(list_notifications))
 * ```
 *
 * 令牌缺失、无效、过期或用户不存在时返回 401。
 */

use crate::errors::{LmsError, Result as LmsResult};
use crate::models::users::entities::{User, UserRole};
use crate::models::ErrorCode;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

// 辅助函数：提取并验证 JWT access token
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Storage not configured".to_string())?;

    storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| format!("Failed to retrieve user from storage: {e}"))?
        .ok_or_else(|| "User not found".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取当前用户
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 从请求扩展中提取用户角色
    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role.clone())
    }

    /// 处理程序中使用：未经过中间件时返回认证错误
    pub fn current_user(req: &HttpRequest) -> LmsResult<User> {
        Self::extract_user(req).ok_or_else(|| LmsError::authentication("无法获取用户信息"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_fixture;
    use actix_web::{App, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> actix_web::Result<HttpResponse> {
        let user = RequireJWT::current_user(&req)?;
        Ok(HttpResponse::Ok().body(user.id.to_string()))
    }

    #[actix_web::test]
    async fn test_missing_header_is_unauthorized() {
        let fixture = seed_fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.storage.clone()))
                .service(
                    web::scope("/api")
                        .wrap(RequireJWT)
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_valid_token_loads_user() {
        let fixture = seed_fixture().await;
        let token = JwtUtils::generate_access_token(fixture.teacher.id, "teacher")
            .expect("token");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.storage.clone()))
                .service(
                    web::scope("/api")
                        .wrap(RequireJWT)
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header((AUTHORIZATION_HEADER, format!("{BEARER_PREFIX}{token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, fixture.teacher.id.to_string().as_bytes());
    }
}
