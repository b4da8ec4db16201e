/*!
 * JWT 认证中间件
 *
 * 验证 Authorization 头中的 Bearer 访问令牌，通过缓存或存储层解析出
 * 用户信息并注入请求扩展，供后续中间件与处理函数使用。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::require_jwt::RequireJWT;
 *
 * App::new()
 *     .service(
 *         web::scope("/api/v1")
 *             .wrap(RequireJWT)
 *             .route("/me", web::get().to(me_handler))
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    cache::ObjectCache,
    config::AppConfig,
    models::{
        ErrorCode,
        users::entities::{User, UserRole, UserStatus},
    },
    storage::Storage,
    utils::jwt::{Claims, JwtUtils},
};

use super::create_error_response;

pub struct RequireJWT;

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
            // CORS 预检请求直接放行
            if req.method() == Method::OPTIONS {
                let response = actix_web::HttpResponse::NoContent().finish();
                return Ok(req.into_response(response.map_into_right_body()));
            }

            match extract_and_validate_jwt(&req).await {
                Ok((claims, user)) => {
                    req.extensions_mut().insert(claims);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(message) => {
                    debug!("JWT validation failed: {}", message);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            message,
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

/// 提取并校验访问令牌，返回 Claims 和对应的用户
async fn extract_and_validate_jwt(
    req: &ServiceRequest,
) -> Result<(Claims, User), &'static str> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or("缺少 Authorization 头")?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or("Authorization 头格式错误")?;

    let claims = JwtUtils::verify_access_token(token).map_err(|_| "访问令牌无效或已过期")?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| "访问令牌无效或已过期")?;

    let user = resolve_user(req, token, user_id).await?;

    if user.status != UserStatus::Active {
        warn!("Rejected token for non-active user {}", user.id);
        return Err("账户已被停用");
    }

    Ok((claims, user))
}

/// 先查缓存再落库，命中存储后回填缓存
async fn resolve_user(
    req: &ServiceRequest,
    token: &str,
    user_id: i64,
) -> Result<User, &'static str> {
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());

    let cache_key = format!("user:{token}");

    if let Some(ref cache) = cache
        && let crate::cache::CacheResult::Found(user) = cache.get::<User>(&cache_key).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or("服务内部错误")?
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|_| "服务内部错误")?
        .ok_or("用户不存在")?;

    if let Some(cache) = cache {
        let ttl = AppConfig::get().cache.default_ttl;
        cache.insert(cache_key, &user, ttl).await;
    }

    Ok(user)
}

// 辅助函数：在应用了 RequireJWT 的路由处理程序中读取注入的用户信息
impl RequireJWT {
    /// 从请求扩展中提取完整用户
    pub fn extract_user(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 从请求扩展中提取令牌 Claims
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<Claims> {
        req.extensions().get::<Claims>().cloned()
    }

    /// 从请求扩展中提取用户 ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 从请求扩展中提取用户全局角色
    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role.clone())
    }
}
