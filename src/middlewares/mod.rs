//! HTTP 中间件
//!
//! - `RequireJWT`: 验证访问令牌并把用户注入请求扩展
//! - `RequireCourseRole`: 课程内角色校验（须在 RequireJWT 之后）
//! - `RateLimit`: 基于 moka 的请求频率限制

pub mod rate_limit;
pub mod require_course_role;
pub mod require_jwt;

pub use rate_limit::RateLimit;
pub use require_course_role::RequireCourseRole;
pub use require_jwt::RequireJWT;

use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

use crate::models::{ApiResponse, ErrorCode};

/// 中间件统一的 JSON 错误响应
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()>::error_empty(code, message))
}
