use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 批改者当前持有的锁列表
/// GET /courses/{course_id}/assessments/locked
pub async fn list_locked_submissions(
    service: &AssessmentService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let caller = match build_caller(&storage, &current_user, course_id).await {
        Ok(caller) => caller,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询课程成员失败: {e}"),
                )),
            );
        }
    };

    if !policy::allowed(Operation::ViewLockedSubmissions, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看批改锁的权限",
        )));
    }

    match storage.list_locked_submissions(current_user.id, course_id).await {
        Ok(locks) => Ok(HttpResponse::Ok().json(ApiResponse::success(locks, "查询成功"))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询批改锁失败: {e}"),
            )),
        ),
    }
}
