use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ConflictService;
use crate::middlewares::RequireJWT;
use crate::models::conflicts::responses::ConflictDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 课程内的评语冲突列表
/// GET /courses/{course_id}/conflicts
pub async fn list_conflicts(
    service: &ConflictService,
    request: &HttpRequest,
    course_id: i64,
    include_solved: bool,
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

    if !policy::allowed(Operation::ViewConflicts, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有课程教师可以复核评语冲突",
        )));
    }

    match storage.list_conflicts_for_course(course_id, include_solved).await {
        Ok(conflicts) => {
            let response: Vec<ConflictDetailResponse> = conflicts
                .into_iter()
                .map(|(conflict, first_feedback, second_feedback)| ConflictDetailResponse {
                    conflict,
                    first_feedback,
                    second_feedback,
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询冲突列表失败: {e}"),
            )),
        ),
    }
}
