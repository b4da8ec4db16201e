use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ConflictService, is_feedback_assessor};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 标记冲突已解决
/// PUT /conflicts/{conflict_id}/solve
pub async fn solve_conflict(
    service: &ConflictService,
    request: &HttpRequest,
    conflict_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let conflict = match storage.get_conflict_by_id(conflict_id).await {
        Ok(Some(conflict)) => conflict,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ConflictNotFound,
                "冲突不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询冲突失败: {e}"),
                )),
            );
        }
    };

    let course_id = match storage.get_course_id_for_conflict(conflict_id).await {
        Ok(Some(course_id)) => course_id,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "课程不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询课程失败: {e}"),
                )),
            );
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

    // 冲突两侧任意一条评语的原批改者即可复核
    let mut is_original_assessor = false;
    for feedback_id in [conflict.first_feedback_id, conflict.second_feedback_id] {
        match is_feedback_assessor(&storage, feedback_id, current_user.id).await {
            Ok(true) => {
                is_original_assessor = true;
                break;
            }
            Ok(false) => {}
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("查询批改结果失败: {e}"),
                    )),
                );
            }
        }
    }

    let ownership = Ownership {
        is_original_assessor,
        ..Default::default()
    };

    if !policy::allowed(Operation::SolveConflict, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有原批改者或课程教师可以复核评语冲突",
        )));
    }

    // 幂等：重复复核与并发复核都返回成功
    if conflict.solved {
        return Ok(HttpResponse::Ok().json(ApiResponse::success_empty("冲突已标记为解决")));
    }

    match storage.solve_conflict(conflict_id).await {
        Ok(true) => {
            info!("User {} solved conflict {}", current_user.id, conflict_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("冲突已标记为解决")))
        }
        // 条件更新未命中：另一位复核者刚刚标记过，结果相同
        Ok(false) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("冲突已标记为解决"))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("更新冲突失败: {e}"),
            )),
        ),
    }
}
