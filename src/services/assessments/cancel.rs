use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 取消批改并释放锁
/// DELETE /results/{result_id}/lock
///
/// 锁持有者本人可取消；课程教师与管理员可替他人强制解锁。
/// 释放同时丢弃草稿评语。
pub async fn cancel_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    result_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let result = match storage.get_result_by_id(result_id).await {
        Ok(Some(result)) => result,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ResultNotFound,
                "批改结果不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询批改结果失败: {e}"),
                )),
            );
        }
    };

    if result.is_completed() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "已完成的批改不能取消，请使用删除操作",
        )));
    }

    let course_id = match storage.get_course_id_for_result(result_id).await {
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

    let ownership = Ownership {
        is_lock_holder: result.held_by(current_user.id),
        ..Default::default()
    };

    if !policy::allowed(Operation::CancelAssessment, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotAssessmentLockHolder,
            "只有锁持有者或课程教师可以取消批改",
        )));
    }

    // 持有者本人带条件删除；策略已放行的教师/管理员强制解锁不校验持有人
    let assessor_filter = if ownership.is_lock_holder {
        Some(current_user.id)
    } else {
        None
    };

    match storage.release_result(result_id, assessor_filter).await {
        Ok(true) => {
            info!("User {} released lock on result {}", current_user.id, result_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("批改已取消，锁已释放")))
        }
        // 条件删除未命中：锁已被释放或已完成
        Ok(false) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AssessmentConflict,
            "批改状态已变化，取消失败",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("取消批改失败: {e}"),
            )),
        ),
    }
}
