use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ConflictService, is_feedback_assessor};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 与某条评语相关的未解决冲突所涉及的提交
/// GET /feedbacks/{feedback_id}/conflicts
pub async fn get_conflicting_submissions(
    service: &ConflictService,
    request: &HttpRequest,
    feedback_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let feedback = match storage.get_feedback_by_id(feedback_id).await {
        Ok(Some(feedback)) => feedback,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::NotFound, "评语不存在")));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询评语失败: {e}"),
                )),
            );
        }
    };

    let course_id = match storage.get_course_id_for_result(feedback.result_id).await {
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

    let is_original_assessor =
        match is_feedback_assessor(&storage, feedback_id, current_user.id).await {
            Ok(value) => value,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("查询批改结果失败: {e}"),
                    )),
                );
            }
        };

    let ownership = Ownership {
        is_original_assessor,
        ..Default::default()
    };

    if !policy::allowed(Operation::ViewFeedbackConflicts, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有该评语的批改者或课程教师可以查看相关冲突",
        )));
    }

    match storage.list_conflicting_submissions(feedback_id).await {
        Ok(submissions) => Ok(HttpResponse::Ok().json(ApiResponse::success(submissions, "查询成功"))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询冲突提交失败: {e}"),
            )),
        ),
    }
}
