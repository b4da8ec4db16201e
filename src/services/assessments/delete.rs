use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 删除已完成的批改结果（仅课程教师与管理员）
/// DELETE /results/{result_id}
///
/// 连带删除评语、解除文本块关联、删除关联的申诉与裁决，
/// 提交回到未批改状态，可被重新锁定。
pub async fn delete_assessment(
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

    let course_id = match storage.get_course_id_for_result(result.id).await {
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

    if !policy::allowed(Operation::DeleteAssessment, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有课程教师可以删除批改结果",
        )));
    }

    match storage.delete_result(result_id).await {
        Ok(true) => {
            info!("User {} deleted result {}", current_user.id, result_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("批改结果已删除")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ResultNotFound,
            "批改结果不存在",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("删除批改结果失败: {e}"),
            )),
        ),
    }
}
