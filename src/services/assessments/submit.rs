use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::compute_score;
use crate::models::assessments::requests::SubmitAssessmentRequest;
use crate::models::assessments::responses::AssessmentResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::services::conflicts::detect;
use crate::utils::policy::{self, Operation, Ownership};
use crate::utils::validate::validate_feedbacks;

/// 解析评语引用指向的文本块 ID，接受 "block:12" 或纯数字
pub(crate) fn parse_text_block_reference(reference: &str) -> Option<i64> {
    reference
        .strip_prefix("block:")
        .unwrap_or(reference)
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
}

/// 保存草稿或完成批改
/// PUT /results/{result_id}/assessment
///
/// submit = false 整组替换评语、锁保持；submit = true 额外合计分数、
/// 条件更新完成状态并触发冲突检测。
pub async fn save_or_submit(
    service: &AssessmentService,
    request: &HttpRequest,
    result_id: i64,
    req: SubmitAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

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

    let (_, participation) = match storage
        .get_submission_with_participation(result.submission_id)
        .await
    {
        Ok(Some(pair)) => pair,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询提交失败: {e}"),
                )),
            );
        }
    };

    let exercise = match storage.get_exercise_by_id(participation.exercise_id).await {
        Ok(Some(exercise)) => exercise,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExerciseNotFound,
                "练习不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询练习失败: {e}"),
                )),
            );
        }
    };

    let caller = match build_caller(&storage, &current_user, exercise.course_id).await {
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
    let operation = if req.submit {
        Operation::SubmitAssessment
    } else {
        Operation::SaveAssessment
    };

    if !policy::allowed(operation, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotAssessmentLockHolder,
            "只有锁持有者可以保存或提交批改",
        )));
    }

    if result.is_completed() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AssessmentConflict,
            "该批改已完成，不能再修改",
        )));
    }

    if let Err(message) = validate_feedbacks(&req.feedbacks, config.assessment.max_reference_length)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidFeedback, message)));
    }

    let feedbacks = match storage.replace_feedbacks(result_id, req.feedbacks).await {
        Ok(feedbacks) => feedbacks,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("保存评语失败: {e}"),
                )),
            );
        }
    };

    // 关联引用的文本块；引用格式非法不阻断保存，只记录日志
    for feedback in &feedbacks {
        let Some(reference) = feedback.reference.as_deref() else {
            continue;
        };
        match parse_text_block_reference(reference) {
            Some(block_id) => {
                if let Err(e) = storage
                    .set_text_block_feedback(block_id, Some(feedback.id))
                    .await
                {
                    warn!("Failed to link text block {}: {}", block_id, e);
                }
            }
            None => {
                warn!(
                    "Feedback {} carries an unparseable text block reference: {}",
                    feedback.id, reference
                );
            }
        }
    }

    if !req.submit {
        let response = AssessmentResponse { result, feedbacks };
        return Ok(HttpResponse::Ok().json(ApiResponse::success(response, "草稿已保存")));
    }

    let score = compute_score(feedbacks.iter().map(|f| f.credits), exercise.max_points);

    match storage
        .finalize_result(result_id, current_user.id, score, true)
        .await
    {
        Ok(true) => {}
        // 条件更新未命中：锁已被释放或被管理员接管
        Ok(false) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AssessmentConflict,
                "批改状态已变化，提交失败",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("提交批改失败: {e}"),
                )),
            );
        }
    }

    info!(
        "User {} completed assessment for result {} (score {})",
        current_user.id, result_id, score
    );

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

    // 启用自动批改的文本练习在完成后异步检测评语冲突，不阻塞响应
    if detect::should_detect(&exercise) {
        let storage = storage.clone();
        let exercise = exercise.clone();
        tokio::spawn(async move {
            detect::run_detection(storage, exercise).await;
        });
    }

    let response = AssessmentResponse { result, feedbacks };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "批改已完成")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_block_reference() {
        assert_eq!(parse_text_block_reference("block:12"), Some(12));
        assert_eq!(parse_text_block_reference("12"), Some(12));
        assert_eq!(parse_text_block_reference("block:0"), None);
        assert_eq!(parse_text_block_reference("block:-3"), None);
        assert_eq!(parse_text_block_reference("paragraph two"), None);
    }
}
