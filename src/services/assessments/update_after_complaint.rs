use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AssessmentService;
use super::submit::parse_text_block_reference;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::compute_score;
use crate::models::assessments::requests::AssessmentUpdateRequest;
use crate::models::assessments::responses::AssessmentResponse;
use crate::models::complaints::entities::ComplaintKind;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};
use crate::utils::validate::{validate_complaint_text, validate_feedbacks};

/// 申诉裁决 + 批改更新，一次请求完成
/// PUT /complaints/{complaint_id}/assessment
///
/// 裁决先行：complaint_id 唯一索引保证一条申诉只被处理一次，
/// 竞争中落败的请求拿到 None 并返回 400。裁决接受时才改写评语与分数；
/// more_feedback 类型只补评语，不改分。
pub async fn update_after_complaint(
    service: &AssessmentService,
    request: &HttpRequest,
    complaint_id: i64,
    req: AssessmentUpdateRequest,
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

    let complaint = match storage.get_complaint_by_id(complaint_id).await {
        Ok(Some(with_response)) => {
            if with_response.response.is_some() || !with_response.complaint.is_pending() {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ComplaintAlreadyExists,
                    "该申诉已有裁决",
                )));
            }
            with_response.complaint
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ComplaintNotFound,
                "申诉不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询申诉失败: {e}"),
                )),
            );
        }
    };

    let result = match storage.get_result_by_id(complaint.result_id).await {
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

    // 申诉只针对已完成的批改，锁定中的结果不接受裁决
    if !result.is_completed() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ResultNotCompleted,
            "被申诉的批改尚未完成",
        )));
    }

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

    let course = match storage.get_course_by_id(exercise.course_id).await {
        Ok(Some(course)) => course,
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

    let caller = match build_caller(&storage, &current_user, course.id).await {
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
        is_original_assessor: result.assessor_id == Some(current_user.id),
        ..Default::default()
    };

    if !policy::allowed(Operation::UpdateAfterComplaint, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有裁决该申诉的权限（原批改者不得裁决针对自己的申诉）",
        )));
    }

    let ruling = &req.complaint_response;

    // 裁决说明：驳回时必填，长度受课程配置约束
    match ruling.response_text.as_deref() {
        Some(text) => {
            if let Err(message) =
                validate_complaint_text(text, course.max_complaint_response_text_limit)
            {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::ComplaintTextTooLong, message)));
            }
        }
        None if !ruling.accepted => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "驳回申诉必须填写裁决说明",
            )));
        }
        None => {}
    }

    if ruling.accepted {
        if let Err(message) =
            validate_feedbacks(&req.feedbacks, config.assessment.max_reference_length)
        {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::InvalidFeedback, message)));
        }
    }

    // 裁决先写入，唯一索引仲裁并发
    let ruled = match storage
        .respond_to_complaint(
            complaint_id,
            ruling.accepted,
            ruling.response_text.clone(),
            current_user.id,
        )
        .await
    {
        Ok(Some(response)) => response,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ComplaintAlreadyExists,
                "该申诉已有裁决",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("写入裁决失败: {e}"),
                )),
            );
        }
    };

    info!(
        "User {} ruled complaint {} (accepted: {})",
        current_user.id, complaint_id, ruled.accepted
    );

    let mut feedbacks = match storage.get_feedbacks_for_result(result.id).await {
        Ok(feedbacks) => feedbacks,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询评语失败: {e}"),
                )),
            );
        }
    };

    if ruling.accepted {
        feedbacks = match storage.replace_feedbacks(result.id, req.feedbacks).await {
            Ok(feedbacks) => feedbacks,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("更新评语失败: {e}"),
                    )),
                );
            }
        };

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

        // more_feedback 只补评语，正式申诉同时改写分数
        if complaint.kind == ComplaintKind::Complaint {
            let score = compute_score(feedbacks.iter().map(|f| f.credits), exercise.max_points);
            match storage.update_result_score(result.id, score).await {
                Ok(true) => {}
                // 条件更新只命中 completed 状态的行，0 行说明结果被并发改动
                Ok(false) => {
                    return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                        ErrorCode::AssessmentConflict,
                        "批改状态已变化，分数未更新",
                    )));
                }
                Err(e) => {
                    return Ok(
                        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                            ErrorCode::InternalServerError,
                            format!("更新分数失败: {e}"),
                        )),
                    );
                }
            }
        }
    }

    let result = match storage.get_result_by_id(result.id).await {
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

    let response = AssessmentResponse { result, feedbacks };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "申诉已处理")))
}
