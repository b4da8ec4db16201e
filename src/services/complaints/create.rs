use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ComplaintService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::AssessmentType;
use crate::models::complaints::requests::CreateComplaintRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};
use crate::utils::validate::validate_complaint_text;

/// 学生对已完成的批改发起申诉
/// POST /complaints
///
/// result_id 唯一索引保证每个结果最多一条申诉；配额只统计
/// complaint 类型，more_feedback 不占配额也不改分。
pub async fn create_complaint(
    service: &ComplaintService,
    request: &HttpRequest,
    req: CreateComplaintRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let result = match storage.get_result_by_id(req.result_id).await {
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

    if !result.is_completed() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ResultNotCompleted,
            "批改尚未完成，不能申诉",
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
        is_submission_owner: participation.owned_by(current_user.id),
        ..Default::default()
    };

    if !policy::allowed(Operation::CreateComplaint, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有提交所属的学生本人可以申诉",
        )));
    }

    // 申诉路径校验：考试练习必须走考试路径，普通练习必须走课程路径
    if exercise.exam_exercise {
        if req.exam_id.is_none() || req.exam_id != exercise.exam_id {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::WrongComplaintPath,
                "考试练习的申诉必须通过所属考试发起",
            )));
        }
    } else if req.exam_id.is_some() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::WrongComplaintPath,
            "普通课程练习的申诉不能携带考试标识",
        )));
    }

    // 自动批改的结果默认不可申诉，练习可显式开启
    if result.assessment_type == AssessmentType::Automatic
        && !exercise.allow_complaints_for_automatic_assessments
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "该练习不允许对自动批改结果申诉",
        )));
    }

    // 申诉时限以结果完成时间为起点
    if let Some(completion_date) = result.completion_date {
        let deadline = course.complaint_deadline(completion_date);
        if chrono::Utc::now() > deadline {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ComplaintDeadlinePassed,
                format!("申诉期限已过（完成后 {} 天内有效）", course.max_complaint_time_days),
            )));
        }
    }

    if let Err(message) =
        validate_complaint_text(&req.complaint_text, course.max_complaint_text_limit)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ComplaintTextTooLong, message)));
    }

    // 配额只统计 complaint 类型
    if req.kind.counts_against_quota() {
        let used = match storage
            .count_complaints_by_student_in_course(current_user.id, course.id)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("统计申诉配额失败: {e}"),
                    )),
                );
            }
        };

        if used >= course.max_complaints as u64 {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ComplaintLimitReached,
                format!("已用完本课程的申诉配额（{}）", course.max_complaints),
            )));
        }
    }

    match storage
        .create_complaint(
            req.result_id,
            req.kind,
            &req.complaint_text,
            current_user.id,
            req.exam_id,
        )
        .await
    {
        Ok(Some(complaint)) => {
            info!(
                "User {} filed a {} against result {}",
                current_user.id, complaint.kind, req.result_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(complaint, "申诉已提交")))
        }
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ComplaintAlreadyExists,
            "该批改结果已有申诉",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("创建申诉失败: {e}"),
            )),
        ),
    }
}
