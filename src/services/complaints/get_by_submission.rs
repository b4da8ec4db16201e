use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComplaintService;
use super::get::filter_for_viewer;
use crate::middlewares::RequireJWT;
use crate::models::complaints::responses::SubmissionComplaintResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::anonymize;
use crate::utils::policy::{self, Operation, Ownership};

/// 查看提交上的申诉
/// GET /submissions/{submission_id}/complaint
///
/// 响应嵌入被申诉结果及其上下文。批改者身份只对申诉发起者本人、
/// 课程教师和团队练习中负责该团队的助教可见；提交和练习收缩为
/// 空壳拷贝，避免携带无关内容。
pub async fn get_complaint_for_submission(
    service: &ComplaintService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let with_response = match storage.get_complaint_by_submission(submission_id).await {
        Ok(Some(with_response)) => with_response,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ComplaintNotFound,
                "该提交没有申诉",
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

    let result = match storage.get_result_by_id(with_response.complaint.result_id).await {
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

    let (submission, participation) = match storage
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

    let is_owner = participation.owned_by(current_user.id);
    let ownership = Ownership {
        is_submission_owner: is_owner,
        ..Default::default()
    };

    if !policy::allowed(Operation::ViewComplaint, &caller, ownership) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看该申诉的权限",
        )));
    }

    let is_staff = caller.is_staff();
    let is_submitter = with_response.complaint.submitter_id == Some(current_user.id);
    // 团队练习中负责该团队的助教可以看到批改者
    let is_owning_team_tutor =
        participation.team_id.is_some() && participation.team_tutor_id == Some(current_user.id);

    let result = if is_staff || is_submitter || is_owning_team_tutor {
        result
    } else {
        anonymize::hide_assessor(result)
    };

    let participation = anonymize::participant_for_viewer(participation, is_staff || is_owner);

    let filtered = filter_for_viewer(with_response, &current_user.role, is_owner);

    let response = SubmissionComplaintResponse {
        complaint: filtered.complaint,
        response: filtered.response,
        result,
        participation,
        submission: submission.reference_copy(),
        exercise: exercise.reference_copy(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}
