use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComplaintService;
use crate::middlewares::RequireJWT;
use crate::models::complaints::responses::ComplaintWithResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::utils::anonymize;
use crate::utils::policy::{self, Operation, Ownership};

/// 查看申诉详情
/// GET /complaints/{complaint_id}
///
/// 双盲视角：学生看不到裁决者，批改者看不到申诉发起者，
/// 管理员不过滤。
pub async fn get_complaint(
    service: &ComplaintService,
    request: &HttpRequest,
    complaint_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let with_response = match storage.get_complaint_by_id(complaint_id).await {
        Ok(Some(with_response)) => with_response,
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

    let response = filter_for_viewer(with_response, &current_user.role, is_owner);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}

/// 按调用者视角应用双盲过滤
pub(crate) fn filter_for_viewer(
    mut with_response: ComplaintWithResponse,
    viewer_role: &UserRole,
    is_submission_owner: bool,
) -> ComplaintWithResponse {
    if *viewer_role == UserRole::Admin {
        return with_response;
    }

    if is_submission_owner {
        // 学生视角：裁决者匿名
        with_response.response = with_response
            .response
            .map(anonymize::hide_complaint_reviewer);
    } else {
        // 批改者视角：申诉发起者匿名
        with_response.complaint = anonymize::hide_complaint_submitter(with_response.complaint);
    }

    with_response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaints::entities::{Complaint, ComplaintKind, ComplaintResponse};

    fn sample() -> ComplaintWithResponse {
        ComplaintWithResponse {
            complaint: Complaint {
                id: 1,
                result_id: 2,
                kind: ComplaintKind::Complaint,
                complaint_text: "分数不对".to_string(),
                submitter_id: Some(7),
                exam_id: None,
                accepted: Some(true),
                submitted_at: chrono::Utc::now(),
            },
            response: Some(ComplaintResponse {
                id: 1,
                complaint_id: 1,
                accepted: true,
                response_text: Some("已重新批改".to_string()),
                reviewer_id: Some(42),
                submitted_at: chrono::Utc::now(),
            }),
        }
    }

    #[test]
    fn test_student_view_hides_reviewer() {
        let filtered = filter_for_viewer(sample(), &UserRole::Student, true);
        assert_eq!(filtered.complaint.submitter_id, Some(7));
        assert!(filtered.response.unwrap().reviewer_id.is_none());
    }

    #[test]
    fn test_assessor_view_hides_submitter() {
        let filtered = filter_for_viewer(sample(), &UserRole::Tutor, false);
        assert!(filtered.complaint.submitter_id.is_none());
        assert_eq!(filtered.response.unwrap().reviewer_id, Some(42));
    }

    #[test]
    fn test_admin_view_is_unfiltered() {
        let filtered = filter_for_viewer(sample(), &UserRole::Admin, false);
        assert_eq!(filtered.complaint.submitter_id, Some(7));
        assert_eq!(filtered.response.unwrap().reviewer_id, Some(42));
    }
}
