use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComplaintService;
use super::get::filter_for_viewer;
use crate::middlewares::RequireJWT;
use crate::models::complaints::requests::ComplaintListQuery;
use crate::models::{ApiResponse, ErrorCode, PaginatedResponse, PaginationQuery};
use crate::services::build_caller;
use crate::utils::policy::{self, Operation, Ownership};

/// 课程内的申诉列表（批改者视角，申诉发起者匿名）
/// GET /courses/{course_id}/complaints
pub async fn list_complaints(
    service: &ComplaintService,
    request: &HttpRequest,
    course_id: i64,
    query: ComplaintListQuery,
    pagination: PaginationQuery,
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

    // 列表是批改者入口，学生通过申诉详情查看自己的申诉
    if !policy::allowed(Operation::ViewComplaint, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看课程申诉的权限",
        )));
    }

    match storage
        .list_complaints_for_course(course_id, query, pagination)
        .await
    {
        Ok(page) => {
            let filtered = PaginatedResponse {
                items: page
                    .items
                    .into_iter()
                    .map(|c| filter_for_viewer(c, &current_user.role, false))
                    .collect::<Vec<_>>(),
                pagination: page.pagination,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(filtered, "查询成功")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询申诉列表失败: {e}"),
            )),
        ),
    }
}
