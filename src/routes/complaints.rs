use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::complaints::requests::{ComplaintListQuery, CreateComplaintRequest};
use crate::services::ComplaintService;
use crate::utils::extractor::{SafeComplaintIdI64, SafeCourseIdI64, SafeSubmissionIdI64};

// 懒加载的全局 ComplaintService 实例
static COMPLAINT_SERVICE: Lazy<ComplaintService> = Lazy::new(ComplaintService::new_lazy);

/// 针对已完成的批改结果发起申诉
pub async fn create_complaint(
    req: HttpRequest,
    body: web::Json<CreateComplaintRequest>,
) -> ActixResult<HttpResponse> {
    COMPLAINT_SERVICE
        .create_complaint(&req, body.into_inner())
        .await
}

/// 查询单个申诉（按查看者身份过滤匿名字段）
pub async fn get_complaint(
    req: HttpRequest,
    complaint_id: SafeComplaintIdI64,
) -> ActixResult<HttpResponse> {
    COMPLAINT_SERVICE.get_complaint(&req, complaint_id.0).await
}

/// 查询提交上的申诉（嵌入结果上下文）
pub async fn get_complaint_for_submission(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
) -> ActixResult<HttpResponse> {
    COMPLAINT_SERVICE
        .get_complaint_for_submission(&req, submission_id.0)
        .await
}

/// 课程内的申诉列表
pub async fn list_complaints(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ComplaintListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    COMPLAINT_SERVICE
        .list_complaints(&req, course_id.0, query.into_inner(), pagination.into_inner())
        .await
}

// 配置路由
pub fn configure_complaint_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/complaints")
            .wrap(middlewares::RequireJWT)
            .route("/{complaint_id}", web::get().to(get_complaint))
            .service(
                web::scope("")
                    .wrap(middlewares::RateLimit::complaint())
                    .route("", web::post().to(create_complaint)),
            ),
    )
    .service(
        web::scope("/api/v1/submissions/{submission_id}/complaint")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_complaint_for_submission)),
    )
    .service(
        web::scope("/api/v1/courses/{course_id}/complaints")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireCourseRole::assessors())
                    .route("", web::get().to(list_complaints)),
            ),
    );
}
