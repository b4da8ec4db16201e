use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{
    AssessmentUpdateRequest, LockSubmissionQuery, SelectSubmissionQuery, SubmitAssessmentRequest,
};
use crate::services::AssessmentService;
use crate::utils::extractor::{
    SafeComplaintIdI64, SafeCourseIdI64, SafeExerciseIdI64, SafeResultIdI64, SafeSubmissionIdI64,
};

// 懒加载的全局 AssessmentService 实例
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

/// 随机抽取一个可批改提交（head=true 只抽取不加锁）
pub async fn select_submission(
    req: HttpRequest,
    exercise_id: SafeExerciseIdI64,
    query: web::Query<SelectSubmissionQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .select_submission(&req, exercise_id.0, query.into_inner())
        .await
}

/// 锁定指定提交用于批改
pub async fn lock_submission(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
    query: web::Query<LockSubmissionQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .lock_submission(&req, submission_id.0, query.correction_round)
        .await
}

/// 保存草稿或完成批改
pub async fn save_or_submit(
    req: HttpRequest,
    result_id: SafeResultIdI64,
    body: web::Json<SubmitAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .save_or_submit(&req, result_id.0, body.into_inner())
        .await
}

/// 取消批改并释放锁
pub async fn cancel_assessment(
    req: HttpRequest,
    result_id: SafeResultIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.cancel_assessment(&req, result_id.0).await
}

/// 删除已完成的批改结果
pub async fn delete_assessment(
    req: HttpRequest,
    result_id: SafeResultIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.delete_assessment(&req, result_id.0).await
}

/// 裁决申诉并更新批改
pub async fn update_after_complaint(
    req: HttpRequest,
    complaint_id: SafeComplaintIdI64,
    body: web::Json<AssessmentUpdateRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_after_complaint(&req, complaint_id.0, body.into_inner())
        .await
}

/// 批改者当前持有的锁列表
pub async fn list_locked_submissions(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_locked_submissions(&req, course_id.0)
        .await
}

// 配置路由
pub fn configure_assessment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exercises/{exercise_id}/assessments")
            .wrap(middlewares::RequireJWT)
            .route("/select", web::get().to(select_submission)),
    )
    .service(
        web::scope("/api/v1/submissions/{submission_id}/assessments")
            .wrap(middlewares::RateLimit::lock_submission())
            .wrap(middlewares::RequireJWT)
            .route("/lock", web::post().to(lock_submission)),
    )
    .service(
        web::scope("/api/v1/results/{result_id}")
            .wrap(middlewares::RequireJWT)
            .route("/assessment", web::put().to(save_or_submit))
            .route("/lock", web::delete().to(cancel_assessment))
            .route("", web::delete().to(delete_assessment)),
    )
    .service(
        web::scope("/api/v1/complaints/{complaint_id}/assessment")
            .wrap(middlewares::RequireJWT)
            .route("", web::put().to(update_after_complaint)),
    )
    .service(
        web::scope("/api/v1/courses/{course_id}/assessments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireCourseRole::assessors())
                    .route("/locked", web::get().to(list_locked_submissions)),
            ),
    );
}
