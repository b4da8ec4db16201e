use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::conflicts::requests::ConflictListQuery;
use crate::models::courses::entities::CourseRole;
use crate::services::ConflictService;
use crate::utils::extractor::{SafeConflictIdI64, SafeCourseIdI64, SafeFeedbackIdI64};

// 懒加载的全局 ConflictService 实例
static CONFLICT_SERVICE: Lazy<ConflictService> = Lazy::new(ConflictService::new_lazy);

/// 课程内的评语冲突列表
pub async fn list_conflicts(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ConflictListQuery>,
) -> ActixResult<HttpResponse> {
    CONFLICT_SERVICE
        .list_conflicts(&req, course_id.0, query.include_solved)
        .await
}

/// 标记冲突已解决
pub async fn solve_conflict(
    req: HttpRequest,
    conflict_id: SafeConflictIdI64,
) -> ActixResult<HttpResponse> {
    CONFLICT_SERVICE.solve_conflict(&req, conflict_id.0).await
}

/// 与某条评语相关的未解决冲突所涉及的提交
pub async fn get_conflicting_submissions(
    req: HttpRequest,
    feedback_id: SafeFeedbackIdI64,
) -> ActixResult<HttpResponse> {
    CONFLICT_SERVICE
        .get_conflicting_submissions(&req, feedback_id.0)
        .await
}

// 配置路由
pub fn configure_conflict_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/conflicts")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireCourseRole::new(&CourseRole::Instructor))
                    .route("", web::get().to(list_conflicts)),
            ),
    )
    .service(
        web::scope("/api/v1/conflicts/{conflict_id}")
            .wrap(middlewares::RequireJWT)
            .route("/solve", web::put().to(solve_conflict)),
    )
    .service(
        web::scope("/api/v1/feedbacks/{feedback_id}/conflicts")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_conflicting_submissions)),
    );
}
