use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::info;

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::AssessmentResult;
use crate::models::assessments::requests::SelectSubmissionQuery;
use crate::models::exercises::entities::Exercise;
use crate::models::submissions::responses::SubmissionForAssessmentResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::storage::{LockAttempt, Storage};
use crate::utils::anonymize;
use crate::utils::policy::{self, Operation, Ownership};

/// 随机抽取一个可批改提交
/// GET /exercises/{exercise_id}/assessments/select
pub async fn select_submission(
    service: &AssessmentService,
    request: &HttpRequest,
    exercise_id: i64,
    query: SelectSubmissionQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let exercise = match storage.get_exercise_by_id(exercise_id).await {
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

    if !policy::allowed(Operation::SelectSubmission, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有批改该练习的权限",
        )));
    }

    if let Err(response) = validate_correction_round(&exercise, query.correction_round) {
        return Ok(response);
    }

    let now = chrono::Utc::now();

    // 截止前学生仍可重新提交，提交内容未定稿不开放批改
    if !exercise.due_date_passed(now) {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "练习尚未截止，暂无可批改的提交",
        )));
    }

    if exercise.assessment_due_date_passed(now) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "批改截止时间已过，不能再领取新的批改任务",
        )));
    }

    let candidates = match storage
        .list_assessable_submission_ids(exercise_id, query.correction_round)
        .await
    {
        Ok(ids) => ids,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询可批改提交失败: {e}"),
                )),
            );
        }
    };

    let mut pool = candidates;
    if pool.is_empty() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "当前没有可批改的提交",
        )));
    }
    pool.shuffle(&mut rand::rng());

    let staff_view = caller.is_staff();

    if query.head {
        // head 模式：只预览，不创建锁行
        return match build_submission_response(&storage, pool[0], None, staff_view).await {
            Ok(Some(response)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(response, "抽取成功")))
            }
            Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交不存在",
            ))),
            Err(e) => Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询提交失败: {e}"),
                )),
            ),
        };
    }

    if let Err(response) =
        super::lock::check_lock_capacity(&storage, &current_user, &exercise).await
    {
        return Ok(response);
    }

    // 候选循环：逐个原子抢锁，第一个成功的返回；
    // 被并发竞争者占走的候选跳过，全部落空才算没有可批改的提交
    for submission_id in pool {
        let attempt = match storage
            .try_lock_submission(submission_id, query.correction_round, current_user.id)
            .await
        {
            Ok(attempt) => attempt,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("锁定提交失败: {e}"),
                    )),
                );
            }
        };

        let Some(result) = usable_lock(attempt, current_user.id) else {
            continue;
        };

        info!(
            "User {} locked submission {} (round {}) via selection",
            current_user.id, submission_id, query.correction_round
        );

        return match build_submission_response(&storage, submission_id, Some(result), staff_view)
            .await
        {
            Ok(Some(response)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(response, "锁定成功")))
            }
            Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交不存在",
            ))),
            Err(e) => Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询提交失败: {e}"),
                )),
            ),
        };
    }

    Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::SubmissionNotFound,
        "当前没有可批改的提交",
    )))
}

/// 候选循环中单次抢锁的归类
///
/// 拿到新锁或幂等拿回自己已持有的锁都算成功；槽位被他人占用
/// （锁定中或已完成）时返回 None，由调用方换下一个候选。
fn usable_lock(attempt: LockAttempt, user_id: i64) -> Option<AssessmentResult> {
    match attempt {
        LockAttempt::Acquired(result) => Some(result),
        LockAttempt::Held(result) if result.held_by(user_id) => Some(result),
        LockAttempt::Held(_) => None,
    }
}

/// 校验批改轮次落在练习允许的范围内
pub(crate) fn validate_correction_round(
    exercise: &Exercise,
    correction_round: i32,
) -> Result<(), HttpResponse> {
    if correction_round < 0 || correction_round >= exercise.correction_rounds() {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!(
                "无效的批改轮次 {correction_round}，该练习允许的轮次为 0..{}",
                exercise.correction_rounds()
            ),
        )));
    }
    Ok(())
}

/// 组装带上下文的提交响应，参与信息按查看者身份匿名化
pub(crate) async fn build_submission_response(
    storage: &Arc<dyn Storage>,
    submission_id: i64,
    result: Option<AssessmentResult>,
    staff_view: bool,
) -> crate::errors::Result<Option<SubmissionForAssessmentResponse>> {
    let Some((submission, participation)) =
        storage.get_submission_with_participation(submission_id).await?
    else {
        return Ok(None);
    };

    let text_blocks = storage.get_text_blocks_for_submission(submission_id).await?;

    Ok(Some(SubmissionForAssessmentResponse {
        submission,
        participation: anonymize::participant_for_viewer(participation, staff_view),
        result,
        text_blocks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::{AssessmentType, ResultState};

    fn held_result(assessor_id: i64, state: ResultState) -> AssessmentResult {
        AssessmentResult {
            id: 1,
            submission_id: 2,
            correction_round: 0,
            state,
            assessor_id: Some(assessor_id),
            score: None,
            rated: true,
            assessment_type: AssessmentType::Manual,
            locked_at: chrono::Utc::now(),
            completion_date: None,
        }
    }

    #[test]
    fn test_usable_lock_accepts_fresh_and_own_locks() {
        let fresh = usable_lock(LockAttempt::Acquired(held_result(42, ResultState::Locked)), 42);
        assert!(fresh.is_some());

        // 自己已持有的槽位幂等可用
        let own = usable_lock(LockAttempt::Held(held_result(42, ResultState::Locked)), 42);
        assert!(own.is_some());
    }

    #[test]
    fn test_usable_lock_skips_slots_held_by_others() {
        let other = usable_lock(LockAttempt::Held(held_result(7, ResultState::Locked)), 42);
        assert!(other.is_none());

        let completed = usable_lock(LockAttempt::Held(held_result(7, ResultState::Completed)), 42);
        assert!(completed.is_none());
    }
}
