use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::AssessmentService;
use super::select::{build_submission_response, validate_correction_round};
use crate::middlewares::RequireJWT;
use crate::models::exercises::entities::Exercise;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::build_caller;
use crate::storage::{LockAttempt, Storage};
use crate::utils::policy::{self, Operation, Ownership};

/// 锁定指定提交用于批改
/// POST /submissions/{submission_id}/assessments/lock
pub async fn lock_submission(
    service: &AssessmentService,
    request: &HttpRequest,
    submission_id: i64,
    correction_round: i32,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let (submission, participation) =
        match storage.get_submission_with_participation(submission_id).await {
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

    if !submission.submitted {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "该提交尚未正式提交，不能批改",
        )));
    }

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

    if !policy::allowed(Operation::LockSubmission, &caller, Ownership::default()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有批改该练习的权限",
        )));
    }

    if let Err(response) = validate_correction_round(&exercise, correction_round) {
        return Ok(response);
    }

    let now = chrono::Utc::now();

    // 截止前学生仍可重新提交，提交内容未定稿不开放批改
    if !exercise.due_date_passed(now) {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "练习尚未截止，该提交还不能批改",
        )));
    }

    if exercise.assessment_due_date_passed(now) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "批改截止时间已过，不能再领取新的批改任务",
        )));
    }

    // 第二轮批改要求上一轮已完成
    if correction_round > 0 {
        match storage
            .get_result_for_round(submission_id, correction_round - 1)
            .await
        {
            Ok(Some(previous)) if previous.is_completed() => {}
            Ok(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ResultNotCompleted,
                    "上一轮批改尚未完成，不能开始本轮批改",
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
        }
    }

    acquire_lock_and_respond(
        &storage,
        &current_user,
        &exercise,
        submission_id,
        correction_round,
        caller.is_staff(),
    )
    .await
}

/// 并发锁容量检查：未完成锁达到课程上限即拒绝
///
/// 检查是先数后插的软上限，槽位互斥仍由唯一索引保证。
pub(crate) async fn check_lock_capacity(
    storage: &Arc<dyn Storage>,
    current_user: &User,
    exercise: &Exercise,
) -> Result<(), HttpResponse> {
    let course = match storage.get_course_by_id(exercise.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "课程不存在",
            )));
        }
        Err(e) => {
            return Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询课程失败: {e}"),
                )),
            );
        }
    };

    let open_locks = match storage.count_open_locks(current_user.id, course.id).await {
        Ok(count) => count,
        Err(e) => {
            return Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("统计未完成批改失败: {e}"),
                )),
            );
        }
    };

    if open_locks >= course.max_assessment_locks as u64 {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::LockLimitExceeded,
            format!(
                "未完成的批改已达上限（{}），请先完成或取消现有批改",
                course.max_assessment_locks
            ),
        )));
    }

    Ok(())
}

/// 抢锁并返回带上下文的提交响应
///
/// 锁槽位由 (submission_id, correction_round) 唯一索引仲裁：
/// - INSERT 成功即获得锁
/// - 槽位已被自己持有：幂等返回现有锁
/// - 槽位被他人以 locked 状态持有：423
/// - 槽位已是 completed：409（并发竞争中落败）
pub(crate) async fn acquire_lock_and_respond(
    storage: &Arc<dyn Storage>,
    current_user: &User,
    exercise: &Exercise,
    submission_id: i64,
    correction_round: i32,
    staff_view: bool,
) -> ActixResult<HttpResponse> {
    if let Err(response) = check_lock_capacity(storage, current_user, exercise).await {
        return Ok(response);
    }

    let result = match storage
        .try_lock_submission(submission_id, correction_round, current_user.id)
        .await
    {
        Ok(LockAttempt::Acquired(result)) => {
            info!(
                "User {} locked submission {} (round {})",
                current_user.id, submission_id, correction_round
            );
            result
        }
        // 重复锁定自己已持有的槽位：幂等返回
        Ok(LockAttempt::Held(result)) if result.held_by(current_user.id) => result,
        Ok(LockAttempt::Held(result)) if result.is_completed() => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AssessmentConflict,
                "该提交的本轮批改已完成",
            )));
        }
        Ok(LockAttempt::Held(_)) => {
            return Ok(HttpResponse::Locked().json(ApiResponse::error_empty(
                ErrorCode::SubmissionLocked,
                "该提交已被其他批改者锁定",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("锁定提交失败: {e}"),
                )),
            );
        }
    };

    match build_submission_response(storage, submission_id, Some(result), staff_view).await {
        Ok(Some(response)) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "锁定成功"))),
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
    }
}
