use super::SeaOrmStorage;
use crate::entity::feedbacks::{Column as FeedbackColumn, Entity as Feedbacks};
use crate::entity::results::{ActiveModel, Column, Entity as Results};
use crate::entity::text_blocks::{Column as TextBlockColumn, Entity as TextBlocks};
use crate::entity::{
    complaint_responses, complaints, exercises, feedback_conflicts, participations, results,
    submissions,
};
use crate::errors::{AssessmentError, Result};
use crate::models::assessments::entities::{AssessmentResult, AssessmentType, ResultState};
use crate::models::submissions::responses::LockedSubmissionResponse;
use crate::storage::LockAttempt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait, Set, SqlErr, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 尝试为提交创建锁行
    ///
    /// (submission_id, correction_round) 唯一索引仲裁并发：
    /// INSERT 成功即获得锁，唯一键冲突则读回占用行交给服务层。
    pub async fn try_lock_submission_impl(
        &self,
        submission_id: i64,
        correction_round: i32,
        assessor_id: i64,
    ) -> Result<LockAttempt> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            submission_id: Set(submission_id),
            correction_round: Set(correction_round),
            state: Set(ResultState::Locked.to_string()),
            assessor_id: Set(assessor_id),
            score: Set(None),
            rated: Set(true),
            assessment_type: Set(AssessmentType::Manual.to_string()),
            locked_at: Set(now),
            completion_date: Set(None),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(inserted) => Ok(LockAttempt::Acquired(inserted.into_result())),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    // 输掉了竞争，读回占用槽位的行
                    let holder = self
                        .get_result_for_round_impl(submission_id, correction_round)
                        .await?
                        .ok_or_else(|| {
                            AssessmentError::database_operation(
                                "锁冲突后未找到占用行".to_string(),
                            )
                        })?;
                    Ok(LockAttempt::Held(holder))
                } else {
                    Err(AssessmentError::database_operation(format!(
                        "创建锁行失败: {e}"
                    )))
                }
            }
        }
    }

    /// 通过 ID 获取结果
    pub async fn get_result_by_id_impl(&self, result_id: i64) -> Result<Option<AssessmentResult>> {
        let result = Results::find_by_id(result_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 获取指定轮次的结果
    pub async fn get_result_for_round_impl(
        &self,
        submission_id: i64,
        correction_round: i32,
    ) -> Result<Option<AssessmentResult>> {
        let result = Results::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .filter(Column::CorrectionRound.eq(correction_round))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 批改者在课程内持有的未完成锁数量
    pub async fn count_open_locks_impl(&self, assessor_id: i64, course_id: i64) -> Result<u64> {
        let count = Results::find()
            .filter(Column::AssessorId.eq(assessor_id))
            .filter(Column::State.eq(ResultState::LOCKED))
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .join(JoinType::InnerJoin, participations::Relation::Exercise.def())
            .filter(exercises::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("统计锁数量失败: {e}")))?;

        Ok(count)
    }

    /// 条件更新完成批改
    ///
    /// filter 带 assessor + locked 状态做比较并交换，
    /// rows_affected == 0 说明锁已被释放或易手。
    pub async fn finalize_result_impl(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        rated: bool,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Results::update_many()
            .col_expr(Column::State, Expr::value(ResultState::COMPLETED))
            .col_expr(Column::Score, Expr::value(score))
            .col_expr(Column::Rated, Expr::value(rated))
            .col_expr(Column::CompletionDate, Expr::value(now))
            .filter(Column::Id.eq(result_id))
            .filter(Column::AssessorId.eq(assessor_id))
            .filter(Column::State.eq(ResultState::LOCKED))
            .exec(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("完成批改失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 条件删除锁行（释放锁），草稿评语一并清理
    pub async fn release_result_impl(
        &self,
        result_id: i64,
        assessor_id: Option<i64>,
    ) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("开启事务失败: {e}")))?;

        let mut select = Results::find_by_id(result_id).filter(Column::State.eq(ResultState::LOCKED));
        if let Some(assessor_id) = assessor_id {
            select = select.filter(Column::AssessorId.eq(assessor_id));
        }

        let Some(row) = select
            .one(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?
        else {
            txn.rollback()
                .await
                .map_err(|e| AssessmentError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        };

        Self::delete_feedbacks_for_result(&txn, result_id).await?;

        Results::delete_by_id(row.id)
            .exec(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("删除锁行失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 删除已完成的结果及其评语、申诉
    pub async fn delete_result_impl(&self, result_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(row) = Results::find_by_id(result_id)
            .one(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?
        else {
            txn.rollback()
                .await
                .map_err(|e| AssessmentError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        };

        Self::delete_feedbacks_for_result(&txn, result_id).await?;

        // 关联的申诉与裁决一并删除
        let complaint_ids: Vec<i64> = complaints::Entity::find()
            .filter(complaints::Column::ResultId.eq(result_id))
            .select_only()
            .column(complaints::Column::Id)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询申诉失败: {e}")))?;

        if !complaint_ids.is_empty() {
            complaint_responses::Entity::delete_many()
                .filter(complaint_responses::Column::ComplaintId.is_in(complaint_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| {
                    AssessmentError::database_operation(format!("删除申诉裁决失败: {e}"))
                })?;
            complaints::Entity::delete_many()
                .filter(complaints::Column::Id.is_in(complaint_ids))
                .exec(&txn)
                .await
                .map_err(|e| AssessmentError::database_operation(format!("删除申诉失败: {e}")))?;
        }

        Results::delete_by_id(row.id)
            .exec(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("删除结果失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 申诉被接受后改写分数
    pub async fn update_result_score_impl(&self, result_id: i64, score: f64) -> Result<bool> {
        let result = Results::update_many()
            .col_expr(Column::Score, Expr::value(score))
            .filter(Column::Id.eq(result_id))
            .filter(Column::State.eq(ResultState::COMPLETED))
            .exec(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("更新分数失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批改者当前持有的锁列表
    pub async fn list_locked_submissions_impl(
        &self,
        assessor_id: i64,
        course_id: i64,
    ) -> Result<Vec<LockedSubmissionResponse>> {
        let rows: Vec<(i64, i64, i32, i64, i64, String)> = Results::find()
            .filter(Column::AssessorId.eq(assessor_id))
            .filter(Column::State.eq(ResultState::LOCKED))
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .join(JoinType::InnerJoin, participations::Relation::Exercise.def())
            .filter(exercises::Column::CourseId.eq(course_id))
            .select_only()
            .column(Column::Id)
            .column(Column::SubmissionId)
            .column(Column::CorrectionRound)
            .column(Column::LockedAt)
            .column(exercises::Column::Id)
            .column(exercises::Column::Title)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询锁列表失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(result_id, submission_id, correction_round, locked_at, exercise_id, title)| {
                    LockedSubmissionResponse {
                        submission_id,
                        exercise_id,
                        exercise_title: title,
                        result_id,
                        correction_round,
                        locked_at: chrono::DateTime::<chrono::Utc>::from_timestamp(locked_at, 0)
                            .unwrap_or_default(),
                    }
                },
            )
            .collect())
    }

    /// 结果所属课程
    pub async fn get_course_id_for_result_impl(&self, result_id: i64) -> Result<Option<i64>> {
        let Some(row) = Results::find_by_id(result_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?
        else {
            return Ok(None);
        };

        self.get_course_id_for_submission_impl(row.submission_id)
            .await
    }

    /// 删除结果的全部评语，并解除文本块关联
    pub(crate) async fn delete_feedbacks_for_result<C: sea_orm::ConnectionTrait>(
        conn: &C,
        result_id: i64,
    ) -> Result<()> {
        let feedback_ids: Vec<i64> = Feedbacks::find()
            .filter(FeedbackColumn::ResultId.eq(result_id))
            .select_only()
            .column(FeedbackColumn::Id)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?;

        if feedback_ids.is_empty() {
            return Ok(());
        }

        TextBlocks::update_many()
            .col_expr(TextBlockColumn::FeedbackId, Expr::value(Option::<i64>::None))
            .filter(TextBlockColumn::FeedbackId.is_in(feedback_ids.clone()))
            .exec(conn)
            .await
            .map_err(|e| {
                AssessmentError::database_operation(format!("解除文本块关联失败: {e}"))
            })?;

        // 引用这些评语的冲突记录一并删除
        feedback_conflicts::Entity::delete_many()
            .filter(
                sea_orm::Condition::any()
                    .add(feedback_conflicts::Column::FirstFeedbackId.is_in(feedback_ids.clone()))
                    .add(feedback_conflicts::Column::SecondFeedbackId.is_in(feedback_ids.clone())),
            )
            .exec(conn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("删除冲突记录失败: {e}")))?;

        Feedbacks::delete_many()
            .filter(FeedbackColumn::Id.is_in(feedback_ids))
            .exec(conn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("删除评语失败: {e}")))?;

        Ok(())
    }
}
