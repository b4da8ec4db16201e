use super::SeaOrmStorage;
use crate::entity::participations::{Column as ParticipationColumn, Entity as Participations};
use crate::entity::results::{Column as ResultColumn, Entity as Results};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{AssessmentError, Result};
use crate::models::assessments::entities::ResultState;
use crate::models::participations::entities::Participation;
use crate::models::submissions::entities::Submission;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use std::collections::HashSet;

impl SeaOrmStorage {
    /// 提交与参与一起取
    pub async fn get_submission_with_participation_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<(Submission, Participation)>> {
        let result = Submissions::find_by_id(submission_id)
            .find_also_related(Participations)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.and_then(|(submission, participation)| {
            participation.map(|p| (submission.into_submission(), p.into_participation()))
        }))
    }

    /// 指定轮次的抢锁候选
    ///
    /// 第 0 轮：已提交且该轮还没有结果行的提交；
    /// 更高轮次：上一轮已完成、本轮还没有结果行的提交。
    /// 测试运行的参与不参加正式批改。
    pub async fn list_assessable_submission_ids_impl(
        &self,
        exercise_id: i64,
        correction_round: i32,
    ) -> Result<Vec<i64>> {
        let participation_ids: Vec<i64> = Participations::find()
            .filter(ParticipationColumn::ExerciseId.eq(exercise_id))
            .filter(ParticipationColumn::TestRun.eq(false))
            .select_only()
            .column(ParticipationColumn::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询参与失败: {e}")))?;

        if participation_ids.is_empty() {
            return Ok(Vec::new());
        }

        let submitted_ids: Vec<i64> = Submissions::find()
            .filter(SubmissionColumn::ParticipationId.is_in(participation_ids))
            .filter(SubmissionColumn::Submitted.eq(true))
            .select_only()
            .column(SubmissionColumn::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))?;

        if submitted_ids.is_empty() {
            return Ok(Vec::new());
        }

        // 本轮已有结果行的提交直接排除，锁定中或已完成都算占用
        let taken: HashSet<i64> = Results::find()
            .filter(ResultColumn::SubmissionId.is_in(submitted_ids.clone()))
            .filter(ResultColumn::CorrectionRound.eq(correction_round))
            .select_only()
            .column(ResultColumn::SubmissionId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?
            .into_iter()
            .collect();

        let mut candidates: Vec<i64> = submitted_ids
            .into_iter()
            .filter(|id| !taken.contains(id))
            .collect();

        // 第二轮及之后要求上一轮已完成
        if correction_round > 0 && !candidates.is_empty() {
            let completed_previous: HashSet<i64> = Results::find()
                .filter(ResultColumn::SubmissionId.is_in(candidates.clone()))
                .filter(ResultColumn::CorrectionRound.eq(correction_round - 1))
                .filter(ResultColumn::State.eq(ResultState::COMPLETED))
                .select_only()
                .column(ResultColumn::SubmissionId)
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?
                .into_iter()
                .collect();

            candidates.retain(|id| completed_previous.contains(id));
        }

        Ok(candidates)
    }

    /// 提交所属课程
    pub async fn get_course_id_for_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<i64>> {
        use crate::entity::exercises::Entity as Exercises;

        let Some(submission) = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))?
        else {
            return Ok(None);
        };

        let Some(participation) = Participations::find_by_id(submission.participation_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询参与失败: {e}")))?
        else {
            return Ok(None);
        };

        let exercise = Exercises::find_by_id(participation.exercise_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询练习失败: {e}")))?;

        Ok(exercise.map(|e| e.course_id))
    }
}
