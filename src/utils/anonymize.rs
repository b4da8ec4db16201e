//! 双盲匿名化过滤器
//!
//! 所有函数都是纯函数且幂等：对已过滤的值再次过滤不改变结果。
//! 服务层在返回响应前调用，存储层永远保留完整数据。

use crate::models::assessments::entities::AssessmentResult;
use crate::models::complaints::entities::{Complaint, ComplaintResponse};
use crate::models::participations::entities::Participation;

/// 面向学生的视图：清除批改者身份
pub fn hide_assessor(mut result: AssessmentResult) -> AssessmentResult {
    result.assessor_id = None;
    result
}

/// 面向批改者的视图：清除学生/团队身份
pub fn hide_participant(mut participation: Participation) -> Participation {
    participation.student_id = None;
    participation.team_id = None;
    participation
}

/// 按查看者身份过滤参与者：教师/管理员看完整数据，其余走双盲
pub fn participant_for_viewer(participation: Participation, staff_view: bool) -> Participation {
    if staff_view {
        participation
    } else {
        hide_participant(participation)
    }
}

/// 面向批改者的视图：清除申诉发起者身份
pub fn hide_complaint_submitter(mut complaint: Complaint) -> Complaint {
    complaint.submitter_id = None;
    complaint
}

/// 面向学生的视图：清除申诉裁决者身份
pub fn hide_complaint_reviewer(mut response: ComplaintResponse) -> ComplaintResponse {
    response.reviewer_id = None;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::{AssessmentType, ResultState};

    fn sample_result() -> AssessmentResult {
        AssessmentResult {
            id: 1,
            submission_id: 2,
            correction_round: 0,
            state: ResultState::Completed,
            assessor_id: Some(42),
            score: Some(8.0),
            rated: true,
            assessment_type: AssessmentType::Manual,
            locked_at: chrono::Utc::now(),
            completion_date: Some(chrono::Utc::now()),
        }
    }

    fn sample_participation() -> Participation {
        Participation {
            id: 1,
            exercise_id: 2,
            student_id: Some(7),
            team_id: Some(3),
            team_tutor_id: Some(42),
            test_run: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_hide_assessor_strips_identity_only() {
        let filtered = hide_assessor(sample_result());
        assert!(filtered.assessor_id.is_none());
        assert_eq!(filtered.score, Some(8.0));
        assert_eq!(filtered.state, ResultState::Completed);
    }

    #[test]
    fn test_hide_participant_strips_identity_only() {
        let filtered = hide_participant(sample_participation());
        assert!(filtered.student_id.is_none());
        assert!(filtered.team_id.is_none());
        assert_eq!(filtered.exercise_id, 2);
    }

    #[test]
    fn test_staff_view_keeps_participant_identity() {
        let kept = participant_for_viewer(sample_participation(), true);
        assert_eq!(kept.student_id, Some(7));
        assert_eq!(kept.team_id, Some(3));

        let filtered = participant_for_viewer(sample_participation(), false);
        assert!(filtered.student_id.is_none());
        assert!(filtered.team_id.is_none());
    }

    #[test]
    fn test_filters_are_idempotent() {
        let once = hide_assessor(sample_result());
        let twice = hide_assessor(once.clone());
        assert_eq!(once.assessor_id, twice.assessor_id);
        assert_eq!(once.score, twice.score);

        let once = hide_participant(sample_participation());
        let twice = hide_participant(once.clone());
        assert_eq!(once.student_id, twice.student_id);
        assert_eq!(once.team_id, twice.team_id);
    }
}
