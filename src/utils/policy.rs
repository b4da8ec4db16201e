//! 批改流程的集中授权策略
//!
//! 所有服务在执行操作前都走这一个函数，而不是在各自的 handler
//! 里散落角色判断。策略只看三样东西：操作、调用者、归属关系。

use crate::models::courses::entities::CourseRole;
use crate::models::users::entities::UserRole;

/// 批改流程中需要授权的操作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    SelectSubmission,      // 随机抽取可批改提交
    LockSubmission,        // 锁定提交
    SaveAssessment,        // 保存批改草稿
    SubmitAssessment,      // 完成批改
    CancelAssessment,      // 释放锁
    DeleteAssessment,      // 删除已完成结果
    UpdateAfterComplaint,  // 申诉处理后更新批改
    ViewLockedSubmissions, // 查看持有的锁
    CreateComplaint,       // 发起申诉
    ViewComplaint,         // 查看申诉
    ViewConflicts,         // 查看课程内评语冲突
    ViewFeedbackConflicts, // 查看与某条评语相关的冲突提交
    SolveConflict,         // 标记冲突已解决
}

/// 调用者身份
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub user_role: UserRole,
    /// 目标课程内的角色，非课程成员为 None
    pub course_role: Option<CourseRole>,
}

impl Caller {
    fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }

    fn is_course_instructor(&self) -> bool {
        self.course_role == Some(CourseRole::Instructor)
    }

    /// 管理员或课程教师，匿名化过滤对其豁免
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_course_instructor()
    }

    fn can_assess_in_course(&self) -> bool {
        self.course_role.as_ref().is_some_and(CourseRole::can_assess)
    }

    fn is_course_student(&self) -> bool {
        self.course_role == Some(CourseRole::Student)
    }
}

/// 调用者与目标对象的归属关系
#[derive(Debug, Clone, Copy, Default)]
pub struct Ownership {
    /// 调用者是否持有目标结果的锁
    pub is_lock_holder: bool,
    /// 调用者是否为目标提交的学生本人
    pub is_submission_owner: bool,
    /// 调用者是否为目标结果（或冲突两侧之一）的原批改者
    pub is_original_assessor: bool,
}

/// 判定调用者是否允许执行操作
///
/// 管理员放行所有操作；其余规则按操作逐条列出，便于对照复查。
pub fn allowed(operation: Operation, caller: &Caller, ownership: Ownership) -> bool {
    if caller.is_admin() {
        return true;
    }

    match operation {
        // 抽取与锁定：课程内助教及以上
        Operation::SelectSubmission | Operation::LockSubmission => caller.can_assess_in_course(),

        // 保存/完成批改：仅锁持有者本人
        Operation::SaveAssessment | Operation::SubmitAssessment => {
            caller.can_assess_in_course() && ownership.is_lock_holder
        }

        // 释放锁：锁持有者本人，或课程教师（可替他人解锁）
        Operation::CancelAssessment => {
            (caller.can_assess_in_course() && ownership.is_lock_holder)
                || caller.is_course_instructor()
        }

        // 删除已完成结果：仅课程教师
        Operation::DeleteAssessment => caller.is_course_instructor(),

        // 申诉处理：助教及以上，但原批改者不得裁决针对自己的申诉；
        // 课程教师不受此限制
        Operation::UpdateAfterComplaint => {
            caller.is_course_instructor()
                || (caller.can_assess_in_course() && !ownership.is_original_assessor)
        }

        // 查看自己的锁；教师可查看任何人的
        Operation::ViewLockedSubmissions => caller.can_assess_in_course(),

        // 发起申诉：提交所属学生本人
        Operation::CreateComplaint => caller.is_course_student() && ownership.is_submission_owner,

        // 查看申诉：学生本人或课程内批改者
        Operation::ViewComplaint => {
            (caller.is_course_student() && ownership.is_submission_owner)
                || caller.can_assess_in_course()
        }

        // 课程级冲突列表：仅课程教师
        Operation::ViewConflicts => caller.is_course_instructor(),

        // 单条评语的冲突查询与冲突复核：该评语的原批改者，或课程教师
        Operation::ViewFeedbackConflicts | Operation::SolveConflict => {
            caller.is_course_instructor()
                || (caller.can_assess_in_course() && ownership.is_original_assessor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_role: UserRole, course_role: Option<CourseRole>) -> Caller {
        Caller {
            user_id: 1,
            user_role,
            course_role,
        }
    }

    fn holder() -> Ownership {
        Ownership {
            is_lock_holder: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_admin_bypasses_everything() {
        let admin = caller(UserRole::Admin, None);
        for op in [
            Operation::SelectSubmission,
            Operation::DeleteAssessment,
            Operation::CreateComplaint,
            Operation::SolveConflict,
        ] {
            assert!(allowed(op, &admin, Ownership::default()));
        }
    }

    #[test]
    fn test_staff_covers_admin_and_instructor_only() {
        assert!(caller(UserRole::Admin, None).is_staff());
        assert!(caller(UserRole::Instructor, Some(CourseRole::Instructor)).is_staff());
        assert!(!caller(UserRole::Tutor, Some(CourseRole::Tutor)).is_staff());
        assert!(!caller(UserRole::Student, Some(CourseRole::Student)).is_staff());
    }

    #[test]
    fn test_student_cannot_assess() {
        let student = caller(UserRole::Student, Some(CourseRole::Student));
        assert!(!allowed(Operation::SelectSubmission, &student, Ownership::default()));
        assert!(!allowed(Operation::LockSubmission, &student, Ownership::default()));
        assert!(!allowed(Operation::SubmitAssessment, &student, holder()));
    }

    #[test]
    fn test_tutor_needs_lock_to_submit() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        assert!(allowed(Operation::SelectSubmission, &tutor, Ownership::default()));
        assert!(allowed(Operation::SubmitAssessment, &tutor, holder()));
        assert!(!allowed(Operation::SubmitAssessment, &tutor, Ownership::default()));
    }

    #[test]
    fn test_cancel_by_holder_or_instructor() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        let instructor = caller(UserRole::Instructor, Some(CourseRole::Instructor));
        assert!(allowed(Operation::CancelAssessment, &tutor, holder()));
        assert!(!allowed(Operation::CancelAssessment, &tutor, Ownership::default()));
        // 教师无需持锁即可替他人解锁
        assert!(allowed(Operation::CancelAssessment, &instructor, Ownership::default()));
    }

    #[test]
    fn test_delete_is_instructor_only() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        let instructor = caller(UserRole::Instructor, Some(CourseRole::Instructor));
        assert!(!allowed(Operation::DeleteAssessment, &tutor, holder()));
        assert!(allowed(Operation::DeleteAssessment, &instructor, Ownership::default()));
    }

    #[test]
    fn test_original_assessor_cannot_judge_own_complaint() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        let original = Ownership {
            is_original_assessor: true,
            ..Default::default()
        };
        assert!(!allowed(Operation::UpdateAfterComplaint, &tutor, original));
        assert!(allowed(Operation::UpdateAfterComplaint, &tutor, Ownership::default()));

        let instructor = caller(UserRole::Instructor, Some(CourseRole::Instructor));
        assert!(allowed(Operation::UpdateAfterComplaint, &instructor, original));
    }

    #[test]
    fn test_complaint_requires_submission_owner() {
        let student = caller(UserRole::Student, Some(CourseRole::Student));
        let owner = Ownership {
            is_submission_owner: true,
            ..Default::default()
        };
        assert!(allowed(Operation::CreateComplaint, &student, owner));
        assert!(!allowed(Operation::CreateComplaint, &student, Ownership::default()));

        // 非课程成员即使声称拥有提交也不行
        let outsider = caller(UserRole::Student, None);
        assert!(!allowed(Operation::CreateComplaint, &outsider, owner));
    }

    #[test]
    fn test_course_conflict_list_is_instructor_only() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        let instructor = caller(UserRole::Instructor, Some(CourseRole::Instructor));
        assert!(!allowed(Operation::ViewConflicts, &tutor, Ownership::default()));
        assert!(allowed(Operation::ViewConflicts, &instructor, Ownership::default()));
    }

    #[test]
    fn test_conflict_solve_by_original_assessor_or_instructor() {
        let tutor = caller(UserRole::Tutor, Some(CourseRole::Tutor));
        let instructor = caller(UserRole::Instructor, Some(CourseRole::Instructor));
        let original = Ownership {
            is_original_assessor: true,
            ..Default::default()
        };
        assert!(allowed(Operation::SolveConflict, &tutor, original));
        assert!(!allowed(Operation::SolveConflict, &tutor, Ownership::default()));
        assert!(allowed(Operation::SolveConflict, &instructor, Ownership::default()));

        assert!(allowed(Operation::ViewFeedbackConflicts, &tutor, original));
        assert!(!allowed(
            Operation::ViewFeedbackConflicts,
            &tutor,
            Ownership::default()
        ));
    }
}
