use std::sync::Arc;

use crate::models::{
    PaginatedResponse, PaginationQuery,
    assessments::{
        entities::{AssessmentResult, Feedback, TextBlock},
        requests::FeedbackPayload,
    },
    complaints::{
        entities::{Complaint, ComplaintKind, ComplaintResponse},
        requests::ComplaintListQuery,
        responses::ComplaintWithResponse,
    },
    conflicts::entities::{ConflictKind, FeedbackConflict},
    courses::entities::{Course, CourseUser},
    exercises::entities::Exercise,
    participations::entities::Participation,
    submissions::{entities::Submission, responses::LockedSubmissionResponse},
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 抢锁结果
///
/// 槽位 (submission, correction_round) 由唯一索引仲裁：
/// INSERT 成功即获得锁；失败则返回已占用该槽位的结果行，
/// 由服务层根据状态和持有人决定响应（423 或 409）。
#[derive(Debug, Clone)]
pub enum LockAttempt {
    Acquired(AssessmentResult),
    Held(AssessmentResult),
}

/// 待写入的评语冲突
#[derive(Debug, Clone)]
pub struct NewConflict {
    pub first_feedback_id: i64,
    pub second_feedback_id: i64,
    pub kind: ConflictKind,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量（首次启动时判断是否需要种子管理员）
    async fn count_users(&self) -> Result<u64>;

    /// 课程
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    // 获取用户在课程中的成员关系
    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>>;

    /// 练习与参与
    async fn get_exercise_by_id(&self, exercise_id: i64) -> Result<Option<Exercise>>;

    /// 提交
    // 提交与参与一起取，省一次往返
    async fn get_submission_with_participation(
        &self,
        submission_id: i64,
    ) -> Result<Option<(Submission, Participation)>>;
    // 指定轮次还没有结果行的已提交提交（抢锁候选）
    async fn list_assessable_submission_ids(
        &self,
        exercise_id: i64,
        correction_round: i32,
    ) -> Result<Vec<i64>>;

    /// 文本块
    async fn get_text_blocks_for_submission(&self, submission_id: i64) -> Result<Vec<TextBlock>>;
    async fn set_text_block_feedback(
        &self,
        text_block_id: i64,
        feedback_id: Option<i64>,
    ) -> Result<bool>;

    /// 批改结果（锁槽位）
    // 尝试为提交创建锁行，唯一索引仲裁并发
    async fn try_lock_submission(
        &self,
        submission_id: i64,
        correction_round: i32,
        assessor_id: i64,
    ) -> Result<LockAttempt>;
    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<AssessmentResult>>;
    async fn get_result_for_round(
        &self,
        submission_id: i64,
        correction_round: i32,
    ) -> Result<Option<AssessmentResult>>;
    // 批改者在课程内未完成的锁数量
    async fn count_open_locks(&self, assessor_id: i64, course_id: i64) -> Result<u64>;
    // 条件更新完成批改：filter 带 assessor + locked 状态，返回是否命中
    async fn finalize_result(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        rated: bool,
    ) -> Result<bool>;
    // 条件删除锁行；assessor_id 为 None 时表示教师强制解锁
    async fn release_result(&self, result_id: i64, assessor_id: Option<i64>) -> Result<bool>;
    // 删除已完成的结果及其评语
    async fn delete_result(&self, result_id: i64) -> Result<bool>;
    // 申诉被接受后改写分数
    async fn update_result_score(&self, result_id: i64, score: f64) -> Result<bool>;
    // 批改者当前持有的锁列表
    async fn list_locked_submissions(
        &self,
        assessor_id: i64,
        course_id: i64,
    ) -> Result<Vec<LockedSubmissionResponse>>;
    // 结果所属课程
    async fn get_course_id_for_result(&self, result_id: i64) -> Result<Option<i64>>;

    /// 评语
    // 整组替换结果的评语（先删后插，同一事务）
    async fn replace_feedbacks(
        &self,
        result_id: i64,
        feedbacks: Vec<FeedbackPayload>,
    ) -> Result<Vec<Feedback>>;
    async fn get_feedback_by_id(&self, feedback_id: i64) -> Result<Option<Feedback>>;
    async fn get_feedbacks_for_result(&self, result_id: i64) -> Result<Vec<Feedback>>;
    // 练习内所有已完成结果的带引用评语及其文本块（冲突检测快照）
    async fn list_referenced_feedbacks_for_exercise(
        &self,
        exercise_id: i64,
    ) -> Result<Vec<(Feedback, TextBlock)>>;

    /// 申诉
    // 创建申诉；result_id 唯一索引仲裁，已存在时返回 None
    async fn create_complaint(
        &self,
        result_id: i64,
        kind: ComplaintKind,
        complaint_text: &str,
        submitter_id: i64,
        exam_id: Option<i64>,
    ) -> Result<Option<Complaint>>;
    async fn get_complaint_by_id(&self, complaint_id: i64)
    -> Result<Option<ComplaintWithResponse>>;
    // 提交最近一轮结果上的申诉
    async fn get_complaint_by_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<ComplaintWithResponse>>;
    // 学生在课程内已用掉的申诉配额（只数 complaint 类型）
    async fn count_complaints_by_student_in_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<u64>;
    async fn list_complaints_for_course(
        &self,
        course_id: i64,
        query: ComplaintListQuery,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ComplaintWithResponse>>;
    // 写入裁决并同步 complaint.accepted；已有裁决时返回 None
    async fn respond_to_complaint(
        &self,
        complaint_id: i64,
        accepted: bool,
        response_text: Option<String>,
        reviewer_id: i64,
    ) -> Result<Option<ComplaintResponse>>;

    /// 评语冲突
    // 批量写入，(first, second, kind) 重复时跳过，返回新增数量
    async fn insert_conflicts(&self, conflicts: Vec<NewConflict>) -> Result<u64>;
    async fn get_conflict_by_id(&self, conflict_id: i64) -> Result<Option<FeedbackConflict>>;
    async fn list_conflicts_for_course(
        &self,
        course_id: i64,
        include_solved: bool,
    ) -> Result<Vec<(FeedbackConflict, Feedback, Feedback)>>;
    async fn solve_conflict(&self, conflict_id: i64) -> Result<bool>;
    // 引用某条评语的未解决冲突所涉及的提交
    async fn list_conflicting_submissions(&self, feedback_id: i64) -> Result<Vec<Submission>>;
    // 冲突所属课程（经 first_feedback → result → submission 链回溯）
    async fn get_course_id_for_conflict(&self, conflict_id: i64) -> Result<Option<i64>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
