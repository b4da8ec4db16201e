//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod complaints;
mod conflicts;
mod courses;
mod exercises;
mod feedbacks;
mod results;
mod submissions;
mod text_blocks;
mod users;

use crate::config::AppConfig;
use crate::errors::{AssessmentError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AssessmentError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| AssessmentError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AssessmentError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AssessmentError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
    conflicts::entities::FeedbackConflict,
    courses::entities::{Course, CourseUser},
    exercises::entities::Exercise,
    participations::entities::Participation,
    submissions::{entities::Submission, responses::LockedSubmissionResponse},
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{LockAttempt, NewConflict, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>> {
        self.get_course_user_impl(course_id, user_id).await
    }

    // 练习与参与模块
    async fn get_exercise_by_id(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        self.get_exercise_by_id_impl(exercise_id).await
    }

    // 提交模块
    async fn get_submission_with_participation(
        &self,
        submission_id: i64,
    ) -> Result<Option<(Submission, Participation)>> {
        self.get_submission_with_participation_impl(submission_id)
            .await
    }

    async fn list_assessable_submission_ids(
        &self,
        exercise_id: i64,
        correction_round: i32,
    ) -> Result<Vec<i64>> {
        self.list_assessable_submission_ids_impl(exercise_id, correction_round)
            .await
    }

    // 文本块模块
    async fn get_text_blocks_for_submission(&self, submission_id: i64) -> Result<Vec<TextBlock>> {
        self.get_text_blocks_for_submission_impl(submission_id)
            .await
    }

    async fn set_text_block_feedback(
        &self,
        text_block_id: i64,
        feedback_id: Option<i64>,
    ) -> Result<bool> {
        self.set_text_block_feedback_impl(text_block_id, feedback_id)
            .await
    }

    // 批改结果模块
    async fn try_lock_submission(
        &self,
        submission_id: i64,
        correction_round: i32,
        assessor_id: i64,
    ) -> Result<LockAttempt> {
        self.try_lock_submission_impl(submission_id, correction_round, assessor_id)
            .await
    }

    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<AssessmentResult>> {
        self.get_result_by_id_impl(result_id).await
    }

    async fn get_result_for_round(
        &self,
        submission_id: i64,
        correction_round: i32,
    ) -> Result<Option<AssessmentResult>> {
        self.get_result_for_round_impl(submission_id, correction_round)
            .await
    }

    async fn count_open_locks(&self, assessor_id: i64, course_id: i64) -> Result<u64> {
        self.count_open_locks_impl(assessor_id, course_id).await
    }

    async fn finalize_result(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        rated: bool,
    ) -> Result<bool> {
        self.finalize_result_impl(result_id, assessor_id, score, rated)
            .await
    }

    async fn release_result(&self, result_id: i64, assessor_id: Option<i64>) -> Result<bool> {
        self.release_result_impl(result_id, assessor_id).await
    }

    async fn delete_result(&self, result_id: i64) -> Result<bool> {
        self.delete_result_impl(result_id).await
    }

    async fn update_result_score(&self, result_id: i64, score: f64) -> Result<bool> {
        self.update_result_score_impl(result_id, score).await
    }

    async fn list_locked_submissions(
        &self,
        assessor_id: i64,
        course_id: i64,
    ) -> Result<Vec<LockedSubmissionResponse>> {
        self.list_locked_submissions_impl(assessor_id, course_id)
            .await
    }

    async fn get_course_id_for_result(&self, result_id: i64) -> Result<Option<i64>> {
        self.get_course_id_for_result_impl(result_id).await
    }

    // 评语模块
    async fn replace_feedbacks(
        &self,
        result_id: i64,
        feedbacks: Vec<FeedbackPayload>,
    ) -> Result<Vec<Feedback>> {
        self.replace_feedbacks_impl(result_id, feedbacks).await
    }

    async fn get_feedback_by_id(&self, feedback_id: i64) -> Result<Option<Feedback>> {
        self.get_feedback_by_id_impl(feedback_id).await
    }

    async fn get_feedbacks_for_result(&self, result_id: i64) -> Result<Vec<Feedback>> {
        self.get_feedbacks_for_result_impl(result_id).await
    }

    async fn list_referenced_feedbacks_for_exercise(
        &self,
        exercise_id: i64,
    ) -> Result<Vec<(Feedback, TextBlock)>> {
        self.list_referenced_feedbacks_for_exercise_impl(exercise_id)
            .await
    }

    // 申诉模块
    async fn create_complaint(
        &self,
        result_id: i64,
        kind: ComplaintKind,
        complaint_text: &str,
        submitter_id: i64,
        exam_id: Option<i64>,
    ) -> Result<Option<Complaint>> {
        self.create_complaint_impl(result_id, kind, complaint_text, submitter_id, exam_id)
            .await
    }

    async fn get_complaint_by_id(
        &self,
        complaint_id: i64,
    ) -> Result<Option<ComplaintWithResponse>> {
        self.get_complaint_by_id_impl(complaint_id).await
    }

    async fn get_complaint_by_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<ComplaintWithResponse>> {
        self.get_complaint_by_submission_impl(submission_id).await
    }

    async fn count_complaints_by_student_in_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<u64> {
        self.count_complaints_by_student_in_course_impl(student_id, course_id)
            .await
    }

    async fn list_complaints_for_course(
        &self,
        course_id: i64,
        query: ComplaintListQuery,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ComplaintWithResponse>> {
        self.list_complaints_for_course_impl(course_id, query, pagination)
            .await
    }

    async fn respond_to_complaint(
        &self,
        complaint_id: i64,
        accepted: bool,
        response_text: Option<String>,
        reviewer_id: i64,
    ) -> Result<Option<ComplaintResponse>> {
        self.respond_to_complaint_impl(complaint_id, accepted, response_text, reviewer_id)
            .await
    }

    // 评语冲突模块
    async fn insert_conflicts(&self, conflicts: Vec<NewConflict>) -> Result<u64> {
        self.insert_conflicts_impl(conflicts).await
    }

    async fn get_conflict_by_id(&self, conflict_id: i64) -> Result<Option<FeedbackConflict>> {
        self.get_conflict_by_id_impl(conflict_id).await
    }

    async fn list_conflicts_for_course(
        &self,
        course_id: i64,
        include_solved: bool,
    ) -> Result<Vec<(FeedbackConflict, Feedback, Feedback)>> {
        self.list_conflicts_for_course_impl(course_id, include_solved)
            .await
    }

    async fn solve_conflict(&self, conflict_id: i64) -> Result<bool> {
        self.solve_conflict_impl(conflict_id).await
    }

    async fn list_conflicting_submissions(&self, feedback_id: i64) -> Result<Vec<Submission>> {
        self.list_conflicting_submissions_impl(feedback_id).await
    }

    async fn get_course_id_for_conflict(&self, conflict_id: i64) -> Result<Option<i64>> {
        self.get_course_id_for_conflict_impl(conflict_id).await
    }
}
