use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 参与实体
//
// 学生（或团队）对一个练习的参与，提交通过参与归属到学生。
// student_id / team_id 可空，匿名化时由过滤器清除。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/participation.ts")]
pub struct Participation {
    pub id: i64,
    pub exercise_id: i64,
    pub student_id: Option<i64>,
    pub team_id: Option<i64>,
    /// 团队练习中负责该团队的助教
    pub team_tutor_id: Option<i64>,
    pub test_run: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Participation {
    /// 调用者是否为该参与的所有者（学生本人）
    pub fn owned_by(&self, user_id: i64) -> bool {
        self.student_id == Some(user_id)
    }
}
