use serde::Deserialize;
use ts_rs::TS;

// 冲突列表过滤
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/conflict.ts")]
pub struct ConflictListQuery {
    /// 默认只列出未解决的冲突
    #[serde(default)]
    pub include_solved: bool,
}
