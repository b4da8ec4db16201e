use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// 延长 refresh token 有效期
    #[serde(default)]
    pub remember_me: bool,
}

// 刷新令牌请求
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
