//! 配置管理模块
//!
//! 分层加载：默认配置文件 -> 环境特定配置文件 -> 环境变量覆盖。

mod r#impl;
mod structs;

pub use structs::*;
