//! 共享库
//!
//! 包含各服务共用的配置加载、错误处理、数据库连接与可观测性初始化代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
