//! CLI 模块
//!
//! - `migrate` - 应用数据库迁移
//! - `check` - 检查计数值的里程碑判定
//! - `history` - 查看父资源的通知历史
//!
//! # 使用示例
//!
//! ```bash
//! milestone-admin migrate
//! milestone-admin check 100 --site talk-pick-comment
//! milestone-admin check 50 --site comment-reply --other-author
//! milestone-admin history game-set 42
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, ReplyFlags};
