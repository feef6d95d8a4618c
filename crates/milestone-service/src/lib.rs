//! 里程碑通知服务
//!
//! 平衡游戏 / 话题帖社区中，收藏、评论、回复、点赞计数达到阈值时
//! 向资源作者发送里程碑通知。
//!
//! ## 核心功能
//!
//! - **里程碑判定**：10、50、100·n、1000·n 阈值，恰好 100/1000 时附带徽章消息
//! - **去重**：每个父资源持久化一份通知历史，同一事件键只通知一次
//! - **首条回复**：评论收到他人第一条回复时通知，优先于回复数里程碑
//! - **事务一致性**：计数变更、通知投递、历史写回在同一事务内完成
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `milestone`: 里程碑判定与通知器
//! - `notification`: 通知类型、模板与投递
//! - `repository`: 数据库仓储层
//! - `service`: 各调用点的业务服务
//! - `settings`: 服务配置
//! - `cli`: 管理命令

pub mod cli;
pub mod error;
pub mod milestone;
pub mod models;
pub mod notification;
pub mod repository;
pub mod service;
pub mod settings;

pub use error::{Result, ServiceError};
pub use milestone::{MilestoneNotifier, MilestoneStandard, is_milestone};
pub use models::*;
pub use notification::{
    BroadcastDispatcher, MessageCatalog, Notification, NotificationDispatcher, NotificationTarget,
};
pub use service::{
    CommentLikeService, CommentService, GameBookmarkService, TalkPickBookmarkService, dto,
};
pub use settings::ServiceSettings;

/// 编译期嵌入的数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
