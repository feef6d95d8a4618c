//! 数据库仓储层
//!
//! 封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 事务控制由调用方（服务层）决定：`*_in_tx` / `*_for_update` 接收 `&mut PgConnection`
//! - 计数器和通知历史的读改写以父资源的 `FOR UPDATE` 行锁串行化

mod bookmark_repo;
mod comment_repo;
mod game_set_repo;
mod history_repo;
mod like_repo;
mod member_repo;
mod talk_pick_repo;

pub use bookmark_repo::BookmarkRepository;
pub use comment_repo::CommentRepository;
pub use game_set_repo::GameSetRepository;
pub use history_repo::{HistoryOwner, HistoryRepository};
pub use like_repo::LikeRepository;
pub use member_repo::MemberRepository;
pub use talk_pick_repo::TalkPickRepository;
