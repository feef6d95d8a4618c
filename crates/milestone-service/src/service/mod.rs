//! 服务层
//!
//! 计数器变更的四类调用点。每次变更在一个事务内完成：
//!
//! 1. `FOR UPDATE` 锁定父资源（集合、话题帖或评论）
//! 2. 变更计数器
//! 3. 调用 `MilestoneNotifier` 判定并投递
//! 4. 写回返回的通知历史
//! 5. 提交；投递失败时整个事务回滚
//!
//! ## 模块结构
//!
//! - `dto`: 请求与响应
//! - `game_bookmark_service` / `talk_pick_bookmark_service`: 收藏
//! - `comment_service`: 评论、回复、最佳评论
//! - `comment_like_service`: 评论点赞
//! - `best_comment`: 最佳评论排序（纯函数）

pub mod best_comment;
pub mod comment_like_service;
pub mod comment_service;
pub mod dto;
pub mod game_bookmark_service;
pub mod talk_pick_bookmark_service;

pub use comment_like_service::CommentLikeService;
pub use comment_service::CommentService;
pub use dto::*;
pub use game_bookmark_service::GameBookmarkService;
pub use talk_pick_bookmark_service::TalkPickBookmarkService;

use sqlx::PgConnection;

use crate::error::{Result, ServiceError};
use crate::milestone::MilestoneNotifier;
use crate::models::{MilestoneSite, NotificationHistory};
use crate::notification::NotificationTarget;
use crate::repository::{HistoryOwner, HistoryRepository, MemberRepository};

/// 判定、投递并在同一事务中写回历史
///
/// 返回是否发送了通知
async fn notify_milestone(
    tx: &mut PgConnection,
    notifier: &MilestoneNotifier,
    site: MilestoneSite,
    count: i64,
    target: &NotificationTarget,
    owner: (HistoryOwner, i64),
    history: NotificationHistory,
) -> Result<bool> {
    let updated = notifier
        .notify(site, count, target, history.clone())
        .await?;

    if updated == history {
        return Ok(false);
    }

    let (owner, owner_id) = owner;
    HistoryRepository::save_in_tx(tx, owner, owner_id, &updated).await?;
    Ok(true)
}

async fn ensure_member(tx: &mut PgConnection, member_id: i64) -> Result<()> {
    if MemberRepository::exists_in_tx(tx, member_id).await? {
        Ok(())
    } else {
        Err(ServiceError::MemberNotFound(member_id))
    }
}
