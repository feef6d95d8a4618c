//! 话题帖收藏服务
//!
//! 收藏数增加时通知话题帖作者（分类 `WRITTEN_TALK_PICK`）

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};

use super::dto::BookmarkResult;
use super::{ensure_member, notify_milestone};
use crate::error::{Result, ServiceError};
use crate::milestone::MilestoneNotifier;
use crate::models::{MilestoneSite, NotificationCategory};
use crate::notification::{NotificationTarget, ResourceRef};
use crate::repository::{BookmarkRepository, HistoryOwner, TalkPickRepository};

/// 话题帖收藏服务
pub struct TalkPickBookmarkService {
    pool: PgPool,
    notifier: Arc<MilestoneNotifier>,
}

impl TalkPickBookmarkService {
    pub fn new(pool: PgPool, notifier: Arc<MilestoneNotifier>) -> Self {
        Self { pool, notifier }
    }

    /// 收藏话题帖
    #[instrument(skip(self))]
    pub async fn create_bookmark(&self, talk_pick_id: i64, member_id: i64) -> Result<BookmarkResult> {
        let mut tx = self.pool.begin().await?;

        let talk_pick = TalkPickRepository::get_for_update(&mut tx, talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(talk_pick_id))?;
        ensure_member(&mut tx, member_id).await?;

        if talk_pick.is_owned_by(member_id) {
            return Err(ServiceError::CannotBookmarkOwnResource(talk_pick_id));
        }

        let bookmark_id =
            match BookmarkRepository::get_talk_pick_bookmark_for_update(&mut tx, member_id, talk_pick_id)
                .await?
            {
                Some(bookmark) if bookmark.active => {
                    return Err(ServiceError::AlreadyBookmarked(talk_pick_id));
                }
                Some(bookmark) => {
                    BookmarkRepository::set_talk_pick_bookmark_active_in_tx(&mut tx, bookmark.id, true)
                        .await?;
                    bookmark.id
                }
                None => {
                    BookmarkRepository::create_talk_pick_bookmark_in_tx(&mut tx, member_id, talk_pick_id)
                        .await?
                }
            };

        let bookmarks = TalkPickRepository::adjust_bookmarks_in_tx(&mut tx, talk_pick_id, 1).await?;

        let target = NotificationTarget::new(
            talk_pick.member_id,
            ResourceRef::TalkPick(talk_pick_id),
            NotificationCategory::WrittenTalkPick,
        );
        let notified = notify_milestone(
            &mut tx,
            &self.notifier,
            MilestoneSite::TalkPickBookmark,
            bookmarks,
            &target,
            (HistoryOwner::TalkPick, talk_pick_id),
            talk_pick.notification_history.0,
        )
        .await?;

        tx.commit().await?;

        info!(bookmarks, notified, "话题帖收藏成功");
        Ok(BookmarkResult {
            bookmark_id,
            bookmarks,
            notified,
        })
    }

    /// 取消收藏（不通知）
    #[instrument(skip(self))]
    pub async fn delete_bookmark(&self, talk_pick_id: i64, member_id: i64) -> Result<BookmarkResult> {
        let mut tx = self.pool.begin().await?;

        TalkPickRepository::get_for_update(&mut tx, talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(talk_pick_id))?;
        ensure_member(&mut tx, member_id).await?;

        let bookmark =
            BookmarkRepository::get_talk_pick_bookmark_for_update(&mut tx, member_id, talk_pick_id)
                .await?
                .ok_or(ServiceError::BookmarkNotFound {
                    member_id,
                    resource_id: talk_pick_id,
                })?;

        if !bookmark.active {
            return Err(ServiceError::AlreadyDeletedBookmark(talk_pick_id));
        }

        BookmarkRepository::set_talk_pick_bookmark_active_in_tx(&mut tx, bookmark.id, false).await?;
        let bookmarks =
            TalkPickRepository::adjust_bookmarks_in_tx(&mut tx, talk_pick_id, -1).await?;

        tx.commit().await?;

        info!(bookmarks, "话题帖收藏已取消");
        Ok(BookmarkResult {
            bookmark_id: bookmark.id,
            bookmarks,
            notified: false,
        })
    }
}
