//! 平衡游戏收藏服务
//!
//! 收藏数增加时通知集合作者（分类 `WRITTEN_GAME`）。
//!
//! ## 收藏流程
//!
//! 1. 锁定集合 -> 2. 校验会员与归属 -> 3. 新建或恢复收藏
//!    -> 4. 收藏数实际增加时 +1 并判定里程碑 -> 5. 写回历史 -> 6. 提交

use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use super::dto::BookmarkResult;
use super::{ensure_member, notify_milestone};
use crate::error::{Result, ServiceError};
use crate::milestone::MilestoneNotifier;
use crate::models::{GameBookmark, GameSet, MilestoneSite, NotificationCategory};
use crate::notification::{NotificationTarget, ResourceRef};
use crate::repository::{BookmarkRepository, GameSetRepository, HistoryOwner};

/// 平衡游戏收藏服务
pub struct GameBookmarkService {
    pool: PgPool,
    notifier: Arc<MilestoneNotifier>,
}

impl GameBookmarkService {
    pub fn new(pool: PgPool, notifier: Arc<MilestoneNotifier>) -> Self {
        Self { pool, notifier }
    }

    /// 收藏集合中的某个游戏
    ///
    /// 已有收藏记录时恢复并更新游戏，同时清除结束标记
    #[instrument(skip(self))]
    pub async fn create_bookmark(
        &self,
        game_set_id: i64,
        game_id: i64,
        member_id: i64,
    ) -> Result<BookmarkResult> {
        let mut tx = self.pool.begin().await?;

        let game_set = Self::lock_bookmarkable(&mut tx, game_set_id, member_id).await?;

        let existing =
            BookmarkRepository::get_game_bookmark_for_update(&mut tx, member_id, game_set_id)
                .await?;

        if let Some(bookmark) = &existing
            && bookmark.active
            && bookmark.game_id == game_id
        {
            return Err(ServiceError::AlreadyBookmarked(game_set_id));
        }

        if !GameSetRepository::has_game_in_tx(&mut tx, game_set_id, game_id).await? {
            return Err(ServiceError::GameNotInGameSet {
                game_set_id,
                game_id,
            });
        }

        let result = self
            .upsert_and_notify(&mut tx, &game_set, existing, member_id, game_id, false)
            .await?;

        tx.commit().await?;

        info!(bookmarks = result.bookmarks, notified = result.notified, "游戏收藏成功");
        Ok(result)
    }

    /// 玩完整个集合后收藏
    ///
    /// 收藏集合的第一个游戏并打上结束标记；恢复已有收藏时同时作废该会员在集合下的投票
    #[instrument(skip(self))]
    pub async fn create_end_game_set_bookmark(
        &self,
        game_set_id: i64,
        member_id: i64,
    ) -> Result<BookmarkResult> {
        let mut tx = self.pool.begin().await?;

        let game_set = Self::lock_bookmarkable(&mut tx, game_set_id, member_id).await?;

        let game_id = GameSetRepository::first_game_id_in_tx(&mut tx, game_set_id)
            .await?
            .ok_or(ServiceError::GameNotFound(game_set_id))?;

        let existing =
            BookmarkRepository::get_game_bookmark_for_update(&mut tx, member_id, game_set_id)
                .await?;

        if existing.is_some() {
            let deactivated =
                GameSetRepository::deactivate_votes_in_tx(&mut tx, member_id, game_set_id).await?;
            info!(deactivated, "已作废集合下的投票");
        }

        let result = self
            .upsert_and_notify(&mut tx, &game_set, existing, member_id, game_id, true)
            .await?;

        tx.commit().await?;

        info!(bookmarks = result.bookmarks, notified = result.notified, "结束收藏成功");
        Ok(result)
    }

    /// 取消收藏（不通知）
    #[instrument(skip(self))]
    pub async fn delete_bookmark(&self, game_set_id: i64, member_id: i64) -> Result<BookmarkResult> {
        let mut tx = self.pool.begin().await?;

        GameSetRepository::get_for_update(&mut tx, game_set_id)
            .await?
            .ok_or(ServiceError::GameSetNotFound(game_set_id))?;
        ensure_member(&mut tx, member_id).await?;

        let bookmark =
            BookmarkRepository::get_game_bookmark_for_update(&mut tx, member_id, game_set_id)
                .await?
                .ok_or(ServiceError::BookmarkNotFound {
                    member_id,
                    resource_id: game_set_id,
                })?;

        if !bookmark.active {
            return Err(ServiceError::AlreadyDeletedBookmark(game_set_id));
        }

        BookmarkRepository::deactivate_game_bookmark_in_tx(&mut tx, bookmark.id).await?;
        let bookmarks = GameSetRepository::adjust_bookmarks_in_tx(&mut tx, game_set_id, -1).await?;

        tx.commit().await?;

        info!(bookmarks, "游戏收藏已取消");
        Ok(BookmarkResult {
            bookmark_id: bookmark.id,
            bookmarks,
            notified: false,
        })
    }

    /// 锁定集合并校验收藏者
    async fn lock_bookmarkable(
        tx: &mut PgConnection,
        game_set_id: i64,
        member_id: i64,
    ) -> Result<GameSet> {
        let game_set = GameSetRepository::get_for_update(tx, game_set_id)
            .await?
            .ok_or(ServiceError::GameSetNotFound(game_set_id))?;

        ensure_member(tx, member_id).await?;

        if game_set.is_owned_by(member_id) {
            return Err(ServiceError::CannotBookmarkOwnResource(game_set_id));
        }

        Ok(game_set)
    }

    /// 新建或恢复收藏；收藏数实际增加时判定里程碑
    async fn upsert_and_notify(
        &self,
        tx: &mut PgConnection,
        game_set: &GameSet,
        existing: Option<GameBookmark>,
        member_id: i64,
        game_id: i64,
        is_end_game_set: bool,
    ) -> Result<BookmarkResult> {
        let (bookmark_id, increased) = match existing {
            Some(bookmark) => {
                BookmarkRepository::activate_game_bookmark_in_tx(
                    tx,
                    bookmark.id,
                    game_id,
                    is_end_game_set,
                )
                .await?;
                (bookmark.id, !bookmark.active)
            }
            None => {
                let id = BookmarkRepository::create_game_bookmark_in_tx(
                    tx,
                    member_id,
                    game_set.id,
                    game_id,
                    is_end_game_set,
                )
                .await?;
                (id, true)
            }
        };

        if !increased {
            return Ok(BookmarkResult {
                bookmark_id,
                bookmarks: game_set.bookmarks,
                notified: false,
            });
        }

        let bookmarks = GameSetRepository::adjust_bookmarks_in_tx(tx, game_set.id, 1).await?;

        let target = NotificationTarget::new(
            game_set.member_id,
            ResourceRef::GameSet(game_set.id),
            NotificationCategory::WrittenGame,
        );
        let notified = notify_milestone(
            tx,
            &self.notifier,
            MilestoneSite::GameBookmark,
            bookmarks,
            &target,
            (HistoryOwner::GameSet, game_set.id),
            game_set.notification_history.0.clone(),
        )
        .await?;

        Ok(BookmarkResult {
            bookmark_id,
            bookmarks,
            notified,
        })
    }
}
