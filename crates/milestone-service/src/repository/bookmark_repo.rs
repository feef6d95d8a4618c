//! 收藏仓储
//!
//! 平衡游戏收藏与话题帖收藏。每个会员对同一资源只保留一条记录，
//! 取消和恢复收藏都通过 `active` 标记完成。

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{GameBookmark, TalkPickBookmark};

/// 收藏仓储
pub struct BookmarkRepository {
    pool: PgPool,
}

impl BookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 获取会员对集合的收藏
    pub async fn find_game_bookmark(
        &self,
        member_id: i64,
        game_set_id: i64,
    ) -> Result<Option<GameBookmark>> {
        let bookmark = sqlx::query_as::<_, GameBookmark>(
            r#"
            SELECT id, member_id, game_set_id, game_id, active, is_end_game_set,
                   created_at, updated_at
            FROM game_bookmarks
            WHERE member_id = $1 AND game_set_id = $2
            "#,
        )
        .bind(member_id)
        .bind(game_set_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bookmark)
    }

    /// 获取会员对话题帖的收藏
    pub async fn find_talk_pick_bookmark(
        &self,
        member_id: i64,
        talk_pick_id: i64,
    ) -> Result<Option<TalkPickBookmark>> {
        let bookmark = sqlx::query_as::<_, TalkPickBookmark>(
            r#"
            SELECT id, member_id, talk_pick_id, active, created_at, updated_at
            FROM talk_pick_bookmarks
            WHERE member_id = $1 AND talk_pick_id = $2
            "#,
        )
        .bind(member_id)
        .bind(talk_pick_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bookmark)
    }

    // ==================== 平衡游戏收藏（事务） ====================

    pub async fn get_game_bookmark_for_update(
        tx: &mut PgConnection,
        member_id: i64,
        game_set_id: i64,
    ) -> Result<Option<GameBookmark>> {
        let bookmark = sqlx::query_as::<_, GameBookmark>(
            r#"
            SELECT id, member_id, game_set_id, game_id, active, is_end_game_set,
                   created_at, updated_at
            FROM game_bookmarks
            WHERE member_id = $1 AND game_set_id = $2
            FOR UPDATE
            "#,
        )
        .bind(member_id)
        .bind(game_set_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(bookmark)
    }

    pub async fn create_game_bookmark_in_tx(
        tx: &mut PgConnection,
        member_id: i64,
        game_set_id: i64,
        game_id: i64,
        is_end_game_set: bool,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO game_bookmarks (member_id, game_set_id, game_id, active, is_end_game_set)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(game_set_id)
        .bind(game_id)
        .bind(is_end_game_set)
        .fetch_one(&mut *tx)
        .await?;

        Ok(id)
    }

    /// 恢复收藏并更新游戏和结束标记
    pub async fn activate_game_bookmark_in_tx(
        tx: &mut PgConnection,
        id: i64,
        game_id: i64,
        is_end_game_set: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE game_bookmarks
            SET active = TRUE, game_id = $2, is_end_game_set = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(game_id)
        .bind(is_end_game_set)
        .execute(&mut *tx)
        .await?;

        Ok(())
    }

    /// 取消收藏并清除结束标记
    pub async fn deactivate_game_bookmark_in_tx(tx: &mut PgConnection, id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE game_bookmarks
            SET active = FALSE, is_end_game_set = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Ok(())
    }

    // ==================== 话题帖收藏（事务） ====================

    pub async fn get_talk_pick_bookmark_for_update(
        tx: &mut PgConnection,
        member_id: i64,
        talk_pick_id: i64,
    ) -> Result<Option<TalkPickBookmark>> {
        let bookmark = sqlx::query_as::<_, TalkPickBookmark>(
            r#"
            SELECT id, member_id, talk_pick_id, active, created_at, updated_at
            FROM talk_pick_bookmarks
            WHERE member_id = $1 AND talk_pick_id = $2
            FOR UPDATE
            "#,
        )
        .bind(member_id)
        .bind(talk_pick_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(bookmark)
    }

    pub async fn create_talk_pick_bookmark_in_tx(
        tx: &mut PgConnection,
        member_id: i64,
        talk_pick_id: i64,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO talk_pick_bookmarks (member_id, talk_pick_id, active)
            VALUES ($1, $2, TRUE)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(talk_pick_id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(id)
    }

    pub async fn set_talk_pick_bookmark_active_in_tx(
        tx: &mut PgConnection,
        id: i64,
        active: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE talk_pick_bookmarks
            SET active = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(active)
        .execute(&mut *tx)
        .await?;

        Ok(())
    }
}
