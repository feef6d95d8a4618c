//! 话题帖仓储

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::TalkPick;

/// 话题帖仓储
pub struct TalkPickRepository {
    pool: PgPool,
}

impl TalkPickRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取话题帖
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TalkPick>> {
        let talk_pick = sqlx::query_as::<_, TalkPick>(
            r#"
            SELECT id, member_id, title, content, bookmarks, notification_history,
                   created_at, updated_at
            FROM talk_picks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(talk_pick)
    }

    /// 在事务中获取话题帖（带行级锁）
    pub async fn get_for_update(tx: &mut PgConnection, id: i64) -> Result<Option<TalkPick>> {
        let talk_pick = sqlx::query_as::<_, TalkPick>(
            r#"
            SELECT id, member_id, title, content, bookmarks, notification_history,
                   created_at, updated_at
            FROM talk_picks
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(talk_pick)
    }

    /// 在事务中获取话题帖（不加锁）
    pub async fn get_in_tx(tx: &mut PgConnection, id: i64) -> Result<Option<TalkPick>> {
        let talk_pick = sqlx::query_as::<_, TalkPick>(
            r#"
            SELECT id, member_id, title, content, bookmarks, notification_history,
                   created_at, updated_at
            FROM talk_picks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(talk_pick)
    }

    /// 在事务中调整收藏数，返回调整后的值
    pub async fn adjust_bookmarks_in_tx(tx: &mut PgConnection, id: i64, delta: i64) -> Result<i64> {
        let bookmarks = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE talk_picks
            SET bookmarks = GREATEST(bookmarks + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING bookmarks
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        Ok(bookmarks)
    }
}
