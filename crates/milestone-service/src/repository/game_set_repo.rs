//! 平衡游戏集合仓储
//!
//! 集合、集合下的游戏以及投票的数据访问

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::GameSet;

/// 平衡游戏集合仓储
pub struct GameSetRepository {
    pool: PgPool,
}

impl GameSetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 获取集合
    pub async fn find_by_id(&self, id: i64) -> Result<Option<GameSet>> {
        let game_set = sqlx::query_as::<_, GameSet>(
            r#"
            SELECT id, member_id, title, bookmarks, notification_history,
                   created_at, updated_at
            FROM game_sets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game_set)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取集合（带行级锁）
    ///
    /// 收藏数和通知历史的读改写都以集合行锁串行化
    pub async fn get_for_update(tx: &mut PgConnection, id: i64) -> Result<Option<GameSet>> {
        let game_set = sqlx::query_as::<_, GameSet>(
            r#"
            SELECT id, member_id, title, bookmarks, notification_history,
                   created_at, updated_at
            FROM game_sets
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(game_set)
    }

    /// 游戏是否属于该集合
    pub async fn has_game_in_tx(tx: &mut PgConnection, game_set_id: i64, game_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM games WHERE id = $1 AND game_set_id = $2)
            "#,
        )
        .bind(game_id)
        .bind(game_set_id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(exists)
    }

    /// 集合中的第一个游戏
    pub async fn first_game_id_in_tx(tx: &mut PgConnection, game_set_id: i64) -> Result<Option<i64>> {
        let game_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM games
            WHERE game_set_id = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(game_set_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(game_id)
    }

    /// 在事务中调整收藏数，返回调整后的值
    ///
    /// 收藏数不会低于 0
    pub async fn adjust_bookmarks_in_tx(tx: &mut PgConnection, id: i64, delta: i64) -> Result<i64> {
        let bookmarks = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE game_sets
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

    /// 在事务中将会员在该集合下的投票置为非激活
    pub async fn deactivate_votes_in_tx(
        tx: &mut PgConnection,
        member_id: i64,
        game_set_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE game_votes
            SET active = FALSE
            WHERE member_id = $1
              AND active = TRUE
              AND game_id IN (SELECT id FROM games WHERE game_set_id = $2)
            "#,
        )
        .bind(member_id)
        .bind(game_set_id)
        .execute(&mut *tx)
        .await?;

        Ok(result.rows_affected())
    }
}
