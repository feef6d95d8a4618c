//! 点赞仓储

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{Like, LikeType};

/// 点赞仓储
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 资源的激活点赞数
    pub async fn count_active(&self, resource_id: i64, like_type: LikeType) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE resource_id = $1 AND like_type = $2 AND active = TRUE
            "#,
        )
        .bind(resource_id)
        .bind(like_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // ==================== 事务操作 ====================

    pub async fn get_for_update(
        tx: &mut PgConnection,
        resource_id: i64,
        like_type: LikeType,
        member_id: i64,
    ) -> Result<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, resource_id, like_type, member_id, active, created_at, updated_at
            FROM likes
            WHERE resource_id = $1 AND like_type = $2 AND member_id = $3
            FOR UPDATE
            "#,
        )
        .bind(resource_id)
        .bind(like_type)
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(like)
    }

    pub async fn create_in_tx(
        tx: &mut PgConnection,
        resource_id: i64,
        like_type: LikeType,
        member_id: i64,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO likes (resource_id, like_type, member_id, active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id
            "#,
        )
        .bind(resource_id)
        .bind(like_type)
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(id)
    }

    pub async fn set_active_in_tx(tx: &mut PgConnection, id: i64, active: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE likes
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

    pub async fn count_active_in_tx(
        tx: &mut PgConnection,
        resource_id: i64,
        like_type: LikeType,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE resource_id = $1 AND like_type = $2 AND active = TRUE
            "#,
        )
        .bind(resource_id)
        .bind(like_type)
        .fetch_one(&mut *tx)
        .await?;

        Ok(count)
    }
}
