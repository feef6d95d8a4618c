//! 评论仓储
//!
//! 评论与回复同表存储，通过 `parent_id` 构成树

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{Comment, CommentWithLikes, LikeType};

/// 评论仓储
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 获取评论
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, talk_pick_id, member_id, parent_id, content, is_best,
                   is_notified_for_first_reply, is_edited, notification_history,
                   created_at, edited_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// 话题帖的顶层评论及其激活点赞数
    pub async fn list_top_level_with_likes(
        &self,
        talk_pick_id: i64,
    ) -> Result<Vec<CommentWithLikes>> {
        let comments = sqlx::query_as::<_, CommentWithLikes>(
            r#"
            SELECT c.id, c.member_id, c.content, c.is_best, c.created_at,
                   COUNT(l.id) AS like_count
            FROM comments c
            LEFT JOIN likes l
              ON l.resource_id = c.id AND l.like_type = $2 AND l.active = TRUE
            WHERE c.talk_pick_id = $1 AND c.parent_id IS NULL
            GROUP BY c.id
            ORDER BY like_count DESC, c.created_at ASC
            "#,
        )
        .bind(talk_pick_id)
        .bind(LikeType::Comment)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// 修改评论内容
    pub async fn update_content(&self, id: i64, content: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET content = $2, is_edited = TRUE, edited_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 删除评论（回复级联删除）
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 批量更新话题帖顶层评论的最佳标记
    pub async fn update_best_flags(&self, talk_pick_id: i64, best_ids: &[i64]) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET is_best = (id = ANY($2))
            WHERE talk_pick_id = $1 AND parent_id IS NULL
            "#,
        )
        .bind(talk_pick_id)
        .bind(best_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取评论（带行级锁）
    pub async fn get_for_update(tx: &mut PgConnection, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, talk_pick_id, member_id, parent_id, content, is_best,
                   is_notified_for_first_reply, is_edited, notification_history,
                   created_at, edited_at
            FROM comments
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(comment)
    }

    /// 评论深度（顶层评论为 0）
    pub async fn depth_in_tx(tx: &mut PgConnection, id: i64) -> Result<i64> {
        let depth = sqlx::query_scalar::<_, i64>(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT id, parent_id, 0::BIGINT AS depth
                FROM comments
                WHERE id = $1
                UNION ALL
                SELECT c.id, c.parent_id, a.depth + 1
                FROM comments c
                JOIN ancestors a ON c.id = a.parent_id
            )
            SELECT COALESCE(MAX(depth), 0)::BIGINT FROM ancestors
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(depth)
    }

    /// 在事务中创建评论或回复
    pub async fn create_in_tx(
        tx: &mut PgConnection,
        talk_pick_id: i64,
        member_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (talk_pick_id, member_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, talk_pick_id, member_id, parent_id, content, is_best,
                      is_notified_for_first_reply, is_edited, notification_history,
                      created_at, edited_at
            "#,
        )
        .bind(talk_pick_id)
        .bind(member_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        Ok(comment)
    }

    /// 话题帖的评论总数（含回复）
    pub async fn count_by_talk_pick_in_tx(tx: &mut PgConnection, talk_pick_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE talk_pick_id = $1",
        )
        .bind(talk_pick_id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(count)
    }

    /// 父评论下所有回复的作者（按回复顺序）
    pub async fn reply_author_ids_in_tx(tx: &mut PgConnection, parent_id: i64) -> Result<Vec<i64>> {
        let authors = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT member_id FROM comments
            WHERE parent_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut *tx)
        .await?;

        Ok(authors)
    }

    /// 标记父评论已发送首条回复通知
    pub async fn mark_first_reply_notified_in_tx(tx: &mut PgConnection, id: i64) -> Result<()> {
        sqlx::query("UPDATE comments SET is_notified_for_first_reply = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }
}
