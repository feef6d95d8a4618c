//! 通知历史仓储
//!
//! 历史作为父资源表的 JSONB 列保存，不单独建表

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::NotificationHistory;

/// 历史所属的父资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryOwner {
    GameSet,
    TalkPick,
    Comment,
}

impl HistoryOwner {
    fn table(&self) -> &'static str {
        match self {
            Self::GameSet => "game_sets",
            Self::TalkPick => "talk_picks",
            Self::Comment => "comments",
        }
    }
}

/// 通知历史仓储
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 读取父资源的历史，父资源不存在时返回 None
    pub async fn find(&self, owner: HistoryOwner, id: i64) -> Result<Option<NotificationHistory>> {
        let sql = format!(
            "SELECT notification_history FROM {} WHERE id = $1",
            owner.table()
        );
        let history = sqlx::query_scalar::<_, Json<NotificationHistory>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(history.map(|Json(history)| history))
    }

    /// 在事务中保存历史
    ///
    /// 调用方应已在同一事务中锁定父资源行
    pub async fn save_in_tx(
        tx: &mut PgConnection,
        owner: HistoryOwner,
        id: i64,
        history: &NotificationHistory,
    ) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET notification_history = $2 WHERE id = $1",
            owner.table()
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(Json(history))
            .execute(&mut *tx)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_table() {
        assert_eq!(HistoryOwner::GameSet.table(), "game_sets");
        assert_eq!(HistoryOwner::TalkPick.table(), "talk_picks");
        assert_eq!(HistoryOwner::Comment.table(), "comments");
    }
}
