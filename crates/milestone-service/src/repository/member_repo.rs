//! 会员仓储

use sqlx::PgConnection;

use crate::error::Result;

/// 会员仓储
pub struct MemberRepository;

impl MemberRepository {
    /// 会员是否存在
    pub async fn exists_in_tx(tx: &mut PgConnection, id: i64) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM members WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        Ok(exists)
    }
}
