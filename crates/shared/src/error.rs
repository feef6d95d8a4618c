//! 基础设施错误
//!
//! 业务错误由各服务自行定义；这里只覆盖连接池和迁移。

use thiserror::Error;

/// PostgreSQL 序列化失败
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL 检测到死锁
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => is_transient(e),
            Self::Migration(_) => false,
        }
    }
}

/// 判断 sqlx 错误是否为瞬时错误
///
/// 连接池超时、IO 错误，以及行锁竞争导致的序列化失败和死锁，重试可能成功。
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = SharedError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(is_transient(&sqlx::Error::PoolClosed));
        assert!(!is_transient(&sqlx::Error::RowNotFound));

        assert!(SharedError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!SharedError::Database(sqlx::Error::RowNotFound).is_retryable());
    }
}
