//! 里程碑服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 里程碑服务错误类型
#[derive(Debug, Error)]
pub enum ServiceError {
    // === 资源不存在 ===
    #[error("话题帖不存在: {0}")]
    TalkPickNotFound(i64),

    #[error("游戏集合不存在: {0}")]
    GameSetNotFound(i64),

    #[error("游戏不属于该集合: game_set_id={game_set_id}, game_id={game_id}")]
    GameNotInGameSet { game_set_id: i64, game_id: i64 },

    #[error("游戏集合中没有游戏: {0}")]
    GameNotFound(i64),

    #[error("评论不存在: {0}")]
    CommentNotFound(i64),

    #[error("会员不存在: {0}")]
    MemberNotFound(i64),

    #[error("收藏不存在: member_id={member_id}, resource_id={resource_id}")]
    BookmarkNotFound { member_id: i64, resource_id: i64 },

    // === 收藏 ===
    #[error("不能收藏自己发布的内容: {0}")]
    CannotBookmarkOwnResource(i64),

    #[error("已经收藏过: {0}")]
    AlreadyBookmarked(i64),

    #[error("收藏已被取消: {0}")]
    AlreadyDeletedBookmark(i64),

    // === 评论 ===
    #[error("父评论不属于该话题帖: talk_pick_id={talk_pick_id}, parent_id={parent_id}")]
    ParentCommentNotInTalkPick { talk_pick_id: i64, parent_id: i64 },

    #[error("评论不属于该话题帖: talk_pick_id={talk_pick_id}, comment_id={comment_id}")]
    CommentNotInTalkPick { talk_pick_id: i64, comment_id: i64 },

    #[error("超过最大回复深度: max_depth={max_depth}")]
    ExceedMaxDepth { max_depth: usize },

    #[error("无权修改评论: {0}")]
    ForbiddenCommentModify(i64),

    #[error("无权删除评论: {0}")]
    ForbiddenCommentDelete(i64),

    // === 点赞 ===
    #[error("不能给自己的评论点赞: {0}")]
    ForbiddenLikeOwnComment(i64),

    #[error("已经点赞过该评论: {0}")]
    AlreadyLikedComment(i64),

    #[error("尚未点赞该评论: {0}")]
    NotLikedComment(i64),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("通知投递失败: {0}")]
    Dispatch(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// 检查是否为可重试的错误
    ///
    /// 投递失败，以及连接池超时、锁竞争等瞬时数据库错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => talk_shared::error::is_transient(e),
            Self::Dispatch(_) => true,
            _ => false,
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Dispatch(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TalkPickNotFound(_) => "NOT_FOUND_TALK_PICK",
            Self::GameSetNotFound(_) => "NOT_FOUND_GAME_SET",
            Self::GameNotInGameSet { .. } => "NOT_FOUND_BALANCE_GAME_THAT_GAME_SET",
            Self::GameNotFound(_) => "NOT_FOUND_BALANCE_GAME",
            Self::CommentNotFound(_) => "NOT_FOUND_COMMENT",
            Self::MemberNotFound(_) => "NOT_FOUND_MEMBER",
            Self::BookmarkNotFound { .. } => "NOT_FOUND_BOOKMARK",
            Self::CannotBookmarkOwnResource(_) => "CANNOT_BOOKMARK_MY_RESOURCE",
            Self::AlreadyBookmarked(_) => "ALREADY_BOOKMARKED",
            Self::AlreadyDeletedBookmark(_) => "ALREADY_DELETED_BOOKMARK",
            Self::ParentCommentNotInTalkPick { .. } => "NOT_FOUND_PARENT_COMMENT_AT_THAT_TALK_PICK",
            Self::CommentNotInTalkPick { .. } => "NOT_FOUND_COMMENT_AT_THAT_TALK_PICK",
            Self::ExceedMaxDepth { .. } => "EXCEED_MAX_DEPTH",
            Self::ForbiddenCommentModify(_) => "FORBIDDEN_COMMENT_MODIFY",
            Self::ForbiddenCommentDelete(_) => "FORBIDDEN_COMMENT_DELETE",
            Self::ForbiddenLikeOwnComment(_) => "FORBIDDEN_LIKE_OWN_COMMENT",
            Self::AlreadyLikedComment(_) => "ALREADY_LIKED_COMMENT",
            Self::NotLikedComment(_) => "NOT_LIKED_COMMENT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Dispatch(_) => "DISPATCH_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
