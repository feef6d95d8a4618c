//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 收藏结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResult {
    pub bookmark_id: i64,
    /// 变更后的收藏数
    pub bookmarks: i64,
    /// 本次是否发送了里程碑通知
    pub notified: bool,
}

/// 创建评论请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub talk_pick_id: i64,
    pub member_id: i64,
    pub content: String,
}

/// 创建回复请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    pub talk_pick_id: i64,
    pub parent_id: i64,
    pub member_id: i64,
    pub content: String,
}

/// 评论结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResult {
    pub comment_id: i64,
    /// 评论时为话题帖评论总数，回复时为父评论的回复数
    pub count: i64,
    pub notified: bool,
}

/// 点赞结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResult {
    pub like_id: i64,
    pub like_count: i64,
    pub notified: bool,
}

/// 分页请求
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            offset: page.saturating_mul(size),
            size,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub size: usize,
}

/// 最佳评论 DTO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestCommentDto {
    pub id: i64,
    pub member_id: i64,
    pub content: String,
    pub like_count: i64,
    pub is_best: bool,
    pub created_at: DateTime<Utc>,
}
