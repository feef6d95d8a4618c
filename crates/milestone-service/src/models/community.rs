//! 社区实体
//!
//! 持有计数器和通知历史的父资源，以及收藏、评论、点赞记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use super::enums::LikeType;
use super::history::NotificationHistory;

/// 平衡游戏集合
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameSet {
    pub id: i64,
    pub member_id: i64,
    pub title: String,
    /// 收藏数
    pub bookmarks: i64,
    pub notification_history: Json<NotificationHistory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameSet {
    pub fn is_owned_by(&self, member_id: i64) -> bool {
        self.member_id == member_id
    }
}

/// 话题帖
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TalkPick {
    pub id: i64,
    pub member_id: i64,
    pub title: String,
    pub content: String,
    /// 收藏数
    pub bookmarks: i64,
    pub notification_history: Json<NotificationHistory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TalkPick {
    pub fn is_owned_by(&self, member_id: i64) -> bool {
        self.member_id == member_id
    }
}

/// 评论或回复
///
/// `parent_id` 为空表示顶层评论
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub talk_pick_id: i64,
    pub member_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub is_best: bool,
    pub is_notified_for_first_reply: bool,
    pub is_edited: bool,
    pub notification_history: Json<NotificationHistory>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_written_by(&self, member_id: i64) -> bool {
        self.member_id == member_id
    }

    pub fn belongs_to(&self, talk_pick_id: i64) -> bool {
        self.talk_pick_id == talk_pick_id
    }
}

/// 平衡游戏收藏
///
/// 每个会员对同一集合只有一条记录，取消收藏只是置为非激活
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameBookmark {
    pub id: i64,
    pub member_id: i64,
    pub game_set_id: i64,
    pub game_id: i64,
    pub active: bool,
    pub is_end_game_set: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 话题帖收藏
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TalkPickBookmark {
    pub id: i64,
    pub member_id: i64,
    pub talk_pick_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 点赞记录
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: i64,
    pub resource_id: i64,
    pub like_type: LikeType,
    pub member_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 带点赞数的评论（最佳评论排序用）
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentWithLikes {
    pub id: i64,
    pub member_id: i64,
    pub content: String,
    pub is_best: bool,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}
