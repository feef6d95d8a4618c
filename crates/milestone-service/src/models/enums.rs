//! 里程碑服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::milestone::MilestonePolicy;

/// 首条回复事件键
pub const FIRST_REPLY_KEY: &str = "FIRST_REPLY";

/// 事件键前缀
///
/// 与计数值拼接成历史中的事件键，例如 `BOOKMARK_100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPrefix {
    Bookmark,
    Comment,
    Reply,
    Like,
}

impl EventPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bookmark => "BOOKMARK",
            Self::Comment => "COMMENT",
            Self::Reply => "REPLY",
            Self::Like => "LIKE",
        }
    }

    /// 生成事件键
    pub fn event_key(&self, count: i64) -> String {
        format!("{}_{}", self.as_str(), count)
    }
}

impl fmt::Display for EventPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通知分类
///
/// 区分“我发布的内容”与“他人的内容”两类通知分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    /// 我发布的平衡游戏
    WrittenGame,
    /// 我发布的话题帖
    WrittenTalkPick,
    /// 他人的话题帖
    OthersTalkPick,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrittenGame => "WRITTEN_GAME",
            Self::WrittenTalkPick => "WRITTEN_TALK_PICK",
            Self::OthersTalkPick => "OTHERS_TALK_PICK",
        }
    }

    /// 话题帖相关分类：资源作者即话题帖作者时归为“我发布的”
    pub fn for_talk_pick(resource_author_id: i64, talk_pick_author_id: i64) -> Self {
        if resource_author_id == talk_pick_author_id {
            Self::WrittenTalkPick
        } else {
            Self::OthersTalkPick
        }
    }
}

/// 里程碑调用点
///
/// 每个调用点对应一种计数器，决定事件键前缀、判定策略和消息模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneSite {
    /// 平衡游戏集合的收藏数
    GameBookmark,
    /// 话题帖的收藏数
    TalkPickBookmark,
    /// 话题帖的评论数
    TalkPickComment,
    /// 评论的回复数
    CommentReply,
    /// 评论的点赞数
    CommentLike,
}

impl MilestoneSite {
    pub fn prefix(&self) -> EventPrefix {
        match self {
            Self::GameBookmark | Self::TalkPickBookmark => EventPrefix::Bookmark,
            Self::TalkPickComment => EventPrefix::Comment,
            Self::CommentReply => EventPrefix::Reply,
            Self::CommentLike => EventPrefix::Like,
        }
    }

    /// 回复数只在 50、100 时通知，其余调用点走标准里程碑
    pub fn policy(&self) -> MilestonePolicy {
        match self {
            Self::CommentReply => MilestonePolicy::ReplyCount,
            _ => MilestonePolicy::Standard,
        }
    }

    /// 指标标签
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameBookmark => "game_bookmark",
            Self::TalkPickBookmark => "talk_pick_bookmark",
            Self::TalkPickComment => "talk_pick_comment",
            Self::CommentReply => "comment_reply",
            Self::CommentLike => "comment_like",
        }
    }
}

/// 点赞资源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LikeType {
    #[default]
    Comment,
}
