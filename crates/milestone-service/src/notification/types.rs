//! 通知类型定义
//!
//! 定义里程碑通知的数据结构。通知不落库，由投递器交给外部通知服务。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::NotificationCategory;

/// 通知指向的资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceRef {
    GameSet(i64),
    TalkPick(i64),
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameSet(id) => write!(f, "game_set:{}", id),
            Self::TalkPick(id) => write!(f, "talk_pick:{}", id),
        }
    }
}

/// 通知种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// 计数达到里程碑
    Milestone,
    /// 恰好 100 或 1000 时附带的徽章通知
    Badge,
    /// 评论收到他人的第一条回复
    FirstReply,
}

/// 通知接收方和分类
///
/// 由调用点根据父资源计算，通知引擎只负责填充消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub recipient_id: i64,
    pub resource: ResourceRef,
    pub category: NotificationCategory,
}

impl NotificationTarget {
    pub fn new(recipient_id: i64, resource: ResourceRef, category: NotificationCategory) -> Self {
        Self {
            recipient_id,
            resource,
            category,
        }
    }
}

/// 通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 通知唯一标识
    pub notification_id: String,
    /// 接收会员 ID
    pub recipient_id: i64,
    pub resource: ResourceRef,
    pub category: NotificationCategory,
    pub kind: NotificationKind,
    /// 已渲染的消息正文
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(target: &NotificationTarget, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            notification_id: Uuid::now_v7().to_string(),
            recipient_id: target.recipient_id,
            resource: target.resource,
            category: target.category,
            kind,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
