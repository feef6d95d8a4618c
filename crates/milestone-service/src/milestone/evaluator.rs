//! 里程碑判定
//!
//! 纯函数：根据变更后的计数值和历史判断是否触发，不产生副作用。

use serde::Serialize;

use super::standard::{BadgeTier, MilestonePolicy};
use crate::models::{EventPrefix, NotificationHistory};

/// 判定结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub count: i64,
    pub event_key: String,
    pub fires: bool,
}

impl Evaluation {
    /// 触发时附带的徽章
    pub fn badge(&self) -> Option<BadgeTier> {
        if self.fires {
            BadgeTier::for_count(self.count)
        } else {
            None
        }
    }
}

/// 判定计数值是否触发里程碑通知
///
/// 命中阈值且历史中该事件键尚未发送时触发。
pub fn evaluate(
    count: i64,
    prefix: EventPrefix,
    policy: MilestonePolicy,
    history: &NotificationHistory,
) -> Evaluation {
    let event_key = prefix.event_key(count);
    let fires = policy.is_milestone(count) && !history.is_sent(&event_key);

    Evaluation {
        count,
        event_key,
        fires,
    }
}
