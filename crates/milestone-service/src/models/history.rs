//! 通知历史
//!
//! 每个父资源（游戏集合、话题帖、评论）各自持有一份历史，
//! 以 JSONB 形式随父资源一起持久化。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 里程碑通知历史
///
/// 事件键（如 `BOOKMARK_100`、`FIRST_REPLY`）到“是否已发送”的映射。
/// 缺失的键等同于未发送；键一旦置为 `true` 就不会再被重置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHistory(HashMap<String, bool>);

impl NotificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 该事件是否已发送过通知
    pub fn is_sent(&self, event_key: &str) -> bool {
        self.0.get(event_key).copied().unwrap_or(false)
    }

    /// 标记事件已发送，返回更新后的历史
    #[must_use]
    pub fn mark_sent(mut self, event_key: impl Into<String>) -> Self {
        self.0.insert(event_key.into(), true);
        self
    }

    /// 已发送的事件键（按字典序）
    pub fn sent_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .0
            .iter()
            .filter(|(_, sent)| **sent)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for NotificationHistory {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
