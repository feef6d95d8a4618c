//! 通知投递
//!
//! 投递器是通知引擎与外部通知服务之间的边界。投递失败向上传播，
//! 由调用方所在的事务整体回滚。

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::Notification;
use crate::error::{Result, ServiceError};

/// 通知投递器 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// 投递一条通知
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// 广播投递器
///
/// 进程内广播通道，外部通知服务或测试通过 `subscribe` 消费。
/// 没有订阅者时通知直接丢弃。
#[derive(Clone)]
pub struct BroadcastDispatcher {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastDispatcher {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl NotificationDispatcher for BroadcastDispatcher {
    async fn send(&self, notification: &Notification) -> Result<()> {
        match self.sender.send(notification.clone()) {
            Ok(receivers) => {
                debug!(
                    notification_id = %notification.notification_id,
                    receivers,
                    "通知已广播"
                );
                Ok(())
            }
            Err(_) => {
                debug!(
                    notification_id = %notification.notification_id,
                    "没有订阅者，通知被丢弃"
                );
                Ok(())
            }
        }
    }
}

/// 始终失败的投递器，外部通知服务不可用时使用
#[derive(Debug, Clone, Default)]
pub struct UnavailableDispatcher;

#[async_trait]
impl NotificationDispatcher for UnavailableDispatcher {
    async fn send(&self, notification: &Notification) -> Result<()> {
        Err(ServiceError::Dispatch(format!(
            "通知服务不可用: {}",
            notification.notification_id
        )))
    }
}
