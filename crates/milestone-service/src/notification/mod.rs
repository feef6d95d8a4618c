//! 通知模块
//!
//! 里程碑通知的数据结构、消息模板和投递边界。
//!
//! ## 使用示例
//!
//! ```ignore
//! let dispatcher = Arc::new(BroadcastDispatcher::default());
//! let mut receiver = dispatcher.subscribe();
//!
//! let notifier = MilestoneNotifier::new(dispatcher, Arc::new(MessageCatalog::default()));
//! ```

pub mod dispatcher;
pub mod template;
pub mod types;

pub use dispatcher::{BroadcastDispatcher, NotificationDispatcher, UnavailableDispatcher};
pub use template::{MessageCatalog, SiteTemplates, TemplateEngine};
pub use types::{Notification, NotificationKind, NotificationTarget, ResourceRef};

#[cfg(test)]
pub use dispatcher::MockNotificationDispatcher;
