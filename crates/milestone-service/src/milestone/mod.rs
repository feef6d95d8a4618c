//! 里程碑通知引擎
//!
//! 计数器变更后判断是否跨过通知阈值，利用父资源持久化的历史去重，
//! 并投递对应调用点的消息。
//!
//! - `standard`: 阈值与判定策略
//! - `evaluator`: 纯判定函数
//! - `first_reply`: 回复调用点的首条回复规则
//! - `notifier`: 判定 + 投递，返回更新后的历史

pub mod evaluator;
pub mod first_reply;
pub mod notifier;
pub mod standard;

pub use evaluator::{Evaluation, evaluate};
pub use first_reply::{ReplyContext, ReplyDecision};
pub use notifier::{MilestoneNotifier, ReplyOutcome};
pub use standard::{BadgeTier, MilestonePolicy, MilestoneStandard, is_milestone};
