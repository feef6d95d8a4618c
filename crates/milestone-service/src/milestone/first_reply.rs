//! 回复通知判定
//!
//! 首条回复优先于回复数里程碑：首条回复触发时本次不再检查 50/100。

use serde::Serialize;

use super::evaluator::{Evaluation, evaluate};
use crate::models::{FIRST_REPLY_KEY, MilestoneSite, NotificationHistory};

/// 父评论的回复状态
#[derive(Debug, Clone)]
pub struct ReplyContext {
    /// 新回复写入后的回复数
    pub reply_count: i64,
    pub parent_author_id: i64,
    /// 父评论下所有回复的作者
    pub reply_author_ids: Vec<i64>,
    pub already_notified_first_reply: bool,
}

impl ReplyContext {
    fn has_reply_from_other(&self) -> bool {
        self.reply_author_ids
            .iter()
            .any(|author_id| *author_id != self.parent_author_id)
    }
}

/// 回复通知决策
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReplyDecision {
    /// 发送首条回复通知
    FirstReply,
    /// 回复数里程碑（50 或 100）
    Milestone(Evaluation),
    /// 不通知
    Skip,
}

/// 判定回复通知
pub fn decide(context: &ReplyContext, history: &NotificationHistory) -> ReplyDecision {
    if context.has_reply_from_other()
        && !context.already_notified_first_reply
        && !history.is_sent(FIRST_REPLY_KEY)
    {
        return ReplyDecision::FirstReply;
    }

    let site = MilestoneSite::CommentReply;
    let evaluation = evaluate(context.reply_count, site.prefix(), site.policy(), history);
    if evaluation.fires {
        ReplyDecision::Milestone(evaluation)
    } else {
        ReplyDecision::Skip
    }
}
