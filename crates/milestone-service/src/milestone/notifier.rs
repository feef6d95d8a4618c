//! 里程碑通知器
//!
//! 五个调用点共用的判定与投递逻辑。调用方负责在同一事务内完成
//! 计数变更、调用通知器、持久化返回的历史。
//!
//! ## 投递顺序
//!
//! 1. 主消息（渲染计数值）
//! 2. 恰好 100 或 1000 时追加徽章消息
//! 3. 在返回的历史中标记事件键
//!
//! 投递失败直接返回错误，历史不会被标记。

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use talk_shared::observability::metrics as app_metrics;

use super::evaluator::{Evaluation, evaluate};
use super::first_reply::{ReplyContext, ReplyDecision, decide};
use crate::error::Result;
use crate::models::{FIRST_REPLY_KEY, MilestoneSite, NotificationHistory};
use crate::notification::{
    MessageCatalog, Notification, NotificationDispatcher, NotificationKind, NotificationTarget,
};

/// 回复通知结果
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub history: NotificationHistory,
    /// 本次是否发送了首条回复通知，调用方据此更新父评论标记
    pub first_reply_sent: bool,
}

/// 里程碑通知器
#[derive(Clone)]
pub struct MilestoneNotifier {
    dispatcher: Arc<dyn NotificationDispatcher>,
    catalog: Arc<MessageCatalog>,
}

impl MilestoneNotifier {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, catalog: Arc<MessageCatalog>) -> Self {
        Self {
            dispatcher,
            catalog,
        }
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// 判定计数值（无副作用）
    pub fn evaluate(
        &self,
        site: MilestoneSite,
        count: i64,
        history: &NotificationHistory,
    ) -> Evaluation {
        evaluate(count, site.prefix(), site.policy(), history)
    }

    /// 按判定结果投递通知，返回更新后的历史
    ///
    /// 未触发时原样返回历史。
    pub async fn dispatch(
        &self,
        evaluation: &Evaluation,
        site: MilestoneSite,
        target: &NotificationTarget,
        history: NotificationHistory,
    ) -> Result<NotificationHistory> {
        if !evaluation.fires {
            if site.policy().is_milestone(evaluation.count) {
                debug!(event_key = %evaluation.event_key, "里程碑已通知过，跳过");
                app_metrics::record_milestone_suppressed(site.name());
            }
            return Ok(history);
        }

        let templates = self.catalog.templates(site);

        let primary = Notification::new(
            target,
            NotificationKind::Milestone,
            templates.render_primary(evaluation.count),
        );
        self.send(site, &primary).await?;
        app_metrics::record_milestone_notification(site.name(), "milestone");

        if let Some(tier) = evaluation.badge()
            && let Some(message) = templates.badge(tier)
        {
            let badge = Notification::new(target, NotificationKind::Badge, message);
            self.send(site, &badge).await?;
            app_metrics::record_milestone_badge(site.name(), evaluation.count);
        }

        info!(
            site = site.name(),
            event_key = %evaluation.event_key,
            recipient_id = target.recipient_id,
            resource = %target.resource,
            "里程碑通知已发送"
        );

        Ok(history.mark_sent(evaluation.event_key.clone()))
    }

    /// 判定并投递
    #[instrument(skip(self, site, target, history), fields(site = site.name()))]
    pub async fn notify(
        &self,
        site: MilestoneSite,
        count: i64,
        target: &NotificationTarget,
        history: NotificationHistory,
    ) -> Result<NotificationHistory> {
        let evaluation = self.evaluate(site, count, &history);
        self.dispatch(&evaluation, site, target, history).await
    }

    /// 评论回复通知
    ///
    /// 首条回复优先；否则检查回复数 50/100。
    #[instrument(skip(self, context, target, history), fields(reply_count = context.reply_count))]
    pub async fn notify_reply(
        &self,
        context: &ReplyContext,
        target: &NotificationTarget,
        history: NotificationHistory,
    ) -> Result<ReplyOutcome> {
        match decide(context, &history) {
            ReplyDecision::FirstReply => {
                let notification = Notification::new(
                    target,
                    NotificationKind::FirstReply,
                    self.catalog.first_reply.clone(),
                );
                self.send(MilestoneSite::CommentReply, &notification).await?;
                app_metrics::record_milestone_notification(
                    MilestoneSite::CommentReply.name(),
                    "first_reply",
                );

                info!(
                    recipient_id = target.recipient_id,
                    resource = %target.resource,
                    "首条回复通知已发送"
                );

                Ok(ReplyOutcome {
                    history: history.mark_sent(FIRST_REPLY_KEY),
                    first_reply_sent: true,
                })
            }
            ReplyDecision::Milestone(evaluation) => {
                let history = self
                    .dispatch(&evaluation, MilestoneSite::CommentReply, target, history)
                    .await?;
                Ok(ReplyOutcome {
                    history,
                    first_reply_sent: false,
                })
            }
            ReplyDecision::Skip => Ok(ReplyOutcome {
                history,
                first_reply_sent: false,
            }),
        }
    }

    async fn send(&self, site: MilestoneSite, notification: &Notification) -> Result<()> {
        self.dispatcher.send(notification).await.inspect_err(|e| {
            warn!(
                site = site.name(),
                notification_id = %notification.notification_id,
                error = %e,
                "通知投递失败"
            );
            app_metrics::record_dispatch_failure(site.name());
        })
    }
}
