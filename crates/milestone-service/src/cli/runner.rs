//! 命令执行器
//!
//! 将命令行参数转化为数据库操作和里程碑判定

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use talk_shared::database::Database;

use crate::MIGRATOR;
use crate::milestone::first_reply::decide;
use crate::milestone::{BadgeTier, Evaluation, ReplyContext, ReplyDecision, evaluate};
use crate::models::{FIRST_REPLY_KEY, MilestoneSite, NotificationHistory};
use crate::notification::MessageCatalog;
use crate::repository::{HistoryOwner, HistoryRepository};
use crate::settings::ServiceSettings;

/// `check` 命令的输出
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub site: &'static str,
    /// `milestone`、`first_reply` 或 `skip`
    pub decision: &'static str,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    /// 触发时将发送的消息
    pub messages: Vec<String>,
}

/// 回复调用点的父评论状态（其他调用点忽略）
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyFlags {
    /// 回复中包含父评论作者以外的会员
    pub other_author: bool,
    /// 父评论已发送过首条回复通知
    pub first_reply_notified: bool,
}

impl ReplyFlags {
    fn context(&self, reply_count: i64) -> ReplyContext {
        const PARENT_AUTHOR: i64 = 1;
        const OTHER_MEMBER: i64 = 2;

        let replier = if self.other_author {
            OTHER_MEMBER
        } else {
            PARENT_AUTHOR
        };
        ReplyContext {
            reply_count,
            parent_author_id: PARENT_AUTHOR,
            reply_author_ids: vec![replier],
            already_notified_first_reply: self.first_reply_notified,
        }
    }
}

/// 命令执行器
pub struct CommandRunner {
    settings: ServiceSettings,
}

impl CommandRunner {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }

    /// 执行 migrate 命令
    pub async fn run_migrate(&self) -> Result<()> {
        let db = Database::connect(&self.settings.app.database)
            .await
            .context("连接数据库失败")?;
        let latency = db.ping().await.context("数据库不可用")?;
        info!(latency_ms = latency.as_millis() as u64, "数据库连接正常");

        db.run_migrations(&MIGRATOR).await.context("迁移失败")?;
        db.close().await;

        info!("迁移完成");
        Ok(())
    }

    /// 执行 check 命令
    pub fn run_check(
        &self,
        site: MilestoneSite,
        count: i64,
        sent: &[String],
        reply: ReplyFlags,
    ) -> Result<()> {
        let report = check(&self.settings.notification, site, count, sent, reply);
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// 执行 history 命令
    pub async fn run_history(&self, owner: HistoryOwner, id: i64) -> Result<()> {
        let db = Database::connect(&self.settings.app.database)
            .await
            .context("连接数据库失败")?;
        let repo = HistoryRepository::new(db.pool().clone());

        let history = repo.find(owner, id).await?;
        db.close().await;

        match history {
            Some(history) => {
                println!("{}", serde_json::to_string_pretty(&history)?);
                Ok(())
            }
            None => bail!("资源不存在: {:?} {}", owner, id),
        }
    }
}

/// 计算判定结果和将要发送的消息
///
/// 回复调用点先应用首条回复规则，首条回复触发时不再检查回复数里程碑。
pub fn check(
    catalog: &MessageCatalog,
    site: MilestoneSite,
    count: i64,
    sent: &[String],
    reply: ReplyFlags,
) -> CheckReport {
    let history: NotificationHistory = sent.iter().map(|key| (key.clone(), true)).collect();

    let decision = match site {
        MilestoneSite::CommentReply => decide(&reply.context(count), &history),
        _ => {
            let evaluation = evaluate(count, site.prefix(), site.policy(), &history);
            if evaluation.fires {
                ReplyDecision::Milestone(evaluation)
            } else {
                ReplyDecision::Skip
            }
        }
    };

    match decision {
        ReplyDecision::FirstReply => CheckReport {
            site: site.name(),
            decision: "first_reply",
            evaluation: Evaluation {
                count,
                event_key: FIRST_REPLY_KEY.to_string(),
                fires: true,
            },
            messages: vec![catalog.first_reply.clone()],
        },
        ReplyDecision::Milestone(evaluation) => {
            let templates = catalog.templates(site);
            let mut messages = vec![templates.render_primary(count)];
            if let Some(message) = evaluation
                .badge()
                .and_then(|tier: BadgeTier| templates.badge(tier))
            {
                messages.push(message.to_string());
            }
            CheckReport {
                site: site.name(),
                decision: "milestone",
                evaluation,
                messages,
            }
        }
        ReplyDecision::Skip => CheckReport {
            site: site.name(),
            decision: "skip",
            evaluation: evaluate(count, site.prefix(), site.policy(), &history),
            messages: Vec::new(),
        },
    }
}
