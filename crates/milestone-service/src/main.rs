//! 里程碑服务管理工具
//!
//! 应用迁移、检查里程碑判定、查看通知历史。

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use milestone_service::cli::{Cli, CommandRunner, Commands, ReplyFlags};
use milestone_service::settings::ServiceSettings;
use talk_shared::observability;

const SERVICE_NAME: &str = "milestone-service";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. 加载配置，失败时退回默认值
    let settings = match ServiceSettings::load(SERVICE_NAME) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {}", e);
            ServiceSettings::default()
        }
    };

    // 2. 初始化日志与指标导出，命令行日志级别优先于配置
    let mut obs_config = settings
        .app
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    if let Some(level) = &cli.log_level {
        obs_config = obs_config.with_log_level(level);
    }
    let _guard = observability::init(&obs_config).await?;

    info!(environment = %settings.app.environment, "Configuration loaded");
    if settings.comments.max_depth == 0 {
        warn!("comments.max_depth 为 0，所有回复都会被拒绝");
    }

    let runner = CommandRunner::new(settings);

    match cli.command {
        Commands::Migrate => runner.run_migrate().await?,
        Commands::Check {
            count,
            site,
            sent,
            other_author,
            first_reply_notified,
        } => {
            let reply = ReplyFlags {
                other_author,
                first_reply_notified,
            };
            runner.run_check(site.into(), count, &sent, reply)?
        }
        Commands::History { kind, id } => runner.run_history(kind.into(), id).await?,
    }

    Ok(())
}
