//! CLI 命令定义
//!
//! 运维用的管理命令：应用迁移、检查某个计数值的里程碑判定、查看资源的通知历史。

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::MilestoneSite;
use crate::repository::HistoryOwner;

/// 里程碑服务管理工具
#[derive(Parser, Debug)]
#[command(name = "milestone-admin")]
#[command(version, about = "里程碑通知管理工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 应用数据库迁移
    Migrate,

    /// 检查计数值的里程碑判定（不访问数据库）
    Check {
        /// 变更后的计数值
        count: i64,

        /// 调用点
        #[arg(short, long, value_enum, default_value = "game-bookmark")]
        site: SiteArg,

        /// 视为已发送的事件键，可重复
        #[arg(long = "sent")]
        sent: Vec<String>,

        /// 回复中包含父评论作者以外的会员（仅 comment-reply，用于首条回复判定）
        #[arg(long)]
        other_author: bool,

        /// 父评论已发送过首条回复通知（仅 comment-reply）
        #[arg(long)]
        first_reply_notified: bool,
    },

    /// 查看父资源的通知历史
    History {
        /// 父资源类型
        #[arg(value_enum)]
        kind: OwnerArg,

        /// 父资源 ID
        id: i64,
    },
}

/// 调用点参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SiteArg {
    GameBookmark,
    TalkPickBookmark,
    TalkPickComment,
    CommentReply,
    CommentLike,
}

impl From<SiteArg> for MilestoneSite {
    fn from(arg: SiteArg) -> Self {
        match arg {
            SiteArg::GameBookmark => Self::GameBookmark,
            SiteArg::TalkPickBookmark => Self::TalkPickBookmark,
            SiteArg::TalkPickComment => Self::TalkPickComment,
            SiteArg::CommentReply => Self::CommentReply,
            SiteArg::CommentLike => Self::CommentLike,
        }
    }
}

/// 父资源类型参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OwnerArg {
    GameSet,
    TalkPick,
    Comment,
}

impl From<OwnerArg> for HistoryOwner {
    fn from(arg: OwnerArg) -> Self {
        match arg {
            OwnerArg::GameSet => Self::GameSet,
            OwnerArg::TalkPick => Self::TalkPick,
            OwnerArg::Comment => Self::Comment,
        }
    }
}
