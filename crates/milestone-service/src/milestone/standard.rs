//! 里程碑阈值
//!
//! 10、50、100 为一次性阈值；100 和 1000 同时作为超过自身后的重复模数。

use serde::{Deserialize, Serialize};

/// 里程碑阈值常量
pub struct MilestoneStandard;

impl MilestoneStandard {
    pub const FIRST: i64 = 10;
    pub const SECOND: i64 = 50;
    pub const THIRD: i64 = 100;
    pub const FOURTH: i64 = 1000;
}

/// 徽章等级（仅在恰好 100 或 1000 时获得）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeTier {
    Hundred,
    Thousand,
}

impl BadgeTier {
    /// 计数值对应的徽章，200、2000 等重复阈值不发徽章
    pub fn for_count(count: i64) -> Option<Self> {
        match count {
            MilestoneStandard::THIRD => Some(Self::Hundred),
            MilestoneStandard::FOURTH => Some(Self::Thousand),
            _ => None,
        }
    }
}

/// 判定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestonePolicy {
    /// 10、50、100·n、1000·n
    Standard,
    /// 仅 50 和 100（评论回复数）
    ReplyCount,
}

impl MilestonePolicy {
    pub fn is_milestone(&self, count: i64) -> bool {
        match self {
            Self::Standard => is_milestone(count),
            Self::ReplyCount => {
                count == MilestoneStandard::SECOND || count == MilestoneStandard::THIRD
            }
        }
    }
}

/// 计数值是否命中标准里程碑
///
/// 大于 1000 的 1000 整数倍同时满足两个模数分支，结果仍只是一次命中。
pub fn is_milestone(count: i64) -> bool {
    count == MilestoneStandard::FIRST
        || count == MilestoneStandard::SECOND
        || count == MilestoneStandard::THIRD
        || (count > MilestoneStandard::THIRD && count % MilestoneStandard::THIRD == 0)
        || (count > MilestoneStandard::FOURTH && count % MilestoneStandard::FOURTH == 0)
}
