//! 通知模板
//!
//! 每个调用点一组模板：主消息带 `{{count}}` 变量，徽章消息为固定文本。
//! 模板可以通过配置的 `notification` 段覆盖。
//!
//! ```toml
//! [notification.game_bookmark]
//! primary = "{{count}}개의 북마크를 달성했습니다"
//! badge_100 = "..."
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::milestone::BadgeTier;
use crate::models::MilestoneSite;

// 匹配 {{variable_name}} 格式，变量名支持字母、数字、下划线
static VARIABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("variable pattern is a valid regex"));

/// 模板引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    /// 渲染模板
    ///
    /// 未找到的变量保留原样并记录警告日志。
    pub fn render(template: &str, variables: &HashMap<&str, String>) -> String {
        VARIABLE_REGEX
            .replace_all(template, |caps: &regex::Captures| {
                let var_name = &caps[1];
                match variables.get(var_name) {
                    Some(value) => value.clone(),
                    None => {
                        warn!(variable = var_name, "模板变量未找到，保留原样");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// 以计数值渲染
    pub fn render_count(template: &str, count: i64) -> String {
        let variables = HashMap::from([("count", count.to_string())]);
        Self::render(template, &variables)
    }

    /// 提取模板中的所有变量名
    pub fn extract_variables(template: &str) -> Vec<String> {
        VARIABLE_REGEX
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

/// 单个调用点的模板
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteTemplates {
    pub primary: String,
    #[serde(default)]
    pub badge_100: Option<String>,
    #[serde(default)]
    pub badge_1000: Option<String>,
}

impl SiteTemplates {
    fn new(primary: &str, badge_100: Option<&str>, badge_1000: Option<&str>) -> Self {
        Self {
            primary: primary.to_string(),
            badge_100: badge_100.map(str::to_string),
            badge_1000: badge_1000.map(str::to_string),
        }
    }

    pub fn render_primary(&self, count: i64) -> String {
        TemplateEngine::render_count(&self.primary, count)
    }

    pub fn badge(&self, tier: BadgeTier) -> Option<&str> {
        match tier {
            BadgeTier::Hundred => self.badge_100.as_deref(),
            BadgeTier::Thousand => self.badge_1000.as_deref(),
        }
    }
}

/// 全部调用点的消息目录
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub game_bookmark: SiteTemplates,
    pub talk_pick_bookmark: SiteTemplates,
    pub talk_pick_comment: SiteTemplates,
    pub comment_reply: SiteTemplates,
    pub comment_like: SiteTemplates,
    pub first_reply: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            game_bookmark: SiteTemplates::new(
                "{{count}}개의 북마크를 달성했습니다",
                Some("북마크 100개 달성! 밸런스게임 배찌를 획득했습니다"),
                Some("북마크 1000개 달성! 밸런스게임 배찌를 획득했습니다"),
            ),
            talk_pick_bookmark: SiteTemplates::new(
                "{{count}}개의 북마크를 달성했습니다",
                Some("북마크 100개 달성! 톡픽 배찌를 획득했습니다"),
                Some("북마크 1000개 달성! 톡픽 배찌를 획득했습니다"),
            ),
            talk_pick_comment: SiteTemplates::new(
                "{{count}}개의 댓글을 달성했습니다",
                Some("댓글 100개 달성! 톡픽 배찌를 획득했습니다"),
                Some("댓글 1000개 달성! 톡픽 배찌를 획득했습니다"),
            ),
            comment_reply: SiteTemplates::new("내 댓글에 답글이 {{count}}개 달렸습니다", None, None),
            comment_like: SiteTemplates::new(
                "{{count}}개의 좋아요를 달성했습니다",
                Some("좋아요 100개 달성! 댓글 배찌를 획득했습니다"),
                Some("좋아요 1000개 달성! 댓글 배찌를 획득했습니다"),
            ),
            first_reply: "내 댓글에 첫 답글이 달렸습니다".to_string(),
        }
    }
}

impl MessageCatalog {
    pub fn templates(&self, site: MilestoneSite) -> &SiteTemplates {
        match site {
            MilestoneSite::GameBookmark => &self.game_bookmark,
            MilestoneSite::TalkPickBookmark => &self.talk_pick_bookmark,
            MilestoneSite::TalkPickComment => &self.talk_pick_comment,
            MilestoneSite::CommentReply => &self.comment_reply,
            MilestoneSite::CommentLike => &self.comment_like,
        }
    }
}
