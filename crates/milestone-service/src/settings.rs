//! 服务配置
//!
//! 在共享的分层配置之上读取本服务的 `comments` 与 `notification` 段

use config::{Config, ConfigError};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use talk_shared::config::AppConfig;

use crate::notification::MessageCatalog;

/// 评论配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// 允许回复的最大深度；父评论深度达到该值时拒绝回复
    pub max_depth: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self { max_depth: 1 }
    }
}

/// 里程碑服务配置
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub app: AppConfig,
    pub comments: CommentsConfig,
    pub notification: MessageCatalog,
}

impl ServiceSettings {
    /// 从配置文件和环境变量加载
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let config = AppConfig::layered(service_name)?.build()?;
        Self::from_config(config)
    }

    /// 从已构建的配置源解析，缺失的段使用默认值
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let comments = section_or_default(&config, "comments")?;
        let notification = section_or_default(&config, "notification")?;

        let app = AppConfig::from_config(config)?;

        Ok(Self {
            app,
            comments,
            notification,
        })
    }
}

fn section_or_default<T>(config: &Config, key: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match config.get::<T>(key) {
        Ok(section) => Ok(section),
        Err(ConfigError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(e),
    }
}
