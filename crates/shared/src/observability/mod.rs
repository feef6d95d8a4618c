//! 可观测性
//!
//! 日志与 Prometheus 指标的统一初始化入口。
//!
//! ```ignore
//! use talk_shared::observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::default().with_service_name("milestone-service");
//! let _guard = init(&config).await?;
//! ```

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 本地开发用的彩色文本
    #[default]
    Pretty,
    /// 生产环境采集用的 JSON 行
    Json,
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志和指标中的服务名
    pub service_name: String,
    /// 日志级别或 EnvFilter 指令，如 `info,sqlx=warn`
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// 命令行参数优先于配置文件
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }
}

/// 可观测性资源守卫
///
/// drop 时停止指标导出任务。
pub struct ObservabilityGuard {
    exporter: Option<metrics::MetricsExporter>,
}

impl ObservabilityGuard {
    /// 不持有任何资源的守卫
    pub fn disabled() -> Self {
        Self { exporter: None }
    }

    pub fn metrics_enabled(&self) -> bool {
        self.exporter.is_some()
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if let Some(exporter) = self.exporter.take() {
            exporter.shutdown();
            info!("Metrics exporter stopped");
        }
    }
}

/// 初始化日志，按配置启动指标导出
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let exporter = if config.metrics_enabled {
        Some(metrics::init(config).await?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        log_format = ?config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { exporter })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.metrics_port, 9090);
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = ObservabilityConfig::default()
            .with_service_name("milestone-service")
            .with_log_level("debug,sqlx=warn");
        assert_eq!(config.service_name, "milestone-service");
        assert_eq!(config.log_level, "debug,sqlx=warn");
    }

    #[test]
    fn test_log_format_from_config() {
        let config: ObservabilityConfig = config::Config::builder()
            .set_override("log_format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_disabled_guard() {
        assert!(!ObservabilityGuard::disabled().metrics_enabled());
    }
}
