//! Prometheus 指标
//!
//! 里程碑通知的计数器，以及独立端口上的 `/metrics` 导出。
//! 标签值都是有限集合（调用点、通知种类、徽章阈值）。

use std::net::SocketAddr;
use std::sync::OnceLock;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::ObservabilityConfig;

pub const NOTIFICATIONS_TOTAL: &str = "milestone_notifications_total";
pub const BADGES_TOTAL: &str = "milestone_badges_total";
pub const SUPPRESSED_TOTAL: &str = "milestone_suppressed_total";
pub const DISPATCH_FAILURES_TOTAL: &str = "milestone_dispatch_failures_total";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 指标导出任务
pub struct MetricsExporter {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MetricsExporter {
    /// 实际监听地址；`metrics_port = 0` 时由系统分配端口
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// 安装全局 recorder 并在 `metrics_port` 上启动导出服务
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsExporter> {
    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    describe_metrics();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Metrics exporter listening");

    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Metrics exporter failed");
        }
    });

    Ok(MetricsExporter { addr, task })
}

fn describe_metrics() {
    metrics::describe_counter!(NOTIFICATIONS_TOTAL, "Milestone and first-reply notifications dispatched");
    metrics::describe_counter!(BADGES_TOTAL, "Badge notifications dispatched at exactly 100 or 1000");
    metrics::describe_counter!(SUPPRESSED_TOTAL, "Milestones reached again but already in notification history");
    metrics::describe_counter!(DISPATCH_FAILURES_TOTAL, "Notification dispatch failures that rolled back a mutation");
}

/// 当前指标快照，未初始化时为 `None`
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}

/// 记录一次通知；`kind` 为 `milestone` 或 `first_reply`
pub fn record_milestone_notification(site: &'static str, kind: &'static str) {
    metrics::counter!(NOTIFICATIONS_TOTAL, "site" => site, "kind" => kind).increment(1);
}

pub fn record_milestone_badge(site: &'static str, threshold: i64) {
    metrics::counter!(BADGES_TOTAL, "site" => site, "threshold" => threshold.to_string())
        .increment(1);
}

pub fn record_milestone_suppressed(site: &'static str) {
    metrics::counter!(SUPPRESSED_TOTAL, "site" => site).increment(1);
}

pub fn record_dispatch_failure(site: &'static str) {
    metrics::counter!(DISPATCH_FAILURES_TOTAL, "site" => site).increment(1);
}
