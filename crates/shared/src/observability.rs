//! 日志初始化模块
//!
//! 基于 tracing / tracing-subscriber 的结构化日志，格式和级别由配置决定。
//! 所有服务通过单一入口点初始化，确保一致的日志输出。

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// 初始化全局日志订阅器
///
/// 级别优先取 `RUST_LOG` 环境变量，否则使用配置中的 log_level；
/// log_format 为 `json` 时输出结构化 JSON，否则输出人类可读格式。
/// 重复初始化（如测试中多次调用）返回错误，由调用方决定是否忽略。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = match config.log_format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to init tracing subscriber: {e}"))?;

    info!(
        log_level = %config.log_level,
        log_format = %config.log_format,
        "observability initialized"
    );

    Ok(())
}
