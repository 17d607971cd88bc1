//! 日志与业务指标
//!
//! 命令行入口在解析完配置后调用一次 [`init`]，之后各模块直接使用
//! `tracing` 宏与 [`metrics`] 中的计数器。

pub mod metrics;
pub mod tracing;

use ::tracing::{debug, info};
use anyhow::Result;

pub use crate::config::ObservabilityConfig;

/// 进程存活期间持有，drop 时输出一条收尾日志
pub struct ObservabilityGuard {
    tracing: tracing::TracingGuard,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        debug!(service = %self.tracing.service_name(), "命令结束，关闭日志");
    }
}

/// 安装日志订阅器并登记指标说明
///
/// 同一进程内只能成功调用一次。
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    let guard = tracing::init(config)?;
    metrics::describe();

    info!(
        service = %config.service_name,
        format = %config.log_format,
        level = %config.log_level,
        "日志已启用"
    );

    Ok(ObservabilityGuard { tracing: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_is_default_format() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs());
    }

    #[test]
    fn test_json_format_is_case_insensitive() {
        let config = ObservabilityConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(config.json_logs());
        assert_eq!(config.with_service_name("skillera-cli").service_name, "skillera-cli");
    }
}
