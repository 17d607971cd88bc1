//! Skillera 运行配置
//!
//! 存储位置、分类积分、锁等待与重试参数都从这里读取。
//! 文件缺失时一律退回内置默认值，命令行在任何目录下都能直接运行。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// 存储后端类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储，进程退出即丢失
    Memory,
    /// 本地目录，每个键一个 JSON 文件
    #[default]
    File,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// 用户记录目录
    pub data_dir: PathBuf,
    /// 证书文件目录
    pub blob_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from(".skillera/data"),
            blob_dir: PathBuf::from(".skillera/blobs"),
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 服务名称，写入每条日志
    pub service_name: String,
    pub log_level: String,
    /// `json` 或 `pretty`
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "skillera".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 成就分类基础积分配置
///
/// 按荣誉等级从低到高排列，构建积分表时校验严格递增
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub inter_house: u32,
    pub district: u32,
    pub state: u32,
    pub national: u32,
    pub international: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            inter_house: 10,
            district: 20,
            state: 40,
            national: 80,
            international: 120,
        }
    }
}

/// 锁配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// 等待用户锁的最长时间
    pub acquire_timeout_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 5_000,
        }
    }
}

impl LockSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

/// 存储重试配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 50,
            max_delay_ms: 1_000,
            multiplier: 2.0,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
    pub points: PointsConfig,
    pub lock: LockSettings,
    pub retry: RetrySettings,
}

impl AppConfig {
    /// 读取 `CONFIG_DIR`（缺省 `config`）下的配置，`SKILLERA_ENV` 决定环境名
    ///
    /// 覆盖次序：default.toml < {env}.toml < {service}.toml < 环境变量。
    /// 环境变量以 `SKILLERA_` 开头，层级用双下划线，
    /// 例如 `SKILLERA_POINTS__NATIONAL=90` 对应 `points.national`。
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("SKILLERA_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("SKILLERA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.points.national, 80);
        assert_eq!(config.lock.acquire_timeout(), Duration::from_secs(5));
        assert!(!config.is_production());
    }

    #[test]
    fn test_retry_settings_to_policy() {
        let policy = RetrySettings::default().policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut default = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            default,
            r#"
[storage]
backend = "memory"

[points]
international = 150
"#
        )
        .unwrap();

        let mut service = std::fs::File::create(dir.path().join("skillera.toml")).unwrap();
        writeln!(
            service,
            r#"
[observability]
log_format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from("skillera", "test", dir.path()).unwrap();
        assert_eq!(config.service_name, "skillera");
        assert_eq!(config.environment, "test");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.points.international, 150);
        // 未覆盖的字段保持默认值
        assert_eq!(config.points.inter_house, 10);
        assert!(config.observability.json_logs());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from("skillera", "development", dir.path()).unwrap();
        assert_eq!(config.points.district, 20);
        assert_eq!(config.retry.max_retries, 3);
    }
}
