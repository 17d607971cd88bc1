//! Skillera 命令行入口
//!
//! 加载配置、初始化日志，按配置组装存储后执行子命令，结果以 JSON 输出到 stdout。

use anyhow::{Context, Result};
use clap::Parser;
use skillera_shared::{config::AppConfig, observability};
use tracing::{debug, warn};

use achievement_service::AppState;
use achievement_service::cli::{Cli, CommandRunner};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 1. 加载配置：config/default.toml -> config/{env}.toml -> config/skillera.toml -> 环境变量
    let config = AppConfig::load("skillera").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: "skillera".to_string(),
            ..AppConfig::default()
        }
    });

    // 2. 初始化日志，命令行级别优先；生产环境固定输出 JSON
    let mut obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    if let Some(level) = cli.log_level.clone() {
        obs_config.log_level = level;
    }
    if config.is_production() {
        obs_config.log_format = "json".to_string();
    }
    let _guard = observability::init(&obs_config)?;
    debug!(environment = %config.environment, "Configuration loaded");

    // 3. 组装存储与服务
    let state = AppState::from_config(&config)
        .await
        .context("初始化存储失败")?;
    let runner = CommandRunner::new(state);

    // 4. 执行命令
    let stdin = std::io::stdin();
    match runner.run(cli.command, stdin.lock()).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            if let Some(err) = e.downcast_ref::<achievement_service::AchievementError>() {
                warn!(code = err.error_code(), retryable = err.is_retryable(), "命令执行失败");
                let body = serde_json::json!({
                    "error": err.error_code(),
                    "message": err.to_string(),
                    "retryable": err.is_retryable(),
                });
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
