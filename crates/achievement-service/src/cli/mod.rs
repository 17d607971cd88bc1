//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `seed` / `register` - 初始化演示数据、注册学生
//! - `submit` - 提交成就并上传证书
//! - `approve` / `reject` / `pending` - 管理员审核
//! - `level` / `categories` / `progress` / `leaderboard` - 积分与等级查询
//! - `goal` / `badge` - 学习目标与徽章
//!
//! # 使用示例
//!
//! ```bash
//! skillera seed
//! skillera submit -u stu_123 -d "National Robotics Competition" -c national --won --certificate cert.png
//! skillera reject -u stu_123 -a a3 --prompt
//! skillera leaderboard -n 10
//! ```

pub mod commands;
pub mod runner;

pub use commands::{BadgeCommand, Cli, Commands, GoalCommand};
pub use runner::CommandRunner;
