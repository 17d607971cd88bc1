//! Skillera 成就服务
//!
//! 学生提交校内外获奖记录，管理员审核后计入积分，积分再推导出等级。
//!
//! ## 核心功能
//!
//! - **成就提交**：按分类与是否获胜计算积分，提交时冻结
//! - **审核流转**：pending -> approved / rejected，驳回支持两阶段（草稿、提交或放弃）
//! - **积分账目**：用户积分始终等于已通过成就积分之和，读写时校验
//! - **等级计算**：由积分推导等级与等级内进度的纯函数
//! - **名册维护**：学生注册、学习目标、徽章授予、排行榜
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `leveling`: 等级计算引擎
//! - `points`: 分类积分表
//! - `repository`: 键值存储仓储层
//! - `service`: 业务服务层
//! - `lock`: 用户锁模块
//! - `seed`: 演示数据
//! - `state`: 应用状态组装
//! - `cli`: 命令行接口

pub mod cli;
pub mod error;
pub mod leveling;
pub mod lock;
pub mod models;
pub mod points;
pub mod repository;
pub mod seed;
pub mod service;
pub mod state;

pub use error::{AchievementError, Result};
pub use leveling::{LevelInfo, compute_level_info};
pub use lock::{LockConfig, LockGuard, LockManager};
pub use models::*;
pub use points::CategoryPointTable;
pub use repository::{UserRepository, UserRepositoryTrait};
pub use service::{AchievementService, ProgressService, RosterService, dto};
pub use state::AppState;
