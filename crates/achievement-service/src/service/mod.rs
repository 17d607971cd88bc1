//! 服务层
//!
//! 实现成就业务逻辑，协调仓储层与用户锁。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `lifecycle_service`: 成就提交与审核（提交、通过、两阶段驳回）
//! - `roster_service`: 用户注册、演示数据、学习目标与徽章
//! - `query_service`: 排行榜与成长概览（只读操作）
//!
//! ## 写入模型
//!
//! 所有修改用户记录的操作都经过 `update_user`：持有用户锁期间读取记录、
//! 在副本上修改、整体写回。修改或写回失败时存储保持调用前的状态。

pub mod dto;
pub mod lifecycle_service;
pub mod query_service;
pub mod roster_service;

pub use dto::*;
pub use lifecycle_service::AchievementService;
pub use query_service::ProgressService;
pub use roster_service::RosterService;

use crate::error::{AchievementError, Result};
use crate::lock::LockManager;
use crate::models::User;
use crate::repository::UserRepositoryTrait;

/// 在用户锁内执行读-改-写
///
/// `mutate` 返回错误时不写回；写回失败时错误原样返回。
pub(crate) async fn update_user<R, T, F>(
    repo: &R,
    locks: &LockManager,
    user_id: &str,
    mutate: F,
) -> Result<(User, T)>
where
    R: UserRepositoryTrait + ?Sized,
    F: FnOnce(&mut User) -> Result<T>,
{
    let _guard = locks.acquire(&LockManager::user_key(user_id)).await?;

    let mut user = repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| AchievementError::UserNotFound(user_id.to_string()))?;

    let outcome = mutate(&mut user)?;
    repo.save_user(&user).await?;
    Ok((user, outcome))
}

/// 读取用户，不存在时返回 `UserNotFound`
pub(crate) async fn require_user<R>(repo: &R, user_id: &str) -> Result<User>
where
    R: UserRepositoryTrait + ?Sized,
{
    repo.get_user(user_id)
        .await?
        .ok_or_else(|| AchievementError::UserNotFound(user_id.to_string()))
}
