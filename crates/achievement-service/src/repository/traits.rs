//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，便于 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::User;

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 按 ID 读取用户
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
    /// 按注册顺序列出用户 ID，不读取记录
    async fn user_ids(&self) -> Result<Vec<String>>;
    /// 按注册顺序列出全部可用用户，积分账目不一致的记录被跳过
    async fn list_users(&self) -> Result<Vec<User>>;
    /// 新建用户并追加到用户索引末尾
    async fn create_user(&self, user: &User) -> Result<()>;
    /// 覆盖写入已存在的用户
    async fn save_user(&self, user: &User) -> Result<()>;
}
