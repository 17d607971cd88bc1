//! 用户仓储
//!
//! 存储布局：
//! - `skillera_users`: 按注册顺序排列的用户 ID 列表
//! - `skillera_user:{id}`: 单个用户记录

use std::sync::Arc;

use async_trait::async_trait;
use skillera_shared::kv::{KvStore, get_json, set_json};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use super::traits::UserRepositoryTrait;
use crate::error::{AchievementError, Result};
use crate::models::User;

/// 用户索引键
pub const USER_INDEX_KEY: &str = "skillera_users";

/// 用户记录键
pub fn user_record_key(user_id: &str) -> String {
    format!("skillera_user:{}", user_id)
}

/// 基于键值存储的用户仓储
pub struct UserRepository {
    store: Arc<dyn KvStore>,
    /// 串行化同一仓储实例内的索引修改；跨进程由调用方持有的注册锁保证
    index_lock: Mutex<()>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            index_lock: Mutex::new(()),
        }
    }

    async fn load_index(&self) -> Result<Vec<String>> {
        Ok(get_json::<Vec<String>>(self.store.as_ref(), USER_INDEX_KEY)
            .await?
            .unwrap_or_default())
    }

    fn ensure_consistent(user: &User) -> Result<()> {
        if user.is_points_consistent() {
            return Ok(());
        }
        Err(AchievementError::PointsLedgerMismatch {
            user_id: user.id.clone(),
            recorded: user.points,
            expected: user.approved_points_total(),
        })
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let user: Option<User> = get_json(self.store.as_ref(), &user_record_key(user_id)).await?;
        if let Some(ref u) = user {
            Self::ensure_consistent(u)?;
        }
        Ok(user)
    }

    async fn user_ids(&self) -> Result<Vec<String>> {
        self.load_index().await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let ids = self.load_index().await?;
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_user(&id).await {
                Ok(Some(user)) => users.push(user),
                Ok(None) => warn!(user_id = %id, "用户索引中的记录不存在，已跳过"),
                Err(AchievementError::PointsLedgerMismatch {
                    recorded, expected, ..
                }) => warn!(
                    user_id = %id,
                    recorded,
                    expected,
                    "用户积分账目不一致，已从列表中跳过"
                ),
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &User) -> Result<()> {
        Self::ensure_consistent(user)?;
        let _index_guard = self.index_lock.lock().await;

        let mut ids = self.load_index().await?;
        if ids.iter().any(|id| id == &user.id) {
            return Err(AchievementError::AlreadyExists {
                field: "id".to_string(),
                value: user.id.clone(),
            });
        }

        let key = user_record_key(&user.id);
        set_json(self.store.as_ref(), &key, user).await?;

        ids.push(user.id.clone());
        if let Err(e) = set_json(self.store.as_ref(), USER_INDEX_KEY, &ids).await {
            // 索引写入失败时撤回用户记录，避免孤立数据
            if let Err(cleanup) = self.store.remove(&key).await {
                warn!(user_id = %user.id, error = %cleanup, "撤回用户记录失败");
            }
            return Err(e.into());
        }
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id, points = user.points))]
    async fn save_user(&self, user: &User) -> Result<()> {
        Self::ensure_consistent(user)?;
        set_json(self.store.as_ref(), &user_record_key(&user.id), user).await?;
        Ok(())
    }
}
