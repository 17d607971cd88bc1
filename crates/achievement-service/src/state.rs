//! 应用状态定义
//!
//! 按配置组装存储、锁与各服务，供 CLI 与集成测试共用

use std::sync::Arc;

use skillera_shared::blob::{BlobStore, FileBlobStore, MemoryBlobStore};
use skillera_shared::config::{AppConfig, StorageBackend};
use skillera_shared::kv::{FileKvStore, KvStore, MemoryKvStore, RetryingKvStore};
use tracing::info;

use crate::error::Result;
use crate::lock::{LockConfig, LockManager};
use crate::points::CategoryPointTable;
use crate::repository::UserRepository;
use crate::service::{AchievementService, ProgressService, RosterService};

/// 文件后端的锁文件子目录
const LOCK_DIR_NAME: &str = ".locks";

/// 应用共享状态
///
/// 三个服务共享同一个仓储与锁管理器，保证同一用户的写操作串行；
/// 文件后端下跨进程的串行由锁文件保证
#[derive(Clone)]
pub struct AppState {
    pub achievements: Arc<AchievementService>,
    pub roster: Arc<RosterService>,
    pub progress: Arc<ProgressService>,
}

impl AppState {
    /// 由已构建的存储组装服务
    pub fn new(
        store: Arc<dyn KvStore>,
        blob_store: Arc<dyn BlobStore>,
        lock_config: LockConfig,
        point_table: CategoryPointTable,
    ) -> Self {
        let repo = Arc::new(UserRepository::new(store));
        let locks = Arc::new(LockManager::new(lock_config));

        Self {
            achievements: Arc::new(AchievementService::new(
                repo.clone(),
                locks.clone(),
                point_table,
                blob_store,
            )),
            roster: Arc::new(RosterService::new(repo.clone(), locks)),
            progress: Arc::new(ProgressService::new(repo)),
        }
    }

    /// 内存存储与默认配置，测试使用
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(MemoryBlobStore::new()),
            LockConfig::default(),
            CategoryPointTable::default(),
        )
    }

    /// 按应用配置构建
    ///
    /// 键值存储外层包裹重试装饰器，重试只发生在持久化层。
    /// 文件后端额外在 `{data_dir}/.locks` 下使用锁文件，
    /// 多个命令行进程同时操作同一用户时按顺序执行。
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let point_table = CategoryPointTable::from_config(&config.points)?;
        let policy = config.retry.policy();

        let (store, blob_store): (Arc<dyn KvStore>, Arc<dyn BlobStore>) =
            match config.storage.backend {
                StorageBackend::Memory => (
                    Arc::new(RetryingKvStore::new(MemoryKvStore::new(), policy)),
                    Arc::new(MemoryBlobStore::new()),
                ),
                StorageBackend::File => (
                    Arc::new(RetryingKvStore::new(
                        FileKvStore::open(&config.storage.data_dir).await?,
                        policy,
                    )),
                    Arc::new(FileBlobStore::open(&config.storage.blob_dir).await?),
                ),
            };

        let mut lock_config = LockConfig::from(&config.lock);
        if config.storage.backend == StorageBackend::File {
            lock_config = lock_config.with_lock_dir(config.storage.data_dir.join(LOCK_DIR_NAME));
        }

        info!(
            backend = ?config.storage.backend,
            data_dir = %config.storage.data_dir.display(),
            cross_process_locks = lock_config.lock_dir.is_some(),
            "Storage initialized"
        );

        Ok(Self::new(store, blob_store, lock_config, point_table))
    }
}
