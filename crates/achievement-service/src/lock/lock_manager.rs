//! 用户锁管理器

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use fs2::FileExt;
use skillera_shared::config::LockSettings;
use skillera_shared::error::StoreError;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument, warn};

use crate::error::{AchievementError, Result};

/// 锁文件被其他进程持有时的重试间隔
const FILE_LOCK_POLL: Duration = Duration::from_millis(5);

/// 锁配置
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// 等待锁的最长时间（进程内等待与锁文件等待合计）
    pub acquire_timeout: Duration,
    /// 锁文件目录。设置后共享该目录的多个进程之间也互斥；为空时只在进程内互斥
    pub lock_dir: Option<PathBuf>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(5),
            lock_dir: None,
        }
    }
}

impl From<&LockSettings> for LockConfig {
    fn from(settings: &LockSettings) -> Self {
        Self {
            acquire_timeout: settings.acquire_timeout(),
            lock_dir: None,
        }
    }
}

impl LockConfig {
    /// 启用跨进程锁文件
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(dir.into());
        self
    }
}

/// 锁管理器
///
/// 按键维护互斥锁，键首次使用时创建。配置了 `lock_dir` 时，
/// 拿到进程内锁后再对 `{lock_dir}/{key}.lock` 加排他文件锁，
/// 同一数据目录上的并发命令行进程因此也按用户串行。
#[derive(Debug, Default)]
pub struct LockManager {
    locks: DashMap<String, Arc<Mutex<()>>>,
    config: LockConfig,
}

impl LockManager {
    pub fn new(config: LockConfig) -> Self {
        Self {
            locks: DashMap::new(),
            config,
        }
    }

    /// 用户锁的键
    pub fn user_key(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 获取锁
    ///
    /// 在 `acquire_timeout` 内无法获取时返回 `LockTimeout`
    #[instrument(skip(self))]
    pub async fn acquire(&self, key: &str) -> Result<LockGuard> {
        let deadline = tokio::time::Instant::now() + self.config.acquire_timeout;

        let guard = tokio::time::timeout_at(deadline, self.slot(key).lock_owned())
            .await
            .map_err(|_| self.timed_out(key))?;

        let file = match &self.config.lock_dir {
            Some(dir) => Some(self.lock_file(dir, key, deadline).await?),
            None => None,
        };

        debug!(key = %key, cross_process = file.is_some(), "lock acquired");
        Ok(LockGuard::new(key.to_string(), guard, file))
    }

    /// 尝试获取锁，不等待
    pub fn try_acquire(&self, key: &str) -> Option<LockGuard> {
        let guard = self.slot(key).try_lock_owned().ok()?;
        let file = match &self.config.lock_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).ok()?;
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(dir.join(lock_file_name(key)))
                    .ok()?;
                FileExt::try_lock_exclusive(&file).ok()?;
                Some(file)
            }
            None => None,
        };
        Some(LockGuard::new(key.to_string(), guard, file))
    }

    /// 对锁文件加排他锁，被占用时轮询直到截止时间
    async fn lock_file(
        &self,
        dir: &Path,
        key: &str,
        deadline: tokio::time::Instant,
    ) -> Result<File> {
        tokio::fs::create_dir_all(dir).await.map_err(StoreError::from)?;
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(lock_file_name(key)))
            .await
            .map_err(StoreError::from)?
            .into_std()
            .await;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(file),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {}
                Err(e) => return Err(StoreError::from(e).into()),
            }
            if tokio::time::Instant::now() + FILE_LOCK_POLL > deadline {
                return Err(self.timed_out(key));
            }
            tokio::time::sleep(FILE_LOCK_POLL).await;
        }
    }

    fn timed_out(&self, key: &str) -> AchievementError {
        warn!(
            key = %key,
            timeout_ms = self.config.acquire_timeout.as_millis() as u64,
            "lock acquisition timed out"
        );
        AchievementError::LockTimeout {
            key: key.to_string(),
        }
    }
}

/// 锁键到文件名的映射
///
/// 字母数字、`-`、`_` 原样保留，其余字符替换为 `_`。不同键映射到同一文件时只会多串行，不会漏锁。
fn lock_file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.lock")
}

/// 锁守卫
///
/// drop 时先关闭锁文件（释放文件锁），再释放进程内锁
#[derive(Debug)]
pub struct LockGuard {
    key: String,
    acquired_at: Instant,
    _file: Option<File>,
    _guard: OwnedMutexGuard<()>,
}

impl LockGuard {
    fn new(key: String, guard: OwnedMutexGuard<()>, file: Option<File>) -> Self {
        Self {
            key,
            acquired_at: Instant::now(),
            _file: file,
            _guard: guard,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 显式释放锁
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        debug!(
            key = %self.key,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "lock released"
        );
    }
}
