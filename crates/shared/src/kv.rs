//! 键值存储模块
//!
//! 业务层把持久化视为不透明的键值存储（get/set/remove），值为 JSON 文本。
//!
//! - `MemoryKvStore`: DashMap 实现，适用于测试和临时运行
//! - `FileKvStore`: 每个键一个文件，先写临时文件再原子重命名
//! - `RetryingKvStore`: 为任意实现附加有上限的退避重试

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::observability::metrics;
use crate::retry::{RetryPolicy, retry_with_policy};

/// 键值存储接口
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// 写入（覆盖）键对应的值
    async fn set(&self, key: &str, value: String) -> Result<()>;
    /// 删除键，键不存在时视为成功
    async fn remove(&self, key: &str) -> Result<()>;
}

/// 读取并反序列化 JSON 值
pub async fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// 序列化为 JSON 后写入
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}

// ==================== 内存实现 ====================

/// 内存键值存储
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    data: Arc<DashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前键数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

// ==================== 文件实现 ====================

/// 文件键值存储
///
/// 每个键对应目录下的一个 `.json` 文件。写入先落到临时文件再重命名，
/// 写入失败时旧值保持不变。
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// 打开（必要时创建）存储目录
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "文件存储已打开");
        Ok(Self { root })
    }

    /// 键到文件路径的映射
    ///
    /// 只允许字母数字和 `_-.:`，冒号在文件名中替换为 `@`
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key.replace(':', "@"))))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&tmp, value.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ==================== 重试装饰器 ====================

/// 带重试的键值存储
///
/// 瞬时故障按 `RetryPolicy` 退避重试，其余错误直接返回。
pub struct RetryingKvStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: KvStore> RetryingKvStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: KvStore> KvStore for RetryingKvStore<S> {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = retry_with_policy(&self.policy, "kv.get", StoreError::is_retryable, || {
            self.inner.get(key)
        })
        .await;
        metrics::record_store_operation("get", result.is_ok());
        result
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<()> {
        let result = retry_with_policy(&self.policy, "kv.set", StoreError::is_retryable, || {
            self.inner.set(key, value.clone())
        })
        .await;
        metrics::record_store_operation("set", result.is_ok());
        result
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        let result = retry_with_policy(&self.policy, "kv.remove", StoreError::is_retryable, || {
            self.inner.remove(key)
        })
        .await;
        metrics::record_store_operation("remove", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FailingKvStore;
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        id: String,
        points: u64,
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryKvStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v1".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        // 删除不存在的键不报错
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = MemoryKvStore::new();
        let record = Record {
            id: "stu_1".to_string(),
            points: 35,
        };
        set_json(&store, "skillera_user:stu_1", &record).await.unwrap();

        let loaded: Option<Record> = get_json(&store, "skillera_user:stu_1").await.unwrap();
        assert_eq!(loaded, Some(record));

        store.set("broken", "{not json".to_string()).await.unwrap();
        let err = get_json::<Record>(&store, "broken").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::open(dir.path()).await.unwrap();
        store
            .set("skillera_user:stu_1", "{\"a\":1}".to_string())
            .await
            .unwrap();

        let reopened = FileKvStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("skillera_user:stu_1").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        reopened.remove("skillera_user:stu_1").await.unwrap();
        assert!(store.get("skillera_user:stu_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::open(dir.path()).await.unwrap();

        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            let err = store.set(key, "x".to_string()).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn test_retrying_store_recovers_from_transient_failures() {
        let flaky = FailingKvStore::new(MemoryKvStore::new());
        flaky.fail_next_sets(2);

        let policy = RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        };
        let store = RetryingKvStore::new(flaky, policy);

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_retrying_store_gives_up_after_policy() {
        let flaky = FailingKvStore::new(MemoryKvStore::new());
        flaky.fail_next_sets(10);

        let store = RetryingKvStore::new(flaky, RetryPolicy::none());
        let err = store.set("k", "v".to_string()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(store.inner().inner().get("k").await.unwrap().is_none());
    }
}
