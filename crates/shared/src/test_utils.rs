//! 测试工具模块
//!
//! 提供可注入故障的存储实现，用于验证持久化失败时业务层不产生部分写入。

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::kv::KvStore;

/// 可注入故障的键值存储
///
/// 包装任意 `KvStore`，按计数或开关让 get/set 返回 `Unavailable` 错误。
pub struct FailingKvStore<S> {
    inner: S,
    failing_gets: AtomicU32,
    failing_sets: AtomicU32,
    sets_disabled: AtomicBool,
}

impl<S: KvStore> FailingKvStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_gets: AtomicU32::new(0),
            failing_sets: AtomicU32::new(0),
            sets_disabled: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// 接下来 n 次 get 失败
    pub fn fail_next_gets(&self, n: u32) {
        self.failing_gets.store(n, Ordering::SeqCst);
    }

    /// 接下来 n 次 set 失败
    pub fn fail_next_sets(&self, n: u32) {
        self.failing_sets.store(n, Ordering::SeqCst);
    }

    /// 开启或关闭“所有写入失败”
    pub fn set_writes_failing(&self, failing: bool) {
        self.sets_disabled.store(failing, Ordering::SeqCst);
    }

    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn injected(op: &str) -> StoreError {
        StoreError::Unavailable {
            backend: "failing".to_string(),
            message: format!("注入的 {} 故障", op),
        }
    }
}

#[async_trait]
impl<S: KvStore> KvStore for FailingKvStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if Self::take(&self.failing_gets) {
            return Err(Self::injected("get"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        if self.sets_disabled.load(Ordering::SeqCst) || Self::take(&self.failing_sets) {
            return Err(Self::injected("set"));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.sets_disabled.load(Ordering::SeqCst) {
            return Err(Self::injected("remove"));
        }
        self.inner.remove(key).await
    }
}
