//! 存储层退避重试
//!
//! 学生记录的读写偶尔会碰到文件锁竞争或后端暂不可用。这里只对
//! `is_retryable` 判定为瞬时的故障做有限次数的指数退避；
//! 校验类错误（键非法、数据损坏）第一次就原样返回。
//! 业务层从不自行重试，重试只发生在 `RetryingKvStore` 内部。

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::StoreError;

/// 退避参数
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次执行之外允许的额外尝试次数
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// 单次等待的上限
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 失败即返回
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// 第 `retry` 次重试（从 0 计）前的等待时间，封顶 `max_delay`
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        let scaled = self.initial_delay.as_nanos() as f64 * factor;
        if !scaled.is_finite() || scaled >= self.max_delay.as_nanos() as f64 {
            self.max_delay
        } else {
            Duration::from_nanos(scaled as u64)
        }
    }

    /// 已经重试 `retries` 次后是否还能再试
    pub fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }
}

/// 按 `policy` 执行 `operation`，瞬时故障时退避后再试
///
/// 返回最后一次尝试的结果。
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_retryable: impl Fn(&StoreError) -> bool,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    debug!(operation = operation_name, retries, "重试后恢复");
                }
                return Ok(value);
            }
            Err(err) if !is_retryable(&err) => return Err(err),
            Err(err) => err,
        };

        if !policy.should_retry(retries) {
            warn!(operation = operation_name, retries, error = %err, "重试次数用尽");
            return Err(err);
        }

        let wait = policy.delay_for_attempt(retries);
        warn!(
            operation = operation_name,
            retry = retries + 1,
            wait_ms = wait.as_millis() as u64,
            error = %err,
            "存储暂时不可用，稍后重试"
        );
        tokio::time::sleep(wait).await;
        retries += 1;
    }
}
