//! 用户锁模块
//!
//! 每个用户一把异步锁，保证同一用户的读-改-写不会交错。
//!
//! - **按键加锁**: 不同用户的操作互不阻塞
//! - **跨进程**: 配置锁文件目录后，共享数据目录的多个进程经由排他文件锁互斥
//! - **有界等待**: 超过 `acquire_timeout` 返回 `LockTimeout`
//! - **RAII 模式**: `LockGuard` drop 时释放，覆盖所有退出路径
//!
//! ```ignore
//! let locks = LockManager::new(LockConfig::default());
//! let guard = locks.acquire(&LockManager::user_key("stu_123")).await?;
//! // 读取、修改、写回用户记录
//! guard.release();
//! ```

mod lock_manager;

pub use lock_manager::{LockConfig, LockGuard, LockManager};
