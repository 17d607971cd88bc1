//! 共享库
//!
//! 包含所有组件共用的配置、错误处理、可观测性、重试，以及键值存储与证书存储等基础设施代码。

pub mod blob;
pub mod config;
pub mod error;
pub mod kv;
pub mod observability;
pub mod retry;
pub mod test_utils;
