//! 仓储层
//!
//! 用户记录（含嵌套的成就与目标）以 JSON 形式保存在键值存储中。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 加锁与读-改-写由服务层控制
//! - 读写时校验积分不变量，不一致的记录不会被静默修复

mod traits;
mod user_repo;

pub use traits::*;
pub use user_repo::{USER_INDEX_KEY, UserRepository, user_record_key};
