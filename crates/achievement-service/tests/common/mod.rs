//! 集成测试公共工具

#![allow(dead_code)]

use std::sync::Arc;

use achievement_service::dto::{NewStudent, SubmitAchievementRequest};
use achievement_service::{AchievementCategory, AppState, CategoryPointTable, LockConfig};
use fake::Fake;
use fake::faker::name::en::Name;
use skillera_shared::blob::{CertificateRef, MemoryBlobStore};
use skillera_shared::kv::KvStore;

/// 基于给定键值存储构建应用状态
pub fn state_with_store(store: Arc<dyn KvStore>) -> AppState {
    AppState::new(
        store,
        Arc::new(MemoryBlobStore::new()),
        LockConfig::default(),
        CategoryPointTable::default(),
    )
}

/// 随机姓名的学生注册请求
pub fn random_student(admission_number: &str) -> NewStudent {
    NewStudent {
        username: Name().fake(),
        class_name: "10".to_string(),
        section: "A".to_string(),
        admission_number: admission_number.to_string(),
        phone: None,
        school_email: format!("{}@apsjodhpur.com", admission_number),
        personal_email: None,
    }
}

/// 带证书引用的提交请求
pub fn submission(
    user_id: &str,
    description: &str,
    category: AchievementCategory,
    won: bool,
) -> SubmitAchievementRequest {
    SubmitAchievementRequest {
        user_id: user_id.to_string(),
        description: description.to_string(),
        category,
        won,
        certificate_ref: Some(CertificateRef::new(format!("test:{}", description))),
    }
}
