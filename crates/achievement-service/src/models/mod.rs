//! 领域模型
//!
//! 包含用户、成就、目标、徽章等核心实体定义

pub mod achievement;
pub mod badge;
pub mod enums;
pub mod user;

// 重新导出常用类型
pub use achievement::{Achievement, DEFAULT_REJECTION_REASON, PendingAchievement};
pub use badge::{BADGE_CATALOG, BadgeDefinition, find_badge};
pub use enums::{AchievementCategory, AchievementStatus, UserRole};
pub use user::{AchievementCounts, Goal, User};

/// 汇总所有用户的待审核成就
///
/// 按用户迭代顺序展开，每个用户内部保持原有顺序（最新在前）。
/// 输入不变时结果完全相同。
pub fn collect_pending(users: &[User]) -> Vec<PendingAchievement> {
    users
        .iter()
        .flat_map(|user| {
            user.pending_achievements().map(move |a| PendingAchievement {
                achievement: a.clone(),
                owner_id: user.id.clone(),
                owner_name: user.username.clone(),
            })
        })
        .collect()
}
