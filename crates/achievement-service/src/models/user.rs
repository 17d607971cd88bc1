//! 用户实体定义
//!
//! 用户聚合拥有自己的成就记录与学习目标，不与其他用户共享

use serde::{Deserialize, Serialize};

use super::achievement::Achievement;
use super::enums::{AchievementStatus, UserRole};

/// 学习目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// 用户
///
/// 不变量：`points` 等于所有 approved 成就的积分之和
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// 显示名称
    pub username: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub admission_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub school_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_email: Option<String>,
    pub role: UserRole,
    pub points: u64,
    #[serde(default)]
    pub earned_badge_ids: Vec<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// 按提交时间倒序（最新在前）
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

/// 各状态成就数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// 已通过成就的积分合计
    pub fn approved_points_total(&self) -> u64 {
        self.achievements
            .iter()
            .filter(|a| a.is_approved())
            .map(|a| u64::from(a.points))
            .sum()
    }

    /// 积分是否与已通过成就一致
    pub fn is_points_consistent(&self) -> bool {
        self.points == self.approved_points_total()
    }

    pub fn achievement(&self, achievement_id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == achievement_id)
    }

    pub fn achievement_mut(&mut self, achievement_id: &str) -> Option<&mut Achievement> {
        self.achievements.iter_mut().find(|a| a.id == achievement_id)
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == goal_id)
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.earned_badge_ids.iter().any(|b| b == badge_id)
    }

    pub fn achievement_counts(&self) -> AchievementCounts {
        self.achievements
            .iter()
            .fold(AchievementCounts::default(), |mut counts, a| {
                match a.status {
                    AchievementStatus::Pending => counts.pending += 1,
                    AchievementStatus::Approved => counts.approved += 1,
                    AchievementStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }

    /// 待审核成就，保持用户内部顺序
    pub fn pending_achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.is_pending())
    }
}
