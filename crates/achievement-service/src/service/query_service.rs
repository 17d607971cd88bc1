//! 成长查询服务（只读操作）
//!
//! 排行榜、用户成长概览与已获得徽章。所有结果均由存储的用户记录即时派生。

use std::sync::Arc;

use crate::error::Result;
use crate::leveling::{LevelInfo, compute_level_info};
use crate::models::{BadgeDefinition, User, find_badge};
use crate::repository::{UserRepository, UserRepositoryTrait};
use crate::service::dto::{LeaderboardEntry, UserProgress};
use crate::service::require_user;

/// 成长查询服务
pub struct ProgressService<R = UserRepository>
where
    R: UserRepositoryTrait,
{
    repo: Arc<R>,
}

impl<R> ProgressService<R>
where
    R: UserRepositoryTrait,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 根据积分计算等级
    pub fn level_info(&self, points: u64) -> LevelInfo {
        compute_level_info(points)
    }

    /// 排行榜
    ///
    /// 只包含学生，按积分降序；积分相同时保持注册顺序。名次从 1 开始。
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let users = self.repo.list_users().await?;
        Ok(rank_students(&users, limit))
    }

    /// 用户成长概览
    pub async fn progress(&self, user_id: &str) -> Result<UserProgress> {
        let user = require_user(self.repo.as_ref(), user_id).await?;
        Ok(UserProgress {
            level: compute_level_info(user.points),
            achievements: user.achievement_counts(),
            completed_goals: user.goals.iter().filter(|g| g.completed).count(),
            total_goals: user.goals.len(),
            user_id: user.id,
            username: user.username,
            points: user.points,
        })
    }

    /// 已获得的徽章，按授予顺序；目录外的 ID 被忽略
    pub async fn earned_badges(&self, user_id: &str) -> Result<Vec<&'static BadgeDefinition>> {
        let user = require_user(self.repo.as_ref(), user_id).await?;
        Ok(user
            .earned_badge_ids
            .iter()
            .filter_map(|id| find_badge(id))
            .collect())
    }
}

/// 由用户列表生成排行榜
pub fn rank_students(users: &[User], limit: Option<usize>) -> Vec<LeaderboardEntry> {
    let mut students: Vec<&User> = users.iter().filter(|u| u.is_student()).collect();
    // sort_by 是稳定排序，同分保持输入顺序
    students.sort_by(|a, b| b.points.cmp(&a.points));

    students
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index + 1,
            user_id: user.id.clone(),
            name: user.username.clone(),
            class_name: format!("{}{}", user.class_name, user.section),
            points: user.points,
            level: compute_level_info(user.points).level,
        })
        .collect()
}
