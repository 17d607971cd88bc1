//! 用户名册服务
//!
//! 学生注册、演示数据初始化，以及学习目标与徽章的维护。

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AchievementError, Result};
use crate::lock::LockManager;
use crate::models::{Goal, User, UserRole, find_badge};
use crate::repository::{UserRepository, UserRepositoryTrait};
use crate::seed;
use crate::service::dto::NewStudent;
use crate::service::{require_user, update_user};

/// 串行化注册与初始化的锁键，保证学号唯一性检查与写入之间没有交错
const REGISTRATION_LOCK_KEY: &str = "users:registration";

/// 用户名册服务
pub struct RosterService<R = UserRepository>
where
    R: UserRepositoryTrait,
{
    repo: Arc<R>,
    locks: Arc<LockManager>,
}

impl<R> RosterService<R>
where
    R: UserRepositoryTrait,
{
    pub fn new(repo: Arc<R>, locks: Arc<LockManager>) -> Self {
        Self { repo, locks }
    }

    /// 注册学生
    ///
    /// 学号不区分大小写唯一；新学生积分为 0，没有成就、目标与徽章。
    #[instrument(skip(self, request), fields(admission_number = %request.admission_number))]
    pub async fn register_student(&self, request: NewStudent) -> Result<User> {
        let request = request.normalized();
        request
            .validate()
            .map_err(|e| AchievementError::Validation(e.to_string()))?;

        let _guard = self.locks.acquire(REGISTRATION_LOCK_KEY).await?;

        let users = self.repo.list_users().await?;
        if users
            .iter()
            .any(|u| u.admission_number.eq_ignore_ascii_case(&request.admission_number))
        {
            return Err(AchievementError::AlreadyExists {
                field: "admissionNumber".to_string(),
                value: request.admission_number,
            });
        }

        let user = User {
            id: format!("user_{}", Uuid::now_v7().simple()),
            username: request.username,
            class_name: request.class_name,
            section: request.section,
            admission_number: request.admission_number,
            phone: request.phone,
            school_email: request.school_email,
            personal_email: request.personal_email,
            role: UserRole::Student,
            points: 0,
            earned_badge_ids: vec![],
            goals: vec![],
            achievements: vec![],
        };
        self.repo.create_user(&user).await?;

        info!(user_id = %user.id, "学生注册成功");
        Ok(user)
    }

    /// 按学号查找用户（不区分大小写）
    pub async fn find_by_admission_number(&self, admission_number: &str) -> Result<Option<User>> {
        let needle = admission_number.trim();
        Ok(self
            .repo
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.admission_number.eq_ignore_ascii_case(needle)))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        require_user(self.repo.as_ref(), user_id).await
    }

    /// 按注册顺序列出全部用户
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repo.list_users().await
    }

    /// 存储为空时写入演示用户
    ///
    /// 返回是否执行了写入。已有任何用户时不做修改。
    #[instrument(skip(self))]
    pub async fn ensure_seeded(&self) -> Result<bool> {
        let _guard = self.locks.acquire(REGISTRATION_LOCK_KEY).await?;

        if !self.repo.user_ids().await?.is_empty() {
            return Ok(false);
        }
        for user in seed::demo_users() {
            self.repo.create_user(&user).await?;
        }
        info!("演示数据已写入");
        Ok(true)
    }

    /// 添加学习目标（追加到末尾）
    #[instrument(skip(self, text))]
    pub async fn add_goal(&self, user_id: &str, text: &str) -> Result<Goal> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AchievementError::Validation("目标内容不能为空".to_string()));
        }
        let goal = Goal {
            id: format!("goal_{}", Uuid::now_v7().simple()),
            text: text.to_string(),
            completed: false,
        };

        let (_, goal) = update_user(self.repo.as_ref(), &self.locks, user_id, |user| {
            user.goals.push(goal.clone());
            Ok(goal)
        })
        .await?;
        Ok(goal)
    }

    /// 切换学习目标的完成状态
    #[instrument(skip(self))]
    pub async fn toggle_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let (_, goal) = update_user(self.repo.as_ref(), &self.locks, user_id, |user| {
            let goal = user
                .goal_mut(goal_id)
                .ok_or_else(|| AchievementError::GoalNotFound {
                    user_id: user_id.to_string(),
                    goal_id: goal_id.to_string(),
                })?;
            goal.completed = !goal.completed;
            Ok(goal.clone())
        })
        .await?;
        Ok(goal)
    }

    /// 授予徽章
    ///
    /// 徽章必须在目录中；重复授予不产生重复项。返回是否为新授予。
    #[instrument(skip(self))]
    pub async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<bool> {
        let badge =
            find_badge(badge_id).ok_or_else(|| AchievementError::BadgeNotFound(badge_id.to_string()))?;

        let (_, newly_awarded) = update_user(self.repo.as_ref(), &self.locks, user_id, |user| {
            if user.has_badge(badge.id) {
                return Ok(false);
            }
            user.earned_badge_ids.push(badge.id.to_string());
            Ok(true)
        })
        .await?;

        if newly_awarded {
            info!(badge = badge.name, "徽章已授予");
        }
        Ok(newly_awarded)
    }
}
