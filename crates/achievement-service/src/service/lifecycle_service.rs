//! 成就生命周期服务
//!
//! 处理成就从提交到审核完成的状态流转：
//! - 提交：计算并冻结积分，以 pending 状态插入用户成就列表头部
//! - 通过：pending -> approved，冻结积分计入用户总积分
//! - 驳回：pending -> rejected，记录驳回原因，积分不变
//!
//! ## 两阶段驳回
//!
//! 管理员先打开驳回草稿（`begin_reject`），填写原因后提交（`commit_reject`），
//! 或放弃（`cancel_reject`）。草稿阶段不修改任何记录，提交时在用户锁内重新
//! 校验状态，期间被其他管理员处理过的成就会返回 `InvalidState`。
//!
//! 每个写操作都只读写一个用户记录，不同用户的操作互不阻塞。

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use skillera_shared::blob::{BlobStore, CertificateRef, CertificateUpload};
use skillera_shared::error::StoreError;
use skillera_shared::observability::metrics;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AchievementError, Result};
use crate::lock::LockManager;
use crate::models::{
    Achievement, AchievementStatus, DEFAULT_REJECTION_REASON, PendingAchievement, User,
    collect_pending,
};
use crate::points::CategoryPointTable;
use crate::repository::{UserRepository, UserRepositoryTrait};
use crate::service::dto::{RejectDraft, SubmitAchievementRequest};
use crate::service::{require_user, update_user};

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// 成就生命周期服务
pub struct AchievementService<R = UserRepository>
where
    R: UserRepositoryTrait,
{
    repo: Arc<R>,
    locks: Arc<LockManager>,
    point_table: CategoryPointTable,
    blob_store: Arc<dyn BlobStore>,
    /// 提交日期来源，默认取本地日期
    today: fn() -> NaiveDate,
}

impl<R> AchievementService<R>
where
    R: UserRepositoryTrait,
{
    pub fn new(
        repo: Arc<R>,
        locks: Arc<LockManager>,
        point_table: CategoryPointTable,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            repo,
            locks,
            point_table,
            blob_store,
            today: local_today,
        }
    }

    /// 替换提交日期来源
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn point_table(&self) -> &CategoryPointTable {
        &self.point_table
    }

    /// 提交成就
    ///
    /// 新成就状态为 pending，积分按提交时的积分表计算后冻结；用户总积分不变。
    #[instrument(skip(self, request), fields(user_id = %request.user_id, category = %request.category))]
    pub async fn submit(&self, request: SubmitAchievementRequest) -> Result<Achievement> {
        let description = validate_description(&request.description)?;
        let certificate_ref = request
            .certificate_ref
            .filter(|r| !r.is_blank())
            .ok_or_else(|| AchievementError::Validation("必须提供证明材料".to_string()))?;

        let achievement = Achievement {
            id: format!("ach_{}", Uuid::now_v7().simple()),
            description,
            category: request.category,
            points: self.point_table.award(request.category, request.won),
            date: (self.today)(),
            status: AchievementStatus::Pending,
            certificate_ref,
            rejection_reason: None,
        };

        let (_, submitted) =
            update_user(self.repo.as_ref(), &self.locks, &request.user_id, |user| {
                user.achievements.insert(0, achievement);
                Ok(user.achievements[0].clone())
            })
            .await?;

        metrics::record_submission(submitted.category.label());
        info!(
            achievement_id = %submitted.id,
            points = submitted.points,
            won = request.won,
            "成就已提交，等待审核"
        );
        Ok(submitted)
    }

    /// 上传证明材料并提交成就
    ///
    /// 先确认用户存在再上传，避免为不存在的用户留下文件。
    #[instrument(skip(self, request, upload), fields(user_id = %request.user_id, file = %upload.file_name))]
    pub async fn submit_with_certificate(
        &self,
        mut request: SubmitAchievementRequest,
        upload: CertificateUpload,
    ) -> Result<Achievement> {
        validate_description(&request.description)?;
        require_user(self.repo.as_ref(), &request.user_id).await?;

        let reference = self.blob_store.put(upload).await.map_err(|e| match e {
            StoreError::InvalidUpload(message) => AchievementError::Validation(message),
            other => other.into(),
        })?;
        request.certificate_ref = Some(reference);
        self.submit(request).await
    }

    /// 读取证明材料内容
    pub async fn certificate(&self, reference: &CertificateRef) -> Result<Vec<u8>> {
        Ok(self.blob_store.get(reference).await?)
    }

    /// 审核通过
    ///
    /// 仅 pending 成就可以通过；冻结积分计入用户总积分，返回更新后的用户。
    #[instrument(skip(self))]
    pub async fn approve(&self, user_id: &str, achievement_id: &str) -> Result<User> {
        let (user, awarded) = update_user(self.repo.as_ref(), &self.locks, user_id, |user| {
            let awarded = {
                let achievement = user.achievement_mut(achievement_id).ok_or_else(|| {
                    AchievementError::AchievementNotFound {
                        user_id: user_id.to_string(),
                        achievement_id: achievement_id.to_string(),
                    }
                })?;
                ensure_pending(achievement, AchievementStatus::Approved)?;
                achievement.status = AchievementStatus::Approved;
                u64::from(achievement.points)
            };
            user.points = user.points.checked_add(awarded).ok_or_else(|| {
                AchievementError::Internal(format!("用户积分溢出: {}", user_id))
            })?;
            Ok(awarded)
        })
        .await?;

        metrics::record_adjudication("approved");
        metrics::record_points_awarded(awarded);
        info!(points = awarded, total_points = user.points, "成就审核通过");
        Ok(user)
    }

    /// 打开驳回草稿
    ///
    /// 只校验成就存在且为 pending，不修改记录。
    #[instrument(skip(self))]
    pub async fn begin_reject(&self, user_id: &str, achievement_id: &str) -> Result<RejectDraft> {
        let user = require_user(self.repo.as_ref(), user_id).await?;
        let achievement =
            user.achievement(achievement_id)
                .ok_or_else(|| AchievementError::AchievementNotFound {
                    user_id: user_id.to_string(),
                    achievement_id: achievement_id.to_string(),
                })?;
        ensure_pending(achievement, AchievementStatus::Rejected)?;

        Ok(RejectDraft::new(
            user.id.clone(),
            achievement.id.clone(),
            achievement.description.clone(),
            achievement.category,
            achievement.points,
        ))
    }

    /// 提交驳回
    ///
    /// 原因去除首尾空白后为空时使用默认文案。用户积分不变。
    #[instrument(skip(self, draft, reason), fields(user_id = %draft.user_id(), achievement_id = %draft.achievement_id()))]
    pub async fn commit_reject(&self, draft: RejectDraft, reason: Option<&str>) -> Result<User> {
        let reason = normalize_reason(reason);
        let achievement_id = draft.achievement_id();

        let (user, _) = update_user(self.repo.as_ref(), &self.locks, draft.user_id(), |user| {
            let achievement = user.achievement_mut(achievement_id).ok_or_else(|| {
                AchievementError::AchievementNotFound {
                    user_id: draft.user_id().to_string(),
                    achievement_id: achievement_id.to_string(),
                }
            })?;
            ensure_pending(achievement, AchievementStatus::Rejected)?;
            achievement.status = AchievementStatus::Rejected;
            achievement.rejection_reason = Some(reason.clone());
            Ok(())
        })
        .await?;

        metrics::record_adjudication("rejected");
        info!(reason = %reason, "成就已驳回");
        Ok(user)
    }

    /// 放弃驳回草稿，不产生任何修改
    pub fn cancel_reject(&self, draft: RejectDraft) {
        metrics::record_adjudication("cancelled");
        info!(
            user_id = %draft.user_id(),
            achievement_id = %draft.achievement_id(),
            "驳回已取消"
        );
    }

    /// 直接驳回（打开草稿并立即提交）
    pub async fn reject(
        &self,
        user_id: &str,
        achievement_id: &str,
        reason: Option<&str>,
    ) -> Result<User> {
        let draft = self.begin_reject(user_id, achievement_id).await?;
        self.commit_reject(draft, reason).await
    }

    /// 汇总全部待审核成就
    ///
    /// 按用户注册顺序展开，每个用户内部最新在前。
    pub async fn pending_achievements(&self) -> Result<Vec<PendingAchievement>> {
        let users = self.repo.list_users().await?;
        Ok(collect_pending(&users))
    }
}

fn validate_description(raw: &str) -> Result<String> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(AchievementError::Validation("成就描述不能为空".to_string()));
    }
    Ok(description.to_string())
}

fn ensure_pending(achievement: &Achievement, target: AchievementStatus) -> Result<()> {
    if achievement.status.can_transition_to(target) {
        return Ok(());
    }
    Err(AchievementError::InvalidState {
        achievement_id: achievement.id.clone(),
        current_status: achievement.status,
    })
}

fn normalize_reason(reason: Option<&str>) -> String {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REJECTION_REASON)
        .to_string()
}
