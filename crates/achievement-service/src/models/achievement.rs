//! 成就记录实体定义

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skillera_shared::blob::CertificateRef;

use super::enums::{AchievementCategory, AchievementStatus};

/// 驳回时未填写原因使用的默认文案
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided.";

/// 成就记录
///
/// 学生提交的获奖/参赛记录。积分在提交时计算并冻结，审核通过时按冻结值计入用户。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub description: String,
    pub category: AchievementCategory,
    /// 提交时冻结的积分，之后不再重新计算
    pub points: u32,
    /// 提交日期（YYYY-MM-DD）
    pub date: NaiveDate,
    pub status: AchievementStatus,
    /// 证明材料引用（兼容历史字段 certificateUrl）
    #[serde(alias = "certificateUrl")]
    pub certificate_ref: CertificateRef,
    /// 驳回原因，仅在 rejected 状态下存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Achievement {
    pub fn is_pending(&self) -> bool {
        self.status == AchievementStatus::Pending
    }

    pub fn is_approved(&self) -> bool {
        self.status == AchievementStatus::Approved
    }

    /// 驳回原因与状态是否一致
    pub fn has_consistent_reason(&self) -> bool {
        match self.status {
            AchievementStatus::Rejected => self
                .rejection_reason
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty()),
            _ => self.rejection_reason.is_none(),
        }
    }
}

/// 待审核成就视图
///
/// 管理员审核列表的一行：成就本身及其所属用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAchievement {
    pub achievement: Achievement,
    pub owner_id: String,
    pub owner_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: AchievementStatus, reason: Option<&str>) -> Achievement {
        Achievement {
            id: "a4".to_string(),
            description: "State Level Swimming Championship".to_string(),
            category: AchievementCategory::State,
            points: 40,
            date: NaiveDate::from_ymd_opt(2024, 3, 22).unwrap(),
            status,
            certificate_ref: CertificateRef::new("seed:a4"),
            rejection_reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn test_json_shape() {
        let achievement = sample(
            AchievementStatus::Rejected,
            Some("Certificate does not state the year."),
        );
        let value = serde_json::to_value(&achievement).unwrap();
        assert_eq!(value["date"], "2024-03-22");
        assert_eq!(value["category"], "State");
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["certificateRef"], "seed:a4");
        assert_eq!(
            value["rejectionReason"],
            "Certificate does not state the year."
        );

        let pending = serde_json::to_value(sample(AchievementStatus::Pending, None)).unwrap();
        assert!(pending.get("rejectionReason").is_none());
    }

    #[test]
    fn test_legacy_certificate_url_field_is_accepted() {
        let raw = r#"{
            "id": "a3",
            "description": "National Robotics Competition",
            "category": "National",
            "points": 80,
            "date": "2024-06-11",
            "status": "pending",
            "certificateUrl": "data:image/png;base64,iVBORw0KGgo="
        }"#;
        let achievement: Achievement = serde_json::from_str(raw).unwrap();
        assert_eq!(
            achievement.certificate_ref.as_str(),
            "data:image/png;base64,iVBORw0KGgo="
        );
        assert!(achievement.is_pending());
    }

    #[test]
    fn test_reason_consistency() {
        assert!(sample(AchievementStatus::Pending, None).has_consistent_reason());
        assert!(sample(AchievementStatus::Rejected, Some("blurry")).has_consistent_reason());
        assert!(!sample(AchievementStatus::Rejected, None).has_consistent_reason());
        assert!(!sample(AchievementStatus::Approved, Some("x")).has_consistent_reason());
    }
}
