//! 服务层数据传输对象

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillera_shared::blob::CertificateRef;
use validator::Validate;

use crate::leveling::LevelInfo;
use crate::models::{AchievementCategory, AchievementCounts};

/// 提交成就请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAchievementRequest {
    pub user_id: String,
    pub description: String,
    pub category: AchievementCategory,
    /// 是否获胜（积分 ×1.5 向下取整）
    #[serde(default)]
    pub won: bool,
    /// 已上传的证明材料引用
    pub certificate_ref: Option<CertificateRef>,
}

/// 驳回草稿
///
/// 两阶段驳回的第一阶段产物。草稿不修改任何记录，提交时会重新校验成就状态。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectDraft {
    user_id: String,
    achievement_id: String,
    description: String,
    category: AchievementCategory,
    points: u32,
    opened_at: DateTime<Utc>,
}

impl RejectDraft {
    pub(crate) fn new(
        user_id: String,
        achievement_id: String,
        description: String,
        category: AchievementCategory,
        points: u32,
    ) -> Self {
        Self {
            user_id,
            achievement_id,
            description,
            category,
            points,
            opened_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn achievement_id(&self) -> &str {
        &self.achievement_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> AchievementCategory {
        self.category
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// 学生注册请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[validate(length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"))]
    pub username: String,
    #[serde(rename = "class")]
    #[validate(length(min = 1, max = 20, message = "班级不能为空且不超过20字符"))]
    pub class_name: String,
    #[validate(length(min = 1, max = 20, message = "分班不能为空且不超过20字符"))]
    pub section: String,
    #[validate(length(min = 1, max = 50, message = "学号不能为空且不超过50字符"))]
    pub admission_number: String,
    pub phone: Option<String>,
    #[validate(email(message = "学校邮箱格式不正确"))]
    pub school_email: String,
    #[validate(email(message = "个人邮箱格式不正确"))]
    pub personal_email: Option<String>,
}

impl NewStudent {
    /// 去除各字段首尾空白，空的可选字段视为未填写
    pub fn normalized(self) -> Self {
        let optional = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            username: self.username.trim().to_string(),
            class_name: self.class_name.trim().to_string(),
            section: self.section.trim().to_string(),
            admission_number: self.admission_number.trim().to_string(),
            phone: optional(self.phone),
            school_email: self.school_email.trim().to_string(),
            personal_email: optional(self.personal_email),
        }
    }
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 名次，从 1 开始
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    /// 班级 + 分班，如 "10A"
    #[serde(rename = "class")]
    pub class_name: String,
    pub points: u64,
    pub level: u32,
}

/// 用户成长概览
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub username: String,
    pub points: u64,
    pub level: LevelInfo,
    pub achievements: AchievementCounts,
    pub completed_goals: usize,
    pub total_goals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_student() -> NewStudent {
        NewStudent {
            username: "Priya Sharma".to_string(),
            class_name: "10".to_string(),
            section: "A".to_string(),
            admission_number: "S20001".to_string(),
            phone: None,
            school_email: "S20001@apsjodhpur.com".to_string(),
            personal_email: None,
        }
    }

    #[test]
    fn test_new_student_validation() {
        assert!(valid_student().validate().is_ok());

        let mut bad_email = valid_student();
        bad_email.school_email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut blank_name = valid_student();
        blank_name.username = "   ".to_string();
        assert!(blank_name.normalized().validate().is_err());

        let mut bad_personal = valid_student();
        bad_personal.personal_email = Some("nope".to_string());
        assert!(bad_personal.validate().is_err());
    }

    #[test]
    fn test_normalized_drops_blank_optionals() {
        let mut student = valid_student();
        student.phone = Some("  ".to_string());
        student.personal_email = Some(" priya@example.com ".to_string());
        student.admission_number = " S20001 ".to_string();

        let normalized = student.normalized();
        assert_eq!(normalized.phone, None);
        assert_eq!(normalized.personal_email.as_deref(), Some("priya@example.com"));
        assert_eq!(normalized.admission_number, "S20001");
    }

    #[test]
    fn test_submit_request_json() {
        let raw = r#"{
            "userId": "stu_123",
            "description": "National Robotics Competition",
            "category": "National",
            "won": true,
            "certificateRef": "blob:sha256:00"
        }"#;
        let request: SubmitAchievementRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.category, AchievementCategory::National);
        assert!(request.won);
        assert_eq!(
            request.certificate_ref.as_ref().map(|r| r.as_str()),
            Some("blob:sha256:00")
        );
    }
}
