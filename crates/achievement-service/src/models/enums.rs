//! 枚举类型定义
//!
//! JSON 表示与历史数据保持一致（角色、状态为小写，分类为展示名称）

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

/// 成就审核状态
///
/// 只允许 pending -> approved 或 pending -> rejected，两个终态不可回退
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementStatus {
    /// 待审核 - 学生提交后的初始状态
    #[default]
    Pending,
    /// 已通过 - 积分已计入用户
    Approved,
    /// 已驳回 - 附带驳回原因
    Rejected,
}

impl AchievementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// 判断状态迁移是否合法
    pub fn can_transition_to(&self, next: AchievementStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for AchievementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 成就分类
///
/// 按荣誉等级从低到高排列，`Ord` 与等级顺序一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementCategory {
    #[serde(rename = "Inter-House")]
    InterHouse,
    District,
    State,
    National,
    International,
}

impl AchievementCategory {
    /// 全部分类，按等级升序
    pub const ALL: [AchievementCategory; 5] = [
        Self::InterHouse,
        Self::District,
        Self::State,
        Self::National,
        Self::International,
    ];

    /// 展示名称（同时也是 JSON 中的取值）
    pub fn label(&self) -> &'static str {
        match self {
            Self::InterHouse => "Inter-House",
            Self::District => "District",
            Self::State => "State",
            Self::National => "National",
            Self::International => "International",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AchievementCategory {
    type Err = String;

    /// 接受展示名称或其简写，忽略大小写、连字符与下划线
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "interhouse" => Ok(Self::InterHouse),
            "district" => Ok(Self::District),
            "state" => Ok(Self::State),
            "national" => Ok(Self::National),
            "international" => Ok(Self::International),
            _ => Err(format!("未知的成就分类: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use AchievementStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
        assert!(Approved.is_terminal() && Rejected.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_category_json_uses_labels() {
        assert_eq!(
            serde_json::to_string(&AchievementCategory::InterHouse).unwrap(),
            "\"Inter-House\""
        );
        let parsed: AchievementCategory = serde_json::from_str("\"International\"").unwrap();
        assert_eq!(parsed, AchievementCategory::International);
    }

    #[test]
    fn test_category_order_matches_prestige() {
        let mut shuffled = vec![
            AchievementCategory::National,
            AchievementCategory::InterHouse,
            AchievementCategory::International,
            AchievementCategory::District,
            AchievementCategory::State,
        ];
        shuffled.sort();
        assert_eq!(shuffled, AchievementCategory::ALL.to_vec());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "inter-house".parse::<AchievementCategory>().unwrap(),
            AchievementCategory::InterHouse
        );
        assert_eq!(
            "INTER_HOUSE".parse::<AchievementCategory>().unwrap(),
            AchievementCategory::InterHouse
        );
        assert_eq!(
            "National".parse::<AchievementCategory>().unwrap(),
            AchievementCategory::National
        );
        assert!("galactic".parse::<AchievementCategory>().is_err());
    }

    #[test]
    fn test_role_and_status_json() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&AchievementStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
