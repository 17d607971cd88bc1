//! 演示数据
//!
//! 存储为空时写入的一个学生与一个管理员。学生积分取已通过成就之和，
//! 保证首次加载即满足积分不变量。

use chrono::NaiveDate;
use skillera_shared::blob::CertificateRef;

use crate::models::{Achievement, AchievementCategory, AchievementStatus, Goal, User, UserRole};

pub const DEMO_STUDENT_ID: &str = "stu_123";
pub const DEMO_ADMIN_ID: &str = "adm_001";

/// 演示用的 1x1 PNG 证书
const DEMO_CERTIFICATE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn achievement(
    id: &str,
    description: &str,
    category: AchievementCategory,
    points: u32,
    date: NaiveDate,
    status: AchievementStatus,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        description: description.to_string(),
        category,
        points,
        date,
        status,
        certificate_ref: CertificateRef::new(format!("seed:{}", id)),
        rejection_reason: None,
    }
}

fn goal(id: &str, text: &str, completed: bool) -> Goal {
    Goal {
        id: id.to_string(),
        text: text.to_string(),
        completed,
    }
}

/// 演示学生
pub fn demo_student() -> User {
    let mut robotics = achievement(
        "a3",
        "National Robotics Competition",
        AchievementCategory::National,
        80,
        date(2024, 6, 11),
        AchievementStatus::Pending,
    );
    robotics.certificate_ref = CertificateRef::new(DEMO_CERTIFICATE);

    let mut swimming = achievement(
        "a4",
        "State Level Swimming Championship",
        AchievementCategory::State,
        40,
        date(2024, 3, 22),
        AchievementStatus::Rejected,
    );
    swimming.rejection_reason = Some("Certificate does not state the year.".to_string());

    let achievements = vec![
        achievement(
            "a1",
            "Won 1st place in Inter-House Debate",
            AchievementCategory::InterHouse,
            15,
            date(2024, 5, 20),
            AchievementStatus::Approved,
        ),
        achievement(
            "a2",
            "Participated in District Science Fair",
            AchievementCategory::District,
            20,
            date(2024, 4, 10),
            AchievementStatus::Approved,
        ),
        robotics,
        swimming,
    ];

    let mut student = User {
        id: DEMO_STUDENT_ID.to_string(),
        username: "Alex Doe".to_string(),
        class_name: "10".to_string(),
        section: "A".to_string(),
        admission_number: "S12345".to_string(),
        phone: Some("9876543210".to_string()),
        school_email: "S12345@apsjodhpur.com".to_string(),
        personal_email: Some("alex.doe@example.com".to_string()),
        role: UserRole::Student,
        points: 0,
        earned_badge_ids: ["py_novice", "hack_participant", "creative_mind", "team_player"]
            .iter()
            .map(|id| id.to_string())
            .collect(),
        goals: vec![
            goal("g1", "Complete Python project", true),
            goal("g2", "Score 90% in next Math test", false),
            goal("g3", "Read 2 new books this month", false),
        ],
        achievements,
    };
    student.points = student.approved_points_total();
    student
}

/// 演示管理员
pub fn demo_admin() -> User {
    User {
        id: DEMO_ADMIN_ID.to_string(),
        username: "Dr. Evelyn Reed".to_string(),
        class_name: "N/A".to_string(),
        section: "N/A".to_string(),
        admission_number: "A00001".to_string(),
        phone: None,
        school_email: "admin@apsjodhpur.com".to_string(),
        personal_email: None,
        role: UserRole::Admin,
        points: 0,
        earned_badge_ids: vec![],
        goals: vec![],
        achievements: vec![],
    }
}

/// 全部演示用户（学生在前）
pub fn demo_users() -> Vec<User> {
    vec![demo_student(), demo_admin()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_badge;

    #[test]
    fn test_demo_student_is_consistent() {
        let student = demo_student();
        assert_eq!(student.points, 35);
        assert!(student.is_points_consistent());
        assert!(student.achievements.iter().all(|a| a.has_consistent_reason()));
        assert!(student.earned_badge_ids.iter().all(|id| find_badge(id).is_some()));

        let counts = student.achievement_counts();
        assert_eq!((counts.approved, counts.pending, counts.rejected), (2, 1, 1));
    }

    #[test]
    fn test_demo_admin() {
        let admin = demo_admin();
        assert!(admin.is_admin());
        assert_eq!(admin.points, 0);
        assert!(admin.achievements.is_empty());
    }
}
