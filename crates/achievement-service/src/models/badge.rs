//! 徽章目录
//!
//! 徽章为静态定义，用户只保存已获得的徽章 ID

use serde::Serialize;

/// 徽章定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// 内置徽章目录
pub const BADGE_CATALOG: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "py_novice",
        name: "Python Novice",
        description: "Awarded for completing the introductory Python course.",
    },
    BadgeDefinition {
        id: "hack_participant",
        name: "Hackathon Participant",
        description: "For participating in the Annual Hackathon.",
    },
    BadgeDefinition {
        id: "creative_mind",
        name: "Creative Mind",
        description: "For outstanding work in the Art & Design Expo.",
    },
    BadgeDefinition {
        id: "team_player",
        name: "Team Player",
        description: "Recognized for excellent collaboration in a group project.",
    },
];

/// 按 ID 查找徽章定义
pub fn find_badge(badge_id: &str) -> Option<&'static BadgeDefinition> {
    BADGE_CATALOG.iter().find(|b| b.id == badge_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = BADGE_CATALOG.iter().map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BADGE_CATALOG.len());
    }

    #[test]
    fn test_find_badge() {
        assert_eq!(find_badge("team_player").unwrap().name, "Team Player");
        assert!(find_badge("unknown").is_none());
    }
}
