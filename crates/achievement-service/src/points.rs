//! 成就积分表
//!
//! 分类基础积分按荣誉等级严格递增。获胜加成为基础积分的 1.5 倍并向下取整，
//! 结果在提交时写入成就记录，积分表之后的调整不影响已提交的记录。

use skillera_shared::config::PointsConfig;

use crate::error::{AchievementError, Result};
use crate::models::AchievementCategory;

/// 单个分类基础积分的上限，保证获胜加成后仍在 `u32` 范围内
pub const MAX_BASE_POINTS: u32 = 1_000_000;

/// 分类积分表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPointTable {
    /// 与 `AchievementCategory::ALL` 一一对应
    bases: [u32; 5],
}

impl Default for CategoryPointTable {
    fn default() -> Self {
        Self {
            bases: [10, 20, 40, 80, 120],
        }
    }
}

impl CategoryPointTable {
    /// 由各分类基础积分构建，要求全部为正、严格递增且不超过 [`MAX_BASE_POINTS`]
    pub fn new(bases: [u32; 5]) -> Result<Self> {
        if bases[0] == 0 {
            return Err(AchievementError::Validation(
                "分类基础积分必须大于 0".to_string(),
            ));
        }
        if let Some((category, base)) = AchievementCategory::ALL
            .iter()
            .zip(bases)
            .find(|(_, base)| *base > MAX_BASE_POINTS)
        {
            return Err(AchievementError::Validation(format!(
                "分类基础积分超出上限: {} ({}) > {}",
                category, base, MAX_BASE_POINTS
            )));
        }
        if let Some(pair) = bases.windows(2).position(|w| w[0] >= w[1]) {
            return Err(AchievementError::Validation(format!(
                "分类基础积分必须严格递增: {} ({}) >= {} ({})",
                AchievementCategory::ALL[pair],
                bases[pair],
                AchievementCategory::ALL[pair + 1],
                bases[pair + 1],
            )));
        }
        Ok(Self { bases })
    }

    pub fn from_config(config: &PointsConfig) -> Result<Self> {
        Self::new([
            config.inter_house,
            config.district,
            config.state,
            config.national,
            config.international,
        ])
    }

    /// 分类基础积分
    pub fn base(&self, category: AchievementCategory) -> u32 {
        let index = AchievementCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        self.bases[index]
    }

    /// 计算成就积分：获胜时为 floor(base × 1.5)
    pub fn award(&self, category: AchievementCategory, won: bool) -> u32 {
        let base = self.base(category);
        if won { base + base / 2 } else { base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = CategoryPointTable::default();
        assert_eq!(table.base(AchievementCategory::InterHouse), 10);
        assert_eq!(table.base(AchievementCategory::District), 20);
        assert_eq!(table.base(AchievementCategory::State), 40);
        assert_eq!(table.base(AchievementCategory::National), 80);
        assert_eq!(table.base(AchievementCategory::International), 120);
        assert_eq!(
            CategoryPointTable::from_config(&PointsConfig::default()).unwrap(),
            table
        );
    }

    #[test]
    fn test_won_multiplier_floors() {
        let table = CategoryPointTable::default();
        assert_eq!(table.award(AchievementCategory::National, true), 120);
        assert_eq!(table.award(AchievementCategory::National, false), 80);
        assert_eq!(table.award(AchievementCategory::InterHouse, true), 15);

        // 奇数基础积分向下取整：floor(25 × 1.5) = 37
        let odd = CategoryPointTable::new([5, 25, 41, 81, 121]).unwrap();
        assert_eq!(odd.award(AchievementCategory::District, true), 37);
        assert_eq!(odd.award(AchievementCategory::InterHouse, true), 7);
        assert_eq!(odd.award(AchievementCategory::International, true), 181);
    }

    #[test]
    fn test_bases_increase_with_prestige() {
        let table = CategoryPointTable::default();
        for pair in AchievementCategory::ALL.windows(2) {
            assert!(table.base(pair[0]) < table.base(pair[1]));
            assert!(table.award(pair[0], true) < table.award(pair[1], true));
        }
    }

    #[test]
    fn test_rejects_non_increasing_table() {
        let err = CategoryPointTable::new([10, 20, 20, 80, 120]).unwrap_err();
        assert!(matches!(err, AchievementError::Validation(_)));
        assert!(err.to_string().contains("District"));

        assert!(CategoryPointTable::new([0, 20, 40, 80, 120]).is_err());
        assert!(CategoryPointTable::new([10, 20, 40, 80, 79]).is_err());
    }

    #[test]
    fn test_rejects_bases_above_cap() {
        let err = CategoryPointTable::new([10, 20, 40, 80, u32::MAX]).unwrap_err();
        assert!(matches!(err, AchievementError::Validation(_)));
        assert!(err.to_string().contains("International"));

        let config = PointsConfig {
            international: u32::MAX - 1,
            ..PointsConfig::default()
        };
        assert!(CategoryPointTable::from_config(&config).is_err());
    }

    #[test]
    fn test_won_award_at_cap_fits_u32() {
        let table = CategoryPointTable::new([1, 2, 3, 4, MAX_BASE_POINTS]).unwrap();
        assert_eq!(
            table.award(AchievementCategory::International, true),
            MAX_BASE_POINTS + MAX_BASE_POINTS / 2
        );
    }
}
