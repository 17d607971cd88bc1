//! 等级计算引擎
//!
//! 由累计积分推导等级与当前等级内进度的纯函数，无副作用。
//!
//! 升级曲线：1 级升 2 级需要 200 XP；此后从 L 级升到 L+1 级需要 `floor(200 × L^1.2)`。
//! 等级上限为 100，循环次数受上限约束，与积分大小无关。

use serde::Serialize;

/// 等级上限
pub const MAX_LEVEL: u32 = 100;

/// 1 级升 2 级所需 XP
pub const BASE_LEVEL_XP: u64 = 200;

const LEVEL_CURVE_EXPONENT: f64 = 1.2;

/// 等级信息（派生值，不持久化）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    /// 当前等级（1..=100）
    pub level: u32,
    /// 当前等级内的进度百分比（0..=100）
    pub progress_percentage: f64,
    /// 当前等级内已获得的 XP
    pub current_level_progress_xp: u64,
    /// 升到下一级所需的 XP
    pub xp_for_next_level: u64,
}

impl LevelInfo {
    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }
}

/// 从 `level` 升到 `level + 1` 所需的 XP
pub fn xp_required_for_level(level: u32) -> u64 {
    if level <= 1 {
        return BASE_LEVEL_XP;
    }
    (BASE_LEVEL_XP as f64 * f64::from(level).powf(LEVEL_CURVE_EXPONENT)).floor() as u64
}

/// 到达 `level` 所需的累计 XP（1 级为 0）
pub fn total_xp_for_level(level: u32) -> u64 {
    (1..level.min(MAX_LEVEL)).map(xp_required_for_level).sum()
}

/// 根据累计积分计算等级信息
pub fn compute_level_info(points: u64) -> LevelInfo {
    let mut level: u32 = 1;
    let mut xp_for_next_level = xp_required_for_level(level);
    let mut consumed: u64 = 0;

    while level < MAX_LEVEL && points >= consumed + xp_for_next_level {
        consumed += xp_for_next_level;
        level += 1;
        xp_for_next_level = xp_required_for_level(level);
    }

    let current_level_progress_xp = points - consumed;
    let progress_percentage = if level == MAX_LEVEL {
        100.0
    } else {
        (current_level_progress_xp as f64 / xp_for_next_level as f64 * 100.0).min(100.0)
    };

    LevelInfo {
        level,
        progress_percentage,
        current_level_progress_xp,
        xp_for_next_level,
    }
}
