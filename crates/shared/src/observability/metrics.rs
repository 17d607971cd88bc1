//! 业务指标模块
//!
//! 通过 metrics 门面记录计数器。未安装 recorder 时所有记录均为空操作，
//! 由部署方决定接入哪种导出器。

/// 注册指标描述
pub fn describe() {
    metrics::describe_counter!(
        "achievements_submitted_total",
        "Total number of achievements submitted for verification"
    );
    metrics::describe_counter!(
        "achievements_adjudicated_total",
        "Total number of achievements approved or rejected"
    );
    metrics::describe_counter!(
        "points_awarded_total",
        "Total number of points credited on approval"
    );
    metrics::describe_counter!(
        "store_operations_total",
        "Total number of key-value store operations"
    );
}

/// 记录成就提交
pub fn record_submission(category: &str) {
    metrics::counter!("achievements_submitted_total", "category" => category.to_string())
        .increment(1);
}

/// 记录审核结果（approved / rejected / cancelled）
pub fn record_adjudication(outcome: &'static str) {
    metrics::counter!("achievements_adjudicated_total", "outcome" => outcome).increment(1);
}

/// 记录审核通过发放的积分
pub fn record_points_awarded(points: u64) {
    metrics::counter!("points_awarded_total").increment(points);
}

/// 记录存储操作结果
pub fn record_store_operation(op: &'static str, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("store_operations_total", "op" => op, "result" => result).increment(1);
}
