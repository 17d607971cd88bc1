//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 子命令分为学生侧（提交、目标、进度）与管理员侧（审核、授予徽章）两类。

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::AchievementCategory;

/// Skillera 成就管理命令行工具
///
/// 所有命令的输出均为 JSON，日志写入 stderr。
#[derive(Parser, Debug)]
#[command(name = "skillera")]
#[command(version, about = "学生成就提交与审核工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，覆盖配置文件 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 存储为空时写入演示学生与管理员
    Seed,

    /// 注册学生
    Register(RegisterArgs),

    /// 提交成就（等待审核）
    ///
    /// `--certificate` 上传本地文件；`--certificate-ref` 使用已上传的引用。
    Submit {
        /// 用户 ID
        #[arg(short, long)]
        user: String,

        /// 成就描述
        #[arg(short, long)]
        description: String,

        /// 分类：inter-house, district, state, national, international
        #[arg(short, long)]
        category: AchievementCategory,

        /// 是否获胜（积分 ×1.5）
        #[arg(long)]
        won: bool,

        /// 证书文件路径
        #[arg(long, conflicts_with = "certificate_ref", required_unless_present = "certificate_ref")]
        certificate: Option<PathBuf>,

        /// 已上传的证书引用
        #[arg(long)]
        certificate_ref: Option<String>,
    },

    /// 审核通过
    Approve {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        achievement: String,
    },

    /// 驳回成就
    ///
    /// `--prompt` 从标准输入读取原因，输入结束（EOF）即放弃驳回。
    Reject {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        achievement: String,

        /// 驳回原因，留空使用默认文案
        #[arg(short, long, conflicts_with = "prompt")]
        reason: Option<String>,

        /// 交互式输入原因
        #[arg(long)]
        prompt: bool,
    },

    /// 列出全部待审核成就
    Pending,

    /// 各分类的基础积分与获胜积分
    Categories,

    /// 根据积分计算等级
    Level {
        /// 累计积分
        points: u64,
    },

    /// 查看用户成长概览
    Progress {
        #[arg(short, long)]
        user: String,
    },

    /// 学生排行榜
    Leaderboard {
        /// 只显示前 N 名
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// 读取证书内容并写入文件
    Certificate {
        /// 证书引用
        reference: String,

        /// 输出文件路径
        #[arg(short, long)]
        output: PathBuf,
    },

    /// 学习目标
    #[command(subcommand)]
    Goal(GoalCommand),

    /// 徽章
    #[command(subcommand)]
    Badge(BadgeCommand),
}

/// 注册参数
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// 姓名
    #[arg(long)]
    pub name: String,

    /// 班级
    #[arg(long = "class")]
    pub class_name: String,

    /// 分班
    #[arg(long)]
    pub section: String,

    /// 学号
    #[arg(long)]
    pub admission_number: String,

    /// 学校邮箱
    #[arg(long)]
    pub school_email: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub personal_email: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// 添加目标
    Add {
        #[arg(short, long)]
        user: String,

        /// 目标内容
        text: String,
    },
    /// 切换目标完成状态
    Toggle {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        goal: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BadgeCommand {
    /// 授予徽章（管理员）
    Award {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        badge: String,
    },
    /// 列出徽章目录；指定用户时列出其已获得的徽章
    List {
        #[arg(short, long)]
        user: Option<String>,
    },
}

// ============================================================================
// 单元测试
// ============================================================================
