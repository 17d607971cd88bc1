//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，将命令行参数转化为服务调用。
//! 每个命令返回一个 JSON 值，由入口统一输出。

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use skillera_shared::blob::{CertificateRef, CertificateUpload};
use tracing::info;

use crate::cli::commands::{BadgeCommand, Commands, GoalCommand, RegisterArgs};
use crate::models::{AchievementCategory, BADGE_CATALOG};
use crate::service::{NewStudent, SubmitAchievementRequest};
use crate::state::AppState;

/// 命令执行器
///
/// 持有应用状态，作为 CLI 与服务层之间的桥梁
pub struct CommandRunner {
    state: AppState,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("序列化输出失败")
}

impl CommandRunner {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 执行命令
    ///
    /// `input` 仅在交互式驳回时读取
    pub async fn run(&self, command: Commands, input: impl BufRead) -> Result<Value> {
        match command {
            Commands::Seed => self.run_seed().await,
            Commands::Register(args) => self.run_register(args).await,
            Commands::Submit {
                user,
                description,
                category,
                won,
                certificate,
                certificate_ref,
            } => {
                let request = SubmitAchievementRequest {
                    user_id: user,
                    description,
                    category,
                    won,
                    certificate_ref: certificate_ref.map(CertificateRef::new),
                };
                self.run_submit(request, certificate.as_deref()).await
            }
            Commands::Approve { user, achievement } => {
                let updated = self.state.achievements.approve(&user, &achievement).await?;
                to_json(&updated)
            }
            Commands::Reject {
                user,
                achievement,
                reason,
                prompt,
            } => {
                if prompt {
                    self.run_reject_interactive(&user, &achievement, input).await
                } else {
                    let updated = self
                        .state
                        .achievements
                        .reject(&user, &achievement, reason.as_deref())
                        .await?;
                    to_json(&updated)
                }
            }
            Commands::Pending => to_json(&self.state.achievements.pending_achievements().await?),
            Commands::Categories => Ok(category_summary(&self.state)),
            Commands::Level { points } => to_json(&self.state.progress.level_info(points)),
            Commands::Progress { user } => to_json(&self.state.progress.progress(&user).await?),
            Commands::Leaderboard { limit } => {
                to_json(&self.state.progress.leaderboard(limit).await?)
            }
            Commands::Certificate { reference, output } => {
                self.run_certificate(&reference, &output).await
            }
            Commands::Goal(GoalCommand::Add { user, text }) => {
                to_json(&self.state.roster.add_goal(&user, &text).await?)
            }
            Commands::Goal(GoalCommand::Toggle { user, goal }) => {
                to_json(&self.state.roster.toggle_goal(&user, &goal).await?)
            }
            Commands::Badge(BadgeCommand::Award { user, badge }) => {
                let newly_awarded = self.state.roster.award_badge(&user, &badge).await?;
                Ok(json!({ "userId": user, "badgeId": badge, "newlyAwarded": newly_awarded }))
            }
            Commands::Badge(BadgeCommand::List { user: Some(user) }) => {
                to_json(&self.state.progress.earned_badges(&user).await?)
            }
            Commands::Badge(BadgeCommand::List { user: None }) => to_json(&BADGE_CATALOG),
        }
    }

    async fn run_seed(&self) -> Result<Value> {
        let seeded = self.state.roster.ensure_seeded().await?;
        let users = self.state.roster.list_users().await?;
        Ok(json!({
            "seeded": seeded,
            "users": users.iter().map(|u| json!({ "id": u.id, "role": u.role })).collect::<Vec<_>>(),
        }))
    }

    async fn run_register(&self, args: RegisterArgs) -> Result<Value> {
        let request = NewStudent {
            username: args.name,
            class_name: args.class_name,
            section: args.section,
            admission_number: args.admission_number,
            phone: args.phone,
            school_email: args.school_email,
            personal_email: args.personal_email,
        };
        to_json(&self.state.roster.register_student(request).await?)
    }

    async fn run_submit(
        &self,
        request: SubmitAchievementRequest,
        certificate: Option<&Path>,
    ) -> Result<Value> {
        let achievement = match certificate {
            Some(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("读取证书文件失败: {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let upload = CertificateUpload::new(file_name, bytes);
                self.state
                    .achievements
                    .submit_with_certificate(request, upload)
                    .await?
            }
            None => self.state.achievements.submit(request).await?,
        };
        to_json(&achievement)
    }

    /// 交互式驳回：先打开草稿，再从输入读取一行原因
    ///
    /// 输入结束（EOF）时放弃驳回，记录保持不变
    async fn run_reject_interactive(
        &self,
        user: &str,
        achievement: &str,
        mut input: impl BufRead,
    ) -> Result<Value> {
        let draft = self.state.achievements.begin_reject(user, achievement).await?;
        eprintln!(
            "驳回 \"{}\"（{}，{} 分）。请输入原因，留空使用默认文案：",
            draft.description(),
            draft.category(),
            draft.points()
        );

        let mut line = String::new();
        let read = input.read_line(&mut line).context("读取驳回原因失败")?;
        if read == 0 {
            let cancelled = json!({
                "cancelled": true,
                "userId": draft.user_id(),
                "achievementId": draft.achievement_id(),
            });
            self.state.achievements.cancel_reject(draft);
            return Ok(cancelled);
        }

        let updated = self
            .state
            .achievements
            .commit_reject(draft, Some(line.as_str()))
            .await?;
        to_json(&updated)
    }

    async fn run_certificate(&self, reference: &str, output: &Path) -> Result<Value> {
        let bytes = self
            .state
            .achievements
            .certificate(&CertificateRef::new(reference))
            .await?;
        tokio::fs::write(output, &bytes)
            .await
            .with_context(|| format!("写入文件失败: {}", output.display()))?;
        info!(reference, bytes = bytes.len(), "证书已导出");
        Ok(json!({ "reference": reference, "bytes": bytes.len(), "output": output }))
    }
}

/// 各分类的基础积分与获胜积分
pub fn category_summary(state: &AppState) -> Value {
    let table = state.achievements.point_table();
    Value::Array(
        AchievementCategory::ALL
            .iter()
            .map(|c| json!({ "category": c, "base": table.base(*c), "won": table.award(*c, true) }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn seeded_runner() -> CommandRunner {
        let runner = CommandRunner::new(AppState::in_memory());
        runner.run(Commands::Seed, Cursor::new("")).await.unwrap();
        runner
    }

    #[tokio::test]
    async fn test_interactive_reject_eof_cancels() {
        let runner = seeded_runner().await;
        let output = runner
            .run(
                Commands::Reject {
                    user: "stu_123".to_string(),
                    achievement: "a3".to_string(),
                    reason: None,
                    prompt: true,
                },
                Cursor::new(""),
            )
            .await
            .unwrap();
        assert_eq!(output["cancelled"], true);

        let pending = runner.run(Commands::Pending, Cursor::new("")).await.unwrap();
        assert_eq!(pending.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_interactive_reject_reads_reason() {
        let runner = seeded_runner().await;
        let output = runner
            .run(
                Commands::Reject {
                    user: "stu_123".to_string(),
                    achievement: "a3".to_string(),
                    reason: None,
                    prompt: true,
                },
                Cursor::new("  Image is blurry \n"),
            )
            .await
            .unwrap();
        assert_eq!(output["points"], 35);
        assert_eq!(output["achievements"][2]["status"], "rejected");
        assert_eq!(output["achievements"][2]["rejectionReason"], "Image is blurry");
    }

    #[tokio::test]
    async fn test_badge_list_without_user_shows_catalog() {
        let runner = CommandRunner::new(AppState::in_memory());
        let output = runner
            .run(Commands::Badge(BadgeCommand::List { user: None }), Cursor::new(""))
            .await
            .unwrap();
        assert_eq!(output.as_array().unwrap().len(), BADGE_CATALOG.len());
    }

    #[test]
    fn test_category_summary() {
        let summary = category_summary(&AppState::in_memory());
        assert_eq!(summary[0]["category"], "Inter-House");
        assert_eq!(summary[0]["won"], 15);
        assert_eq!(summary[4]["base"], 120);
    }
}
