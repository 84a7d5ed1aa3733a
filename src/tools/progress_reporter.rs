use crate::config::FailurePolicy;
use crate::runner::{FailureAction, ItemFailure, ProgressSink};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rust_i18n::t;

/// 在進度列與提示中顯示的項目名稱
pub trait ItemLabel {
    fn label(&self) -> String;
}

/// 以 indicatif 進度列呈現批次進度的 [`ProgressSink`]
pub struct TerminalProgress {
    progress_bar: ProgressBar,
    policy: FailurePolicy,
}

impl TerminalProgress {
    #[must_use]
    pub fn new(total: usize, policy: FailurePolicy) -> Self {
        let progress_bar = ProgressBar::new(total as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self {
            progress_bar,
            policy,
        }
    }

    /// 供呼叫端在批次結束後收尾
    #[must_use]
    pub fn progress_bar(&self) -> ProgressBar {
        self.progress_bar.clone()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.progress_bar.set_message(message.into());
    }

    fn ask_user(&self, label: &str, reason: &ItemFailure) -> FailureAction {
        let answer = self.progress_bar.suspend(|| {
            eprintln!(
                "{} {} - {}",
                style(t!("common.error_prefix")).red().bold(),
                label,
                reason
            );
            Confirm::new()
                .with_prompt(t!("progress.continue_prompt"))
                .default(true)
                .interact()
        });

        match answer {
            Ok(true) => FailureAction::Continue,
            Ok(false) => FailureAction::Abort,
            Err(e) => {
                warn!("無法取得使用者回應，中止批次: {e}");
                FailureAction::Abort
            }
        }
    }
}

impl<T: ItemLabel> ProgressSink<T> for TerminalProgress {
    fn on_progress(&mut self, completed: usize, _total: usize) {
        self.progress_bar.set_position(completed as u64);
    }

    fn on_item_failure(&mut self, item: &T, reason: &ItemFailure) -> FailureAction {
        let label = item.label();
        match self.policy {
            FailurePolicy::Continue => {
                self.progress_bar.println(format!(
                    "{} {} - {}",
                    style(t!("common.error_prefix")).red(),
                    label,
                    reason
                ));
                FailureAction::Continue
            }
            FailurePolicy::Abort => FailureAction::Abort,
            FailurePolicy::Ask => self.ask_user(&label, reason),
        }
    }
}
