//! 批次重新命名主模組

use super::rename_plan::{FileRenamer, RenameJob, plan_renames, rename_conflicts};
use crate::component::batch_session::{execute_batch, file_name_of, print_summary, prompt_directory};
use crate::config::Config;
use crate::config::save::save_settings;
use crate::tools::scan_video_files;
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use log::warn;
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct BatchRenamer {
    shutdown_signal: Arc<AtomicBool>,
}

impl BatchRenamer {
    pub const fn new(shutdown_signal: Arc<AtomicBool>) -> Self {
        Self { shutdown_signal }
    }

    pub fn run(&self, config: &mut Config) -> Result<()> {
        println!("{}", style(t!("renamer.title")).cyan().bold());

        let Some(directory) = prompt_directory(config, &t!("renamer.prompt_directory"))? else {
            return Ok(());
        };

        println!("{}", style(t!("common.scanning")).dim());
        let extensions = config.settings.renamer.extensions.clone();
        let video_files = scan_video_files(&directory, &extensions)?;

        if video_files.is_empty() {
            println!("{}", style(t!("common.no_videos")).yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(t!("common.found_videos", count = video_files.len())).green()
        );

        let prefix = self.prompt_prefix(&config.settings.renamer.last_prefix)?;
        let files: Vec<PathBuf> = video_files.into_iter().map(|f| f.path).collect();
        let jobs = plan_renames(&files, &prefix)?;

        self.display_preview(&jobs);

        let conflicts = rename_conflicts(&jobs);
        if !conflicts.is_empty() {
            self.display_conflicts(&conflicts);
            return Ok(());
        }

        if !self.confirm_rename()? {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        if config.settings.renamer.last_prefix != prefix {
            config.settings.renamer.last_prefix = prefix;
            if let Err(e) = save_settings(&config.settings) {
                warn!("無法儲存設定: {e}");
            }
        }

        let labels: Vec<String> = jobs.iter().map(|j| file_name_of(&j.source)).collect();
        let report = execute_batch(
            config.settings.runner_config(),
            &self.shutdown_signal,
            "renamer",
            jobs,
            FileRenamer,
            config.settings.renamer.failure_policy,
        )?;

        print_summary(&t!("renamer.summary_title"), &report, &labels);
        Ok(())
    }

    fn prompt_prefix(&self, last_prefix: &str) -> Result<String> {
        let prefix: String = Input::new()
            .with_prompt(t!("renamer.prompt_prefix"))
            .default(last_prefix.to_string())
            .validate_with(|input: &String| -> Result<(), String> {
                super::rename_plan::validate_prefix(input).map_err(|e| e.to_string())
            })
            .interact_text()?;
        Ok(prefix.trim().to_string())
    }

    fn confirm_rename(&self) -> Result<bool> {
        let confirmed = Confirm::new()
            .with_prompt(t!("renamer.confirm"))
            .default(false)
            .interact()?;
        Ok(confirmed)
    }

    fn display_preview(&self, jobs: &[RenameJob]) {
        println!();
        println!("{}", style(t!("renamer.preview")).cyan());
        for job in jobs {
            println!(
                "  {} {} {}",
                file_name_of(&job.source),
                style("→").dim(),
                style(file_name_of(&job.destination)).green()
            );
        }
        println!();
    }

    /// 列出目標已存在的項目；有衝突時不執行任何重新命名
    fn display_conflicts(&self, conflicts: &[&RenameJob]) {
        println!(
            "{}",
            style(t!("renamer.conflicts", count = conflicts.len())).red().bold()
        );
        for job in conflicts {
            println!(
                "  {} {} {}",
                file_name_of(&job.source),
                style("→").dim(),
                style(file_name_of(&job.destination)).red()
            );
        }
        println!("{}", style(t!("renamer.conflicts_hint")).yellow());
        warn!("重新命名目標已存在，共 {} 個，未執行重新命名", conflicts.len());
    }
}
