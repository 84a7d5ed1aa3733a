use super::category::{FolderCategorizer, plan_categorization};
use crate::component::batch_session::{execute_batch, file_name_of, print_summary, prompt_directory};
use crate::config::Config;
use crate::tools::{command_available, ensure_directory_exists, scan_video_files};
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use log::warn;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct VideoCategorizer {
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoCategorizer {
    pub const fn new(shutdown_signal: Arc<AtomicBool>) -> Self {
        Self { shutdown_signal }
    }

    pub fn run(&self, config: &mut Config) -> Result<()> {
        println!("{}", style(t!("categorizer.title")).cyan().bold());

        let Some(input_directory) =
            prompt_directory(config, &t!("categorizer.prompt_input_directory"))?
        else {
            return Ok(());
        };

        println!("{}", style(t!("common.scanning")).dim());
        let video_files =
            scan_video_files(&input_directory, &config.settings.categorizer.extensions)?;

        if video_files.is_empty() {
            println!("{}", style(t!("common.no_videos")).yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(t!("common.found_videos", count = video_files.len())).green()
        );

        let output_directory = self.prompt_output_directory(&input_directory)?;
        ensure_directory_exists(&output_directory)?;

        let files: Vec<PathBuf> = video_files.into_iter().map(|f| f.path).collect();
        let jobs = plan_categorization(&files, &output_directory);

        println!();
        for job in &jobs {
            println!(
                "  {} {} {}",
                file_name_of(&job.source),
                style("→").dim(),
                style(job.category()).cyan()
            );
        }
        println!();

        if !self.confirm_start()? {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        let mut verify_readable = config.settings.categorizer.verify_readable;
        if verify_readable && !command_available("ffprobe") {
            warn!("找不到 ffprobe，略過影片可讀性檢查");
            println!("{}", style(t!("categorizer.ffprobe_missing")).yellow());
            verify_readable = false;
        }

        let labels: Vec<String> = jobs.iter().map(|j| file_name_of(&j.source)).collect();
        let report = execute_batch(
            config.settings.runner_config(),
            &self.shutdown_signal,
            "categorizer",
            jobs,
            FolderCategorizer::new(verify_readable),
            config.settings.categorizer.failure_policy,
        )?;

        print_summary(&t!("categorizer.summary_title"), &report, &labels);
        Ok(())
    }

    /// 預設輸出到輸入資料夾本身
    fn prompt_output_directory(&self, input_directory: &Path) -> Result<PathBuf> {
        let path: String = Input::new()
            .with_prompt(t!("categorizer.prompt_output_directory"))
            .default(input_directory.display().to_string())
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn confirm_start(&self) -> Result<bool> {
        let confirmed = Confirm::new()
            .with_prompt(t!("categorizer.confirm"))
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}
