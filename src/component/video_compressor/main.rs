use super::transcoder::{FfmpegTranscoder, plan_transcodes};
use crate::component::batch_session::{execute_batch, file_name_of, print_summary, prompt_directory};
use crate::config::Config;
use crate::runner::RunnerConfig;
use crate::tools::{
    command_available, ensure_directory_exists, format_size_mb, scan_video_files, total_size,
    validate_distinct_directories,
};
use anyhow::{Result, bail};
use console::style;
use dialoguer::{Confirm, Input};
use log::{info, warn};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct VideoCompressor {
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoCompressor {
    pub const fn new(shutdown_signal: Arc<AtomicBool>) -> Self {
        Self { shutdown_signal }
    }

    pub fn run(&self, config: &mut Config) -> Result<()> {
        println!("{}", style(t!("compressor.title")).cyan().bold());

        if !command_available("ffmpeg") {
            bail!("{}", t!("compressor.ffmpeg_missing"));
        }

        let Some(input_directory) =
            prompt_directory(config, &t!("compressor.prompt_input_directory"))?
        else {
            return Ok(());
        };

        println!("{}", style(t!("common.scanning")).dim());
        let video_files = scan_video_files(&input_directory, &config.settings.compressor.extensions)?;

        if video_files.is_empty() {
            println!("{}", style(t!("common.no_videos")).yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(t!("common.found_videos", count = video_files.len())).green()
        );
        for (index, file) in video_files.iter().enumerate() {
            println!(
                "  {}. {} ({})",
                index + 1,
                file_name_of(&file.path),
                format_size_mb(file.size)
            );
        }

        let files: Vec<PathBuf> = video_files.into_iter().map(|f| f.path).collect();
        let initial_size = total_size(&files)?;
        println!(
            "\n{} {}",
            t!("compressor.initial_size"),
            style(format_size_mb(initial_size)).cyan()
        );

        let output_directory = self.prompt_output_directory()?;
        ensure_directory_exists(&output_directory)?;
        validate_distinct_directories(&input_directory, &output_directory)?;

        let settings = config.settings.compressor.clone();
        println!(
            "{}",
            style(t!(
                "compressor.parameters",
                height = settings.target_height,
                codec = &settings.codec,
                preset = &settings.preset,
                bitrate = &settings.bitrate,
                threads = settings.threads
            ))
            .dim()
        );

        if !self.confirm_start()? {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        let jobs = plan_transcodes(&files, &output_directory);
        let labels: Vec<String> = jobs.iter().map(|j| file_name_of(&j.source)).collect();
        // 時限由轉檔器自行執行，逾時會終止 ffmpeg 而不是留在背景
        let transcoder = FfmpegTranscoder::new(settings.clone())
            .with_time_limit(config.settings.runner_config().per_item_timeout)
            .with_shutdown_signal(Arc::clone(&self.shutdown_signal));
        let report = execute_batch(
            RunnerConfig::default(),
            &self.shutdown_signal,
            "compressor",
            jobs,
            transcoder,
            settings.failure_policy,
        )?;

        print_summary(&t!("compressor.summary_title"), &report, &labels);

        let outputs: Vec<PathBuf> = report
            .outcomes()
            .iter()
            .filter_map(|o| o.output().cloned())
            .collect();
        if !outputs.is_empty() {
            match total_size(&outputs) {
                Ok(final_size) => {
                    println!(
                        "{} {}",
                        t!("compressor.final_size"),
                        style(format_size_mb(final_size)).green()
                    );
                    info!("壓縮前: {initial_size} bytes, 壓縮後: {final_size} bytes");
                }
                Err(e) => warn!("無法計算壓縮後大小: {e:#}"),
            }
        }

        Ok(())
    }

    fn prompt_output_directory(&self) -> Result<PathBuf> {
        let path: String = Input::new()
            .with_prompt(t!("compressor.prompt_output_directory"))
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    fn confirm_start(&self) -> Result<bool> {
        let confirmed = Confirm::new()
            .with_prompt(t!("compressor.confirm"))
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}
