use crate::config::CompressorSettings;
use crate::runner::{ItemFailure, ItemProcessor, ProcessingOutcome};
use crate::tools::{FfmpegCommand, ItemLabel, ProcessExit, ensure_directory_exists, run_supervised};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// stderr 只保留最後幾行，避免失敗訊息過長
const MAX_ERROR_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ItemLabel for TranscodeJob {
    fn label(&self) -> String {
        self.source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 輸出檔名與來源相同，放在輸出資料夾
#[must_use]
pub fn plan_transcodes(files: &[PathBuf], output_directory: &Path) -> Vec<TranscodeJob> {
    files
        .iter()
        .map(|source| TranscodeJob {
            source: source.clone(),
            destination: output_directory.join(source.file_name().unwrap_or_default()),
        })
        .collect()
}

/// 以 ffmpeg 縮放並重新編碼
///
/// ffmpeg 在子程序執行；超過時限或收到中斷信號時會終止該程序並刪除未完成的輸出。
pub struct FfmpegTranscoder {
    settings: CompressorSettings,
    time_limit: Option<Duration>,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl FfmpegTranscoder {
    #[must_use]
    pub const fn new(settings: CompressorSettings) -> Self {
        Self {
            settings,
            time_limit: None,
            shutdown_signal: None,
        }
    }

    /// 單一影片的壓縮時限；`None` 表示不限制
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    fn transcode(&self, job: &TranscodeJob) -> Result<PathBuf, ItemFailure> {
        if let Some(parent) = job.destination.parent() {
            ensure_directory_exists(parent)?;
        }

        let ffmpeg_cmd = FfmpegCommand::new(&job.source, &job.destination, &self.settings);
        info!(
            "開始壓縮: {} -> {}",
            job.source.display(),
            ffmpeg_cmd.destination_path().display()
        );

        let exit = run_supervised(
            &mut ffmpeg_cmd.build_command(),
            self.time_limit,
            self.shutdown_signal.as_deref(),
        )?;

        match exit {
            ProcessExit::Finished { status, .. } if status.success() && job.destination.exists() => {
                info!("壓縮完成: {}", job.destination.display());
                Ok(job.destination.clone())
            }
            ProcessExit::Finished { status, stderr } => {
                Self::remove_partial_output(&job.destination);
                Err(ItemFailure::new(format!(
                    "ffmpeg 失敗 ({status}): {}",
                    tail_lines(&stderr, MAX_ERROR_LINES)
                )))
            }
            ProcessExit::TimedOut(limit) => {
                warn!("壓縮逾時 ({limit:?}): {}", job.source.display());
                Self::remove_partial_output(&job.destination);
                Err(ItemFailure::Timeout(limit))
            }
            ProcessExit::Interrupted => {
                warn!("壓縮已中斷: {}", job.source.display());
                Self::remove_partial_output(&job.destination);
                Err(ItemFailure::Cancelled)
            }
        }
    }

    fn remove_partial_output(destination: &Path) {
        if destination.exists() {
            match fs::remove_file(destination) {
                Ok(()) => info!("已刪除失敗的輸出檔案: {}", destination.display()),
                Err(e) => warn!("無法刪除失敗的輸出檔案 {}: {e}", destination.display()),
            }
        }
    }
}

impl ItemProcessor<TranscodeJob> for FfmpegTranscoder {
    type Output = PathBuf;

    fn process(&self, job: &TranscodeJob) -> ProcessingOutcome<PathBuf> {
        match self.transcode(job) {
            Ok(output) => ProcessingOutcome::Success(output),
            Err(reason) => ProcessingOutcome::Failure(reason),
        }
    }
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.is_empty() {
        return "未知錯誤".to_string();
    }
    lines[lines.len().saturating_sub(count)..].join("\n")
}
