//! 依序號產生新檔名並執行重新命名

use crate::runner::{ItemProcessor, ProcessingOutcome};
use crate::tools::ItemLabel;
use anyhow::{Result, bail};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 一筆重新命名工作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ItemLabel for RenameJob {
    fn label(&self) -> String {
        self.source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 檢查前綴可以作為檔名的一部分
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.trim().is_empty() {
        bail!("檔名前綴不可為空");
    }
    if prefix.contains(['/', '\\']) {
        bail!("檔名前綴不可包含路徑分隔符號: {prefix}");
    }
    Ok(())
}

/// `<prefix><n><ext>`，`n` 從 1 開始，副檔名沿用原檔
#[must_use]
pub fn new_file_name(source: &Path, prefix: &str, index: usize) -> String {
    match source.extension() {
        Some(ext) => format!("{prefix}{index}.{}", ext.to_string_lossy()),
        None => format!("{prefix}{index}"),
    }
}

/// 依輸入順序建立重新命名計畫，新檔案留在原資料夾
pub fn plan_renames(files: &[PathBuf], prefix: &str) -> Result<Vec<RenameJob>> {
    let prefix = prefix.trim();
    validate_prefix(prefix)?;

    Ok(files
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let parent = source.parent().unwrap_or_else(|| Path::new("."));
            RenameJob {
                source: source.clone(),
                destination: parent.join(new_file_name(source, prefix, i + 1)),
            }
        })
        .collect())
}

/// 目標檔名已被占用的工作
///
/// 重新命名依序執行且不覆蓋檔案，因此任何已存在的目標都會讓該項目失敗，
/// 即使占用者本身也在這批工作中。
#[must_use]
pub fn rename_conflicts(jobs: &[RenameJob]) -> Vec<&RenameJob> {
    jobs.iter().filter(|job| job.destination.exists()).collect()
}

/// 檔案重新命名能力；不覆蓋既有檔案
#[derive(Debug, Default, Clone, Copy)]
pub struct FileRenamer;

impl FileRenamer {
    fn rename(job: &RenameJob) -> Result<PathBuf> {
        if job.source == job.destination {
            bail!("新檔名與原檔名相同: {}", job.destination.display());
        }
        if !job.source.exists() {
            bail!("來源檔案不存在: {}", job.source.display());
        }
        if job.destination.exists() {
            bail!("目標檔案已存在: {}", job.destination.display());
        }

        fs::rename(&job.source, &job.destination).map_err(|e| {
            anyhow::anyhow!(
                "重新命名失敗 {} -> {}: {e}",
                job.source.display(),
                job.destination.display()
            )
        })?;

        debug!(
            "重新命名: {} -> {}",
            job.source.display(),
            job.destination.display()
        );
        Ok(job.destination.clone())
    }
}

impl ItemProcessor<RenameJob> for FileRenamer {
    type Output = PathBuf;

    fn process(&self, job: &RenameJob) -> ProcessingOutcome<PathBuf> {
        Self::rename(job).into()
    }
}
