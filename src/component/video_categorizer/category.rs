use crate::runner::{ItemProcessor, ProcessingOutcome};
use crate::tools::{ItemLabel, ensure_directory_exists, get_video_info};
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const FALLBACK_CATEGORY: &str = "uncategorized";

/// 常見檔案系統不允許出現在資料夾名稱中的字元
static INVALID_FOLDER_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Invalid folder name pattern")
});

/// 由檔名（不含副檔名）決定分類資料夾名稱
#[must_use]
pub fn category_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let sanitized = INVALID_FOLDER_CHARS.replace_all(&stem, "_");
    let trimmed = sanitized.trim().trim_end_matches('.').trim_end();

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        FALLBACK_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 一筆分類工作：將 `source` 移動到 `<output_directory>/<分類>/<檔名>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizeJob {
    pub source: PathBuf,
    pub output_directory: PathBuf,
}

impl CategorizeJob {
    #[must_use]
    pub fn category(&self) -> String {
        category_for(&self.source)
    }

    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.output_directory
            .join(self.category())
            .join(self.source.file_name().unwrap_or_default())
    }
}

impl ItemLabel for CategorizeJob {
    fn label(&self) -> String {
        self.source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

#[must_use]
pub fn plan_categorization(files: &[PathBuf], output_directory: &Path) -> Vec<CategorizeJob> {
    files
        .iter()
        .map(|source| CategorizeJob {
            source: source.clone(),
            output_directory: output_directory.to_path_buf(),
        })
        .collect()
}

/// 依分類資料夾移動檔案
#[derive(Debug, Clone, Copy)]
pub struct FolderCategorizer {
    verify_readable: bool,
}

impl FolderCategorizer {
    #[must_use]
    pub const fn new(verify_readable: bool) -> Self {
        Self { verify_readable }
    }

    fn categorize(&self, job: &CategorizeJob) -> Result<PathBuf> {
        if !job.source.is_file() {
            bail!("來源檔案不存在: {}", job.source.display());
        }

        if self.verify_readable {
            let info = get_video_info(&job.source)?;
            info.ensure_playable()
                .with_context(|| format!("影片無法播放: {}", job.source.display()))?;
            debug!(
                "影片可讀取: {} ({}x{}, {:.1}s)",
                job.source.display(),
                info.width,
                info.height,
                info.duration_seconds
            );
        }

        let target_path = job.destination();
        if let Some(category_dir) = target_path.parent() {
            ensure_directory_exists(category_dir)?;
        }

        if target_path.exists() {
            bail!("目標檔案已存在: {}", target_path.display());
        }

        if let Err(e) = fs::rename(&job.source, &target_path) {
            // 可能是跨檔案系統，改用複製後刪除
            debug!("rename 失敗，改用複製: {e}");
            copy_and_delete(&job.source, &target_path)?;
        }

        debug!(
            "移動檔案: {} -> {}",
            job.source.display(),
            target_path.display()
        );
        Ok(target_path)
    }
}

impl ItemProcessor<CategorizeJob> for FolderCategorizer {
    type Output = PathBuf;

    fn process(&self, job: &CategorizeJob) -> ProcessingOutcome<PathBuf> {
        self.categorize(job).into()
    }
}

fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).with_context(|| {
        format!("複製檔案失敗: {} -> {}", source.display(), target.display())
    })?;

    if let Err(e) = fs::remove_file(source) {
        warn!("已複製但無法刪除原檔案 {}: {e}", source.display());
        return Err(e).with_context(|| format!("刪除原檔案失敗: {}", source.display()));
    }

    Ok(())
}
