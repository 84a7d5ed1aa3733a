use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 副檔名比對（不分大小寫，清單中的副檔名不含 `.`）
#[must_use]
pub fn is_video_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// 掃描資料夾第一層的影片檔案，依檔名排序
pub fn scan_video_files(directory: &Path, extensions: &[String]) -> Result<Vec<VideoFileInfo>> {
    let mut video_files: Vec<VideoFileInfo> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_video_file(entry.path(), extensions))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(VideoFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            })
        })
        .collect();

    video_files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(video_files)
}

/// 平行加總檔案大小
pub fn total_size(paths: &[PathBuf]) -> Result<u64> {
    paths
        .par_iter()
        .map(|path| {
            fs::metadata(path)
                .map(|m| m.len())
                .with_context(|| format!("無法取得檔案大小: {}", path.display()))
        })
        .sum()
}

#[must_use]
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_is_video_file_case_insensitive() {
        let extensions = exts(&["mp4", "mkv"]);
        assert!(is_video_file(Path::new("/a/clip.MP4"), &extensions));
        assert!(is_video_file(Path::new("/a/clip.mkv"), &extensions));
        assert!(!is_video_file(Path::new("/a/clip.txt"), &extensions));
        assert!(!is_video_file(Path::new("/a/mp4"), &extensions));
    }

    #[test]
    fn test_scan_video_files_top_level_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("b.mp4"), "bb").unwrap();
        fs::write(base.join("a.mov"), "a").unwrap();
        fs::write(base.join("notes.txt"), "x").unwrap();
        fs::create_dir(base.join("nested")).unwrap();
        fs::write(base.join("nested/c.mp4"), "ccc").unwrap();

        let files = scan_video_files(base, &exts(&["mp4", "mov"])).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.mov", "b.mp4"]);
        assert_eq!(files[1].size, 2);
    }

    #[test]
    fn test_total_size() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.bin");
        let b = temp_dir.path().join("b.bin");
        fs::write(&a, vec![0u8; 100]).unwrap();
        fs::write(&b, vec![0u8; 23]).unwrap();

        assert_eq!(total_size(&[a, b]).unwrap(), 123);
        assert!(total_size(&[temp_dir.path().join("missing")]).is_err());
    }

    #[test]
    fn test_format_size_mb() {
        assert_eq!(format_size_mb(1024 * 1024), "1.00 MB");
        assert_eq!(format_size_mb(0), "0.00 MB");
    }
}
