//! 工作流程整合測試 - 以暫存資料夾驗證重新命名、分類與壓縮

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use batch_video_tools::component::batch_renamer::{FileRenamer, plan_renames, rename_conflicts};
use batch_video_tools::component::video_categorizer::{
    FALLBACK_CATEGORY, FolderCategorizer, plan_categorization,
};
use batch_video_tools::component::video_compressor::{
    FfmpegTranscoder, TranscodeJob, plan_transcodes,
};
use batch_video_tools::config::CompressorSettings;
use batch_video_tools::runner::{
    BatchReport, BatchRunner, BatchStatus, CallbackSink, FailureAction, ItemFailure,
    ItemProcessor, RunState,
};
use batch_video_tools::tools::{command_available, get_video_info, scan_video_files};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn extensions() -> Vec<String> {
    ["mp4", "avi", "mov"].iter().map(|e| (*e).to_string()).collect()
}

/// 以固定的失敗處理方式執行批次並等待結果
fn run_batch<T, P>(items: Vec<T>, processor: P, action: FailureAction) -> BatchReport<P::Output>
where
    T: Send + Sync + 'static,
    P: ItemProcessor<T>,
    P::Output: Clone,
{
    let sink = CallbackSink::new(|_: usize, _: usize| {}, move |_: &T, _: &ItemFailure| action);
    let handle = BatchRunner::default().start(items, processor, sink).unwrap();
    (*handle.result()).clone()
}

fn scanned_paths(dir: &Path) -> Vec<PathBuf> {
    scan_video_files(dir, &extensions())
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect()
}

#[test]
fn test_renamer_e2e() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    touch(dir, "c.mp4", "third");
    touch(dir, "a.mp4", "first");
    touch(dir, "b.AVI", "second");
    touch(dir, "notes.txt", "not a video");

    let files = scanned_paths(dir);
    assert_eq!(files.len(), 3);

    let jobs = plan_renames(&files, "clip").unwrap();
    let report = run_batch(jobs, FileRenamer, FailureAction::Abort);

    assert_eq!(report.status(), BatchStatus::AllSucceeded);
    assert_eq!(fs::read_to_string(dir.join("clip1.mp4")).unwrap(), "first");
    assert_eq!(fs::read_to_string(dir.join("clip2.AVI")).unwrap(), "second");
    assert_eq!(fs::read_to_string(dir.join("clip3.mp4")).unwrap(), "third");
    assert!(!dir.join("a.mp4").exists());
    assert!(dir.join("notes.txt").exists());

    let outputs: Vec<_> = report.outcomes().iter().filter_map(|o| o.output()).collect();
    assert_eq!(outputs[0], &dir.join("clip1.mp4"));

    println!("✓ 批次重新命名測試通過");
}

#[test]
fn test_renamer_never_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    touch(dir, "a.mp4", "original a");
    touch(dir, "v1.mp4", "existing v1");

    let files = scanned_paths(dir);
    let jobs = plan_renames(&files, "v").unwrap();
    assert_eq!(jobs[0].destination, dir.join("v1.mp4"));
    assert_eq!(rename_conflicts(&jobs), vec![&jobs[0]]);

    let report = run_batch(jobs, FileRenamer, FailureAction::Abort);

    assert_eq!(report.state(), RunState::Aborted);
    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(report.attempted(), 1);
    assert_eq!(fs::read_to_string(dir.join("a.mp4")).unwrap(), "original a");
    assert_eq!(fs::read_to_string(dir.join("v1.mp4")).unwrap(), "existing v1");
    assert!(!dir.join("v2.mp4").exists());
}

#[test]
fn test_categorizer_e2e() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    touch(input_dir.path(), "a.mp4", "video a");
    touch(input_dir.path(), "b?c.mov", "video bc");
    touch(input_dir.path(), "..avi", "hidden");

    let files = scanned_paths(input_dir.path());
    let jobs = plan_categorization(&files, output_dir.path());
    let report = run_batch(jobs, FolderCategorizer::new(false), FailureAction::Continue);

    assert_eq!(report.status(), BatchStatus::AllSucceeded);

    let out = output_dir.path();
    assert_eq!(fs::read_to_string(out.join("a").join("a.mp4")).unwrap(), "video a");
    assert_eq!(fs::read_to_string(out.join("b_c").join("b?c.mov")).unwrap(), "video bc");
    assert!(out.join(FALLBACK_CATEGORY).join("..avi").exists());
    assert!(scanned_paths(input_dir.path()).is_empty());

    println!("✓ 影片分類測試通過");
}

#[test]
fn test_categorizer_continues_after_failure() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    touch(input_dir.path(), "a.mp4", "video a");
    touch(input_dir.path(), "b.mp4", "video b");

    // 目標已存在，第一個項目應失敗但不影響第二個
    fs::create_dir_all(output_dir.path().join("a")).unwrap();
    touch(&output_dir.path().join("a"), "a.mp4", "already here");

    let files = scanned_paths(input_dir.path());
    let jobs = plan_categorization(&files, output_dir.path());
    let report = run_batch(jobs, FolderCategorizer::new(false), FailureAction::Continue);

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert!(input_dir.path().join("a.mp4").exists());
    assert!(output_dir.path().join("b").join("b.mp4").exists());
    assert_eq!(
        fs::read_to_string(output_dir.path().join("a").join("a.mp4")).unwrap(),
        "already here"
    );
}

#[test]
fn test_categorizer_rejects_unreadable_video() {
    if !command_available("ffprobe") {
        println!("跳過測試：找不到 ffprobe");
        return;
    }

    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    touch(input_dir.path(), "broken.mp4", "not really a video");

    let files = scanned_paths(input_dir.path());
    let jobs = plan_categorization(&files, output_dir.path());
    let report = run_batch(jobs, FolderCategorizer::new(true), FailureAction::Continue);

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert!(input_dir.path().join("broken.mp4").exists());
    assert!(!output_dir.path().join("broken").join("broken.mp4").exists());
}

fn generate_test_video(path: &Path) -> bool {
    generate_test_video_with(path, "testsrc=duration=1:size=320x240:rate=10")
}

fn generate_test_video_with(path: &Path, source: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-y", "-f", "lavfi", "-i", source])
        .arg(path)
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn test_compressor_e2e() {
    if !command_available("ffmpeg") || !command_available("ffprobe") {
        println!("跳過測試：找不到 ffmpeg 或 ffprobe");
        return;
    }

    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    if !generate_test_video(&input_dir.path().join("sample.mp4")) {
        println!("跳過測試：無法產生測試影片");
        return;
    }
    touch(input_dir.path(), "broken.mp4", "not really a video");

    let settings = CompressorSettings {
        target_height: 120,
        preset: "ultrafast".to_string(),
        threads: 1,
        ..CompressorSettings::default()
    };

    let files = scanned_paths(input_dir.path());
    let jobs = plan_transcodes(&files, output_dir.path());
    let report = run_batch(jobs, FfmpegTranscoder::new(settings), FailureAction::Continue);

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(report.succeeded(), 1);

    // broken.mp4 排在 sample.mp4 之前
    assert!(report.outcomes()[0].failure_reason().is_some());
    assert!(!output_dir.path().join("broken.mp4").exists());

    let output = output_dir.path().join("sample.mp4");
    let info = get_video_info(&output).unwrap();
    assert_eq!(info.height, 120);
    assert_eq!(info.width, 160);

    println!("✓ 影片壓縮測試通過");
}

/// 產生較長的影片，讓壓縮不會在第一次輪詢前完成
fn long_video(dir: &Path) -> Option<PathBuf> {
    let path = dir.join("long.mp4");
    generate_test_video_with(&path, "testsrc=duration=60:size=640x480:rate=25").then_some(path)
}

#[test]
fn test_compressor_interrupted_by_shutdown_signal() {
    if !command_available("ffmpeg") {
        println!("跳過測試：找不到 ffmpeg");
        return;
    }

    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let Some(source) = long_video(input_dir.path()) else {
        println!("跳過測試：無法產生測試影片");
        return;
    };

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let transcoder = FfmpegTranscoder::new(CompressorSettings::default())
        .with_shutdown_signal(Arc::clone(&shutdown_signal));
    let jobs = plan_transcodes(&[source.clone(), source], output_dir.path());

    // 中斷信號在第一個項目執行中被設定，之後的項目不應開始
    let signal_clone = Arc::clone(&shutdown_signal);
    let trigger = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        signal_clone.store(true, Ordering::SeqCst);
    });

    let sink = CallbackSink::new(
        |_: usize, _: usize| {},
        |_: &TranscodeJob, _: &ItemFailure| FailureAction::Abort,
    );
    let handle = BatchRunner::default()
        .with_shutdown_signal(shutdown_signal)
        .start(jobs, transcoder, sink)
        .unwrap();
    let report = handle.result();
    trigger.join().unwrap();

    assert_eq!(report.status(), BatchStatus::Cancelled);
    assert_eq!(report.attempted(), 1);
    assert_eq!(report.outcomes()[0].failure_reason(), Some(&ItemFailure::Cancelled));
    assert!(!output_dir.path().join("long.mp4").exists());
}

#[test]
fn test_compressor_time_limit_stops_ffmpeg() {
    if !command_available("ffmpeg") {
        println!("跳過測試：找不到 ffmpeg");
        return;
    }

    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let Some(source) = long_video(input_dir.path()) else {
        println!("跳過測試：無法產生測試影片");
        return;
    };

    let settings = CompressorSettings {
        preset: "veryslow".to_string(),
        ..CompressorSettings::default()
    };
    let transcoder = FfmpegTranscoder::new(settings).with_time_limit(Some(Duration::from_millis(200)));
    let jobs = plan_transcodes(&[source], output_dir.path());
    let report = run_batch(jobs, transcoder, FailureAction::Continue);

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert!(report.outcomes()[0].failure_reason().unwrap().is_timeout());
    assert!(!output_dir.path().join("long.mp4").exists());
}
