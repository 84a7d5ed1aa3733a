//! 三個工作流程共用的互動流程：選擇路徑、執行批次、顯示結果

use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Config, FailurePolicy};
use crate::runner::{BatchReport, BatchRunner, BatchStatus, ItemProcessor, RunnerConfig};
use crate::tools::{ItemLabel, TerminalProgress, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 以歷史路徑清單或手動輸入取得資料夾；按 ESC 回傳 `None`
pub fn prompt_directory(config: &mut Config, prompt: &str) -> Result<Option<PathBuf>> {
    let recent_paths = config.settings.recent_paths.clone();

    let input = if recent_paths.is_empty() {
        Some(prompt_new_path(prompt)?)
    } else {
        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).is_dir() { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("common.new_path").to_string());

        println!("{}", style(t!("common.esc_hint")).dim());
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => None,
            Some(idx) if idx < recent_paths.len() => Some(recent_paths[idx].clone()),
            Some(_) => Some(prompt_new_path(prompt)?),
        }
    };

    let Some(input) = input else {
        return Ok(None);
    };

    let directory = PathBuf::from(&input);
    validate_directory_exists(&directory)?;

    add_recent_path(&mut config.settings, &input);
    if let Err(e) = save_settings(&config.settings) {
        warn!("無法儲存路徑歷史: {e}");
    }

    Ok(Some(directory))
}

fn prompt_new_path(prompt: &str) -> Result<String> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(path.trim().to_string())
}

/// 以目前設定啟動批次並等待結束，期間維持進度列更新
pub fn execute_batch<T, P>(
    runner_config: RunnerConfig,
    shutdown_signal: &Arc<AtomicBool>,
    name: &str,
    items: Vec<T>,
    processor: P,
    policy: FailurePolicy,
) -> Result<Arc<BatchReport<P::Output>>>
where
    T: ItemLabel + Send + Sync + 'static,
    P: ItemProcessor<T>,
{
    // 清除上一次批次留下的中斷信號
    shutdown_signal.store(false, Ordering::SeqCst);

    let sink = TerminalProgress::new(items.len(), policy);
    sink.set_message(t!("progress.running"));
    let progress_bar = sink.progress_bar();

    let handle = BatchRunner::new(runner_config)
        .with_name(name)
        .with_shutdown_signal(Arc::clone(shutdown_signal))
        .start(items, processor, sink)?;

    let report = loop {
        if let Some(report) = handle.wait_timeout(POLL_INTERVAL) {
            break report;
        }
        progress_bar.tick();
    };

    match report.status() {
        BatchStatus::AllSucceeded => progress_bar.finish_with_message(t!("progress.done").to_string()),
        BatchStatus::PartialFailure => {
            progress_bar.abandon_with_message(t!("progress.partial_failure").to_string());
        }
        BatchStatus::Cancelled => progress_bar.abandon_with_message(t!("progress.cancelled").to_string()),
    }

    Ok(report)
}

/// 顯示批次摘要與失敗清單；`labels[i]` 對應第 `i` 個項目
pub fn print_summary<O>(title: &str, report: &BatchReport<O>, labels: &[String]) {
    let not_attempted = report.total() - report.attempted();

    println!();
    println!("{}", style(title).cyan().bold());
    println!("  {} {}", t!("summary.total"), report.total());
    println!("  {} {}", t!("summary.succeeded"), style(report.succeeded()).green());
    if report.failed() > 0 {
        println!("  {} {}", t!("summary.failed"), style(report.failed()).red());
    }
    if not_attempted > 0 {
        println!("  {} {}", t!("summary.not_attempted"), style(not_attempted).yellow());
    }

    if report.failed() > 0 {
        println!();
        println!("{}", style(t!("summary.failures")).dim());
        for (index, reason) in report.failures() {
            let label = labels.get(index).map_or("?", String::as_str);
            println!("  {} {}: {}", style("•").dim(), label, reason);
        }
    }

    match report.status() {
        BatchStatus::AllSucceeded => println!("\n{}", style(t!("summary.all_succeeded")).green()),
        BatchStatus::PartialFailure => {
            println!("\n{}", style(t!("summary.partial_failure")).yellow());
        }
        BatchStatus::Cancelled => println!("\n{}", style(t!("summary.cancelled")).yellow()),
    }

    info!(
        "{title} - 成功: {}, 失敗: {}, 未處理: {not_attempted}",
        report.succeeded(),
        report.failed()
    );
}

/// 顯示檔案清單中的名稱
#[must_use]
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
