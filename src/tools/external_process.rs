use anyhow::{Context, Result};
use log::warn;
use std::io::Read;
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 外部程序的結束方式
#[derive(Debug)]
pub enum ProcessExit {
    Finished { status: ExitStatus, stderr: String },
    /// 超過時限，程序已被終止
    TimedOut(Duration),
    /// 收到中斷信號，程序已被終止
    Interrupted,
}

/// 啟動外部程序並輪詢到結束
///
/// 超過 `time_limit` 或 `shutdown_signal` 被設定時，會終止並回收程序，
/// 因此函式返回後不會留下仍在執行的子程序。
pub fn run_supervised(
    command: &mut Command,
    time_limit: Option<Duration>,
    shutdown_signal: Option<&AtomicBool>,
) -> Result<ProcessExit> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("無法啟動外部程序: {:?}", command.get_program()))?;
    let stderr_reader = spawn_stderr_reader(child.stderr.take());
    let started = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stderr = stderr_reader
                    .and_then(|handle| handle.join().ok())
                    .unwrap_or_default();
                return Ok(ProcessExit::Finished { status, stderr });
            }
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                return Err(e).context("無法檢查程序狀態");
            }
        }

        if shutdown_signal.is_some_and(|signal| signal.load(Ordering::SeqCst)) {
            terminate(&mut child);
            return Ok(ProcessExit::Interrupted);
        }

        if let Some(limit) = time_limit {
            if started.elapsed() >= limit {
                terminate(&mut child);
                return Ok(ProcessExit::TimedOut(limit));
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn terminate(child: &mut Child) {
    let pid = child.id();
    warn!("終止程序 [{pid}]");
    if let Err(e) = child.kill() {
        warn!("無法終止程序 [{pid}]: {e}");
    }
    let _ = child.wait();
}

/// 持續讀取 stderr，避免管線塞滿造成子程序阻塞
fn spawn_stderr_reader(stderr: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    let mut stderr = stderr?;
    Some(thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = stderr.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).to_string()
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_finished_collects_stderr() {
        let exit = run_supervised(
            Command::new("sh").args(["-c", "echo broken >&2; exit 3"]),
            None,
            None,
        )
        .unwrap();

        match exit {
            ProcessExit::Finished { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected exit: {other:?}"),
        }
    }

    #[test]
    fn test_time_limit_kills_process() {
        let started = Instant::now();
        let exit = run_supervised(
            Command::new("sleep").arg("30"),
            Some(Duration::from_millis(200)),
            None,
        )
        .unwrap();

        assert!(matches!(exit, ProcessExit::TimedOut(limit) if limit == Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_shutdown_signal_kills_process() {
        let shutdown_signal = AtomicBool::new(true);
        let started = Instant::now();
        let exit = run_supervised(
            Command::new("sleep").arg("30"),
            None,
            Some(&shutdown_signal),
        )
        .unwrap();

        assert!(matches!(exit, ProcessExit::Interrupted));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_program_is_error() {
        let result = run_supervised(&mut Command::new("definitely-not-a-real-program"), None, None);
        assert!(result.is_err());
    }
}
