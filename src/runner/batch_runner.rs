use super::capability::{ItemProcessor, ProgressSink};
use super::handle::{BatchHandle, Control};
use super::types::{
    BatchReport, FailureAction, ItemFailure, ProcessingOutcome, RunState, RunnerConfig, RunnerError,
};
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const DEFAULT_WORKER_NAME: &str = "batch-worker";

/// 依序處理項目的批次執行器
pub struct BatchRunner {
    config: RunnerConfig,
    name: String,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl BatchRunner {
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            name: DEFAULT_WORKER_NAME.to_string(),
            shutdown_signal: None,
        }
    }

    /// 背景執行緒名稱，也用於日誌
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 額外觀察外部的中斷信號（例如 Ctrl-C），效果等同 `cancel()`
    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    /// 在背景執行緒啟動批次並立即返回
    pub fn start<T, P, S>(
        &self,
        items: Vec<T>,
        processor: P,
        sink: S,
    ) -> Result<BatchHandle<P::Output>, RunnerError>
    where
        T: Send + Sync + 'static,
        P: ItemProcessor<T>,
        S: ProgressSink<T>,
    {
        if items.is_empty() {
            return Err(RunnerError::EmptyBatch);
        }

        let control = Arc::new(Control::new());
        let worker = Worker {
            items: items.into_iter().map(Arc::new).collect(),
            processor: Arc::new(processor),
            sink,
            control: Arc::clone(&control),
            shutdown_signal: self.shutdown_signal.clone(),
            per_item_timeout: self.config.per_item_timeout,
            name: self.name.clone(),
        };

        thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || worker.run())?;

        Ok(BatchHandle::new(control))
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

struct Worker<T, P: ItemProcessor<T>, S> {
    items: Vec<Arc<T>>,
    processor: Arc<P>,
    sink: S,
    control: Arc<Control<P::Output>>,
    shutdown_signal: Option<Arc<AtomicBool>>,
    per_item_timeout: Option<Duration>,
    name: String,
}

impl<T, P, S> Worker<T, P, S>
where
    T: Send + Sync + 'static,
    P: ItemProcessor<T>,
    S: ProgressSink<T>,
{
    fn run(mut self) {
        let total = self.items.len();
        self.control.set_running();
        info!("開始批次工作 [{}]，共 {} 個項目", self.name, total);

        let mut outcomes = Vec::with_capacity(total);
        // 回呼若 panic，仍須產生結果，否則 result() 會永遠阻塞
        let state = panic::catch_unwind(AssertUnwindSafe(|| self.drive(&mut outcomes)))
            .unwrap_or_else(|payload| {
                error!(
                    "批次工作 [{}] 的回呼發生 panic: {}",
                    self.name,
                    panic_message(payload.as_ref())
                );
                RunState::Aborted
            });

        let report = BatchReport::finalize(outcomes, total, state);
        info!(
            "批次工作結束 [{}]: {:?} - 成功: {}, 失敗: {}, 未處理: {}",
            self.name,
            report.state(),
            report.succeeded(),
            report.failed(),
            total - report.attempted()
        );
        self.control.finish(report);
    }

    fn drive(&mut self, outcomes: &mut Vec<ProcessingOutcome<P::Output>>) -> RunState {
        let total = self.items.len();

        for (index, item) in self.items.iter().enumerate() {
            if self.is_cancelled() {
                warn!("批次工作 [{}] 已取消，剩餘 {} 個項目未處理", self.name, total - index);
                return RunState::Cancelled;
            }

            debug!("處理項目 {}/{} [{}]", index + 1, total, self.name);
            outcomes.push(self.process_item(item));

            // 先記錄結果再通知回呼，回呼 panic 時結果仍保留
            let action = match outcomes.last() {
                Some(ProcessingOutcome::Failure(reason)) if self.is_cancelled() => {
                    // 取消期間的失敗（例如外部程序被中斷）不詢問使用者
                    warn!("項目 {}/{} 在取消期間結束 [{}]: {}", index + 1, total, self.name, reason);
                    self.sink.on_progress(index + 1, total);
                    return RunState::Cancelled;
                }
                Some(ProcessingOutcome::Failure(reason)) => {
                    warn!("項目 {}/{} 失敗 [{}]: {}", index + 1, total, self.name, reason);
                    self.sink.on_item_failure(item, reason)
                }
                _ => FailureAction::Continue,
            };

            self.sink.on_progress(index + 1, total);

            if action == FailureAction::Abort {
                warn!("批次工作 [{}] 因項目 {} 失敗而中止", self.name, index + 1);
                return RunState::Aborted;
            }
        }

        RunState::Completed
    }

    fn is_cancelled(&self) -> bool {
        self.control.is_cancel_requested()
            || self
                .shutdown_signal
                .as_ref()
                .is_some_and(|signal| signal.load(Ordering::SeqCst))
    }

    fn process_item(&self, item: &Arc<T>) -> ProcessingOutcome<P::Output> {
        match self.per_item_timeout {
            None => invoke(&*self.processor, &**item),
            Some(timeout) => self.process_with_timeout(item, timeout),
        }
    }

    /// 在獨立執行緒處理項目；逾時後放棄等待，該執行緒會被分離
    fn process_with_timeout(&self, item: &Arc<T>, timeout: Duration) -> ProcessingOutcome<P::Output> {
        let (tx, rx) = mpsc::channel();
        let processor = Arc::clone(&self.processor);
        let item = Arc::clone(item);

        let spawned = thread::Builder::new()
            .name(format!("{}-item", self.name))
            .spawn(move || {
                let _ = tx.send(invoke(&*processor, &*item));
            });

        if let Err(e) = spawned {
            return ProcessingOutcome::failure(format!("無法啟動處理執行緒: {e}"));
        }

        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!("項目處理逾時 ({timeout:?}) [{}]", self.name);
                ProcessingOutcome::Failure(ItemFailure::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => ProcessingOutcome::Failure(
                ItemFailure::Panicked("處理執行緒意外結束".to_string()),
            ),
        }
    }
}

fn invoke<T, P: ItemProcessor<T>>(processor: &P, item: &T) -> ProcessingOutcome<P::Output> {
    panic::catch_unwind(AssertUnwindSafe(|| processor.process(item))).unwrap_or_else(|payload| {
        ProcessingOutcome::Failure(ItemFailure::Panicked(panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CallbackSink;

    #[test]
    fn test_panic_message_from_str() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn test_panic_message_from_string() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("{} {}", "formatted", 42) }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 42");
    }

    #[test]
    fn test_start_rejects_empty_batch() {
        let runner = BatchRunner::default();
        let result = runner.start(
            Vec::<u32>::new(),
            |_: &u32| ProcessingOutcome::Success(()),
            CallbackSink::new(
                |_: usize, _: usize| {},
                |_: &u32, _: &ItemFailure| FailureAction::Continue,
            ),
        );
        assert!(matches!(result, Err(RunnerError::EmptyBatch)));
    }
}
