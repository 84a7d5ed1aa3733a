use super::types::{BatchReport, RunState};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Shared<O> {
    state: RunState,
    report: Option<Arc<BatchReport<O>>>,
}

/// 背景工作與呼叫端之間共用的控制區塊
pub(crate) struct Control<O> {
    cancel_requested: AtomicBool,
    shared: Mutex<Shared<O>>,
    finished: Condvar,
}

impl<O> Control<O> {
    pub(crate) fn new() -> Self {
        Self {
            cancel_requested: AtomicBool::new(false),
            shared: Mutex::new(Shared {
                state: RunState::Idle,
                report: None,
            }),
            finished: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<O>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self) {
        let mut shared = self.lock();
        if shared.state == RunState::Idle {
            shared.state = RunState::Running;
        }
    }

    /// 寫入最終結果並喚醒所有等待者；只有第一次呼叫有效
    pub(crate) fn finish(&self, report: BatchReport<O>) {
        let mut shared = self.lock();
        if shared.state.is_terminal() {
            return;
        }
        shared.state = report.state();
        shared.report = Some(Arc::new(report));
        drop(shared);
        self.finished.notify_all();
    }
}

/// 執行中批次的操作介面
///
/// `cancel()` 與 `result()` 是唯一可跨執行緒安全呼叫的入口。
pub struct BatchHandle<O> {
    control: Arc<Control<O>>,
}

impl<O> BatchHandle<O> {
    pub(crate) const fn new(control: Arc<Control<O>>) -> Self {
        Self { control }
    }

    /// 要求取消；在下一個項目開始前生效，不會中斷處理中的項目。
    /// 批次已結束時不做任何事。
    pub fn cancel(&self) {
        if self.state().is_terminal() {
            return;
        }
        self.control.cancel_requested.store(true, Ordering::SeqCst);
        debug!("已要求取消批次工作");
    }

    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.control.is_cancel_requested()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.control.lock().state
    }

    /// 阻塞直到批次結束
    #[must_use]
    pub fn result(&self) -> Arc<BatchReport<O>> {
        let mut shared = self.control.lock();
        loop {
            if let Some(report) = &shared.report {
                return Arc::clone(report);
            }
            shared = self
                .control
                .finished
                .wait(shared)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// 不阻塞地查詢結果
    #[must_use]
    pub fn try_result(&self) -> Option<Arc<BatchReport<O>>> {
        self.control.lock().report.clone()
    }

    /// 最多等待 `timeout`，讓呼叫端的事件迴圈保持回應
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Arc<BatchReport<O>>> {
        let shared = self.control.lock();
        let (shared, _) = self
            .control
            .finished
            .wait_timeout_while(shared, timeout, |s| s.report.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        shared.report.clone()
    }
}
