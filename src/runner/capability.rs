use super::types::{FailureAction, ItemFailure, ProcessingOutcome};

/// 處理單一項目的能力
///
/// 每次呼叫彼此獨立；執行器保證同一時間只有一個項目在處理中
/// （設定逾時後被放棄的呼叫除外）。
pub trait ItemProcessor<T>: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn process(&self, item: &T) -> ProcessingOutcome<Self::Output>;
}

impl<T, O, F> ItemProcessor<T> for F
where
    F: Fn(&T) -> ProcessingOutcome<O> + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    type Output = O;

    fn process(&self, item: &T) -> ProcessingOutcome<O> {
        self(item)
    }
}

/// 接收進度與失敗通知
///
/// 回呼在背景執行緒上執行，需要時由呼叫端自行轉送到 UI 執行緒。
pub trait ProgressSink<T>: Send + 'static {
    fn on_progress(&mut self, completed: usize, total: usize);

    fn on_item_failure(&mut self, item: &T, reason: &ItemFailure) -> FailureAction;
}

/// 以兩個閉包組成的 [`ProgressSink`]
pub struct CallbackSink<P, F> {
    on_progress: P,
    on_item_failure: F,
}

impl<P, F> CallbackSink<P, F> {
    pub const fn new(on_progress: P, on_item_failure: F) -> Self {
        Self {
            on_progress,
            on_item_failure,
        }
    }
}

impl<T, P, F> ProgressSink<T> for CallbackSink<P, F>
where
    P: FnMut(usize, usize) + Send + 'static,
    F: FnMut(&T, &ItemFailure) -> FailureAction + Send + 'static,
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        (self.on_progress)(completed, total);
    }

    fn on_item_failure(&mut self, item: &T, reason: &ItemFailure) -> FailureAction {
        (self.on_item_failure)(item, reason)
    }
}
