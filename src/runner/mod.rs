//! 通用批次執行器
//!
//! 在背景執行緒依序處理項目，回報進度、收集每個項目的結果，
//! 並支援協作式取消與單一項目逾時。

mod batch_runner;
mod capability;
mod handle;
mod types;

pub use batch_runner::BatchRunner;
pub use capability::{CallbackSink, ItemProcessor, ProgressSink};
pub use handle::BatchHandle;
pub use types::{
    BatchReport, BatchStatus, FailureAction, ItemFailure, ProcessingOutcome, RunState,
    RunnerConfig, RunnerError,
};
