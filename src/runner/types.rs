use std::io;
use std::time::Duration;
use thiserror::Error;

/// 單一項目失敗的原因
///
/// 失敗只是資料，會記錄在 [`BatchReport`] 中，不會中斷整個批次。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemFailure {
    #[error("{0}")]
    Error(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("processor panicked: {0}")]
    Panicked(String),
    /// 處理途中收到取消要求而放棄
    #[error("cancelled")]
    Cancelled,
}

impl ItemFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<anyhow::Error> for ItemFailure {
    fn from(error: anyhow::Error) -> Self {
        Self::Error(format!("{error:#}"))
    }
}

/// 每個項目恰好產生一個結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome<O> {
    Success(O),
    Failure(ItemFailure),
}

impl<O> ProcessingOutcome<O> {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(ItemFailure::new(reason))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn output(&self) -> Option<&O> {
        match self {
            Self::Success(output) => Some(output),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&ItemFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

impl<O> From<anyhow::Result<O>> for ProcessingOutcome<O> {
    fn from(result: anyhow::Result<O>) -> Self {
        match result {
            Ok(output) => Self::Success(output),
            Err(e) => Self::Failure(e.into()),
        }
    }
}

/// 項目失敗後要繼續還是中止
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Continue,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    AllSucceeded,
    PartialFailure,
    Cancelled,
}

/// `Idle -> Running -> {Completed, Cancelled, Aborted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Aborted,
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Aborted)
    }
}

/// 批次執行結果
///
/// 執行結束時才建立，之後不可變更。`outcomes[i]` 對應第 `i` 個輸入項目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<O> {
    outcomes: Vec<ProcessingOutcome<O>>,
    total: usize,
    state: RunState,
    status: BatchStatus,
}

impl<O> BatchReport<O> {
    pub(crate) fn finalize(outcomes: Vec<ProcessingOutcome<O>>, total: usize, state: RunState) -> Self {
        debug_assert!(state.is_terminal());
        debug_assert!(outcomes.len() <= total);

        let has_failure = outcomes.iter().any(|o| !o.is_success());
        let status = match state {
            RunState::Cancelled => BatchStatus::Cancelled,
            RunState::Completed if !has_failure => BatchStatus::AllSucceeded,
            _ => BatchStatus::PartialFailure,
        };

        Self {
            outcomes,
            total,
            state,
            status,
        }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[ProcessingOutcome<O>] {
        &self.outcomes
    }

    #[must_use]
    pub const fn status(&self) -> BatchStatus {
        self.status
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// 所有項目都已嘗試處理
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed && self.outcomes.len() == self.total
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// 失敗項目的索引與原因
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ItemFailure)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.failure_reason().map(|reason| (index, reason)))
    }
}

/// 執行器設定
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerConfig {
    /// 單一項目的處理時限；`None` 表示不限制
    pub per_item_timeout: Option<Duration>,
}

impl RunnerConfig {
    #[must_use]
    pub const fn with_per_item_timeout(mut self, timeout: Duration) -> Self {
        self.per_item_timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("batch must contain at least one item")]
    EmptyBatch,
    #[error("failed to spawn batch worker: {0}")]
    Spawn(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_all_succeeded() {
        let report: BatchReport<()> = BatchReport::finalize(
            vec![ProcessingOutcome::Success(()), ProcessingOutcome::Success(())],
            2,
            RunState::Completed,
        );
        assert_eq!(report.status(), BatchStatus::AllSucceeded);
        assert!(report.is_completed());
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_status_completed_with_failure() {
        let report: BatchReport<()> = BatchReport::finalize(
            vec![ProcessingOutcome::Success(()), ProcessingOutcome::failure("x")],
            2,
            RunState::Completed,
        );
        assert_eq!(report.status(), BatchStatus::PartialFailure);
        assert_eq!(report.failures().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_status_aborted_is_partial_failure() {
        let report: BatchReport<()> =
            BatchReport::finalize(vec![ProcessingOutcome::failure("x")], 3, RunState::Aborted);
        assert_eq!(report.status(), BatchStatus::PartialFailure);
        assert!(!report.is_completed());
        assert_eq!(report.attempted(), 1);
    }

    #[test]
    fn test_status_cancelled_wins_over_failures() {
        let report: BatchReport<()> =
            BatchReport::finalize(vec![ProcessingOutcome::failure("x")], 3, RunState::Cancelled);
        assert_eq!(report.status(), BatchStatus::Cancelled);
    }

    #[test]
    fn test_outcome_from_anyhow() {
        let outcome: ProcessingOutcome<u32> = Err(anyhow::anyhow!("boom")).into();
        assert_eq!(outcome.failure_reason(), Some(&ItemFailure::new("boom")));

        let outcome: ProcessingOutcome<u32> = Ok(7).into();
        assert_eq!(outcome.output(), Some(&7));
    }

    #[test]
    fn test_item_failure_display() {
        assert_eq!(ItemFailure::new("disk full").to_string(), "disk full");
        assert!(ItemFailure::Timeout(Duration::from_secs(2)).is_timeout());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
        assert!(RunState::Aborted.is_terminal());
    }
}
