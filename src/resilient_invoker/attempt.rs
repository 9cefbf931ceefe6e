use std::time::Duration;

/// How a single attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    FatalFailure,
}

/// Invocation state after an attempt. `Succeeded` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Attempting,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Attempting)
    }
}

/// Ephemeral record of one attempt, handed to the log and to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based, never above the configured maximum
    pub number: usize,
    pub outcome: AttemptOutcome,
    /// Set only for retryable failures that still have attempts left
    pub delay_before_next: Option<Duration>,
}

impl Attempt {
    pub(super) fn succeeded(number: usize) -> Self {
        Self {
            number,
            outcome: AttemptOutcome::Success,
            delay_before_next: None,
        }
    }

    pub(super) fn fatal(number: usize) -> Self {
        Self {
            number,
            outcome: AttemptOutcome::FatalFailure,
            delay_before_next: None,
        }
    }

    pub(super) fn retryable(number: usize, delay_before_next: Option<Duration>) -> Self {
        Self {
            number,
            outcome: AttemptOutcome::RetryableFailure,
            delay_before_next,
        }
    }

    /// The phase this attempt moves the invocation into.
    pub fn next_phase(&self) -> Phase {
        match self.outcome {
            AttemptOutcome::Success => Phase::Succeeded,
            AttemptOutcome::FatalFailure => Phase::Failed,
            AttemptOutcome::RetryableFailure if self.delay_before_next.is_some() => {
                Phase::Attempting
            }
            AttemptOutcome::RetryableFailure => Phase::Failed,
        }
    }
}
