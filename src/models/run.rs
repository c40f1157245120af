use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Record;

/// How an error affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Session or credentials are no longer usable
    Fatal,
    /// The next iteration may well succeed
    Transient,
}

/// Poll loop state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopState {
    Running,
    StoppedByLimit,
    StoppedByError,
    StoppedBySignal,
    StoppedByExhaustion,
}

impl LoopState {
    /// Stop reason reported for a terminal state
    pub fn stop_reason(self) -> Option<StopReason> {
        match self {
            LoopState::Running => None,
            LoopState::StoppedByLimit => Some(StopReason::RequestLimit),
            LoopState::StoppedByError => Some(StopReason::FatalError),
            LoopState::StoppedBySignal => Some(StopReason::Signal),
            LoopState::StoppedByExhaustion => Some(StopReason::Exhausted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    RequestLimit,
    FatalError,
    Signal,
    SettingsFailed,
    Exhausted,
}

impl StopReason {
    /// Whether the run ended because something went wrong
    pub fn is_failure(self) -> bool {
        matches!(self, StopReason::FatalError | StopReason::SettingsFailed)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StopReason::RequestLimit => "request limit reached",
            StopReason::FatalError => "fatal error",
            StopReason::Signal => "interrupted",
            StopReason::SettingsFailed => "settings failed",
            StopReason::Exhausted => "no new profiles",
        };
        f.write_str(label)
    }
}

/// Counters owned by the poll loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub request_count: u32,
    pub last_error: Option<ErrorKind>,
    pub stopped: bool,
    pub records_persisted: usize,
    pub duplicates_skipped: usize,
}

/// Outcome of one run, from settings application to loop termination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub request_count: u32,
    pub stop_reason: StopReason,
    pub records_persisted: usize,
    pub duplicates_skipped: usize,
    pub last_error: Option<ErrorKind>,
    /// Human-readable cause for failure stops
    pub error: Option<String>,
    /// First few records persisted during the run
    pub sample: Vec<Record>,
}
