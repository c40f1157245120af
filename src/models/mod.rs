// Model exports
pub mod domain;
pub mod responses;
pub mod run;

pub use domain::{GenderInterest, Preferences, PreferencesError, Record, MIN_DISCOVERY_AGE};
pub use responses::{PhotoDescriptor, RawProfile, RecEnvelope};
pub use run::{ErrorKind, LoopState, RunState, RunSummary, StopReason};
