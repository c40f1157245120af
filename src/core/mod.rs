// Core engine exports
pub mod age;
pub mod dedup;
pub mod extractor;
pub mod poll;
pub mod runner;
pub mod settings;

pub use age::{age_from_birth_date, age_on, parse_birth_date};
pub use dedup::Deduplicator;
pub use extractor::{ParseError, RecordExtractor};
pub use poll::{PollConfig, PollLoop, PollOutcome};
pub use runner::RunController;
pub use settings::{SettingsApplier, SettingsError, SettingsStage};
