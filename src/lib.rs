//! Recs Harvester - archives the recommendation feed of a dating account
//!
//! The engine applies discovery settings once, then polls the recommendation
//! endpoint, deduplicates profiles within the run and appends new ones to a CSV sink.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Deduplicator, PollConfig, PollLoop, RecordExtractor, RunController, SettingsApplier};
pub use models::{GenderInterest, LoopState, Preferences, Record, RunSummary, StopReason};
pub use services::{ApiOptions, CsvSink, RecordSink, RecsApi, ReqwestTransport, Transport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let extractor = RecordExtractor::new();
        let records = extractor.extract(r#"{"data": {"results": []}}"#).unwrap();
        assert!(records.is_empty());
        assert_eq!(PollConfig::default().request_limit, None);
    }
}
