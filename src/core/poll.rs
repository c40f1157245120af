use crate::core::{dedup::Deduplicator, extractor::RecordExtractor};
use crate::models::{ErrorKind, LoopState, Record, RunState, StopReason};
use crate::services::recs_api::{CallError, RecsApi};
use crate::services::sink::RecordSink;
use crate::services::transport::{Transport, TransportResponse};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Records kept for the closing report
const SAMPLE_SIZE: usize = 5;

/// Pacing and stop conditions for the poll loop
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed wait between iterations
    pub delay: Duration,
    /// Stop after this many completed requests
    pub request_limit: Option<u32>,
    /// Stop once a response yields no new records
    pub stop_when_exhausted: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            request_limit: None,
            stop_when_exhausted: false,
        }
    }
}

/// Final state of a poll loop
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub state: LoopState,
    pub stop_reason: StopReason,
    pub run_state: RunState,
    pub error: Option<String>,
    pub sample: Vec<Record>,
}

enum Iteration {
    Fetched { admitted: usize },
    Transient,
    Fatal,
}

/// Fetch → extract → dedup → persist → pace, until a terminal state
///
/// Iterations run strictly one after another. The shutdown token is honored
/// before each fetch, while a fetch is in flight, and during the pacing wait;
/// never while records from a response are being persisted.
pub struct PollLoop<'a, T, S> {
    api: &'a RecsApi<T>,
    sink: &'a mut S,
    extractor: RecordExtractor,
    dedup: Deduplicator,
    config: PollConfig,
    shutdown: CancellationToken,
    run_state: RunState,
    error: Option<String>,
    sample: Vec<Record>,
}

impl<'a, T: Transport, S: RecordSink> PollLoop<'a, T, S> {
    pub fn new(
        api: &'a RecsApi<T>,
        sink: &'a mut S,
        config: PollConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api,
            sink,
            extractor: RecordExtractor::new(),
            dedup: Deduplicator::new(),
            config,
            shutdown,
            run_state: RunState::default(),
            error: None,
            sample: Vec::new(),
        }
    }

    /// Drive the loop to a terminal state
    pub async fn run(mut self) -> PollOutcome {
        info!(
            "Starting poll loop (delay: {:?}, limit: {:?})",
            self.config.delay, self.config.request_limit
        );

        let (state, stop_reason) = loop {
            let next = self.step().await;
            if let Some(reason) = next.stop_reason() {
                break (next, reason);
            }
        };

        self.run_state.stopped = true;
        info!(
            "Poll loop stopped: {} after {} requests ({} records persisted)",
            stop_reason, self.run_state.request_count, self.run_state.records_persisted
        );

        PollOutcome {
            state,
            stop_reason,
            run_state: self.run_state,
            error: self.error,
            sample: self.sample,
        }
    }

    fn limit_reached(&self) -> bool {
        self.config
            .request_limit
            .is_some_and(|limit| self.run_state.request_count >= limit)
    }

    async fn step(&mut self) -> LoopState {
        // Safe checkpoint: nothing in flight, nothing half-persisted
        if self.shutdown.is_cancelled() {
            info!("Shutdown requested, stopping before next request");
            return LoopState::StoppedBySignal;
        }
        if self.limit_reached() {
            return LoopState::StoppedByLimit;
        }

        let request_no = self.run_state.request_count + 1;
        let response = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested while request #{} was in flight", request_no);
                return LoopState::StoppedBySignal;
            }
            response = self.api.fetch_recommendations() => response,
        };

        let iteration = self.process(request_no, response);
        self.run_state.request_count += 1;

        match iteration {
            Iteration::Fatal => return LoopState::StoppedByError,
            _ if self.limit_reached() => {
                info!("Request limit reached");
                return LoopState::StoppedByLimit;
            }
            Iteration::Fetched { admitted: 0 } if self.config.stop_when_exhausted => {
                info!("No new profiles in the last response, stopping");
                return LoopState::StoppedByExhaustion;
            }
            Iteration::Fetched { .. } | Iteration::Transient => {}
        }

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested during pacing delay");
                LoopState::StoppedBySignal
            }
            _ = tokio::time::sleep(self.config.delay) => LoopState::Running,
        }
    }

    fn process(
        &mut self,
        request_no: u32,
        response: Result<TransportResponse, CallError>,
    ) -> Iteration {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                let kind = e.kind();
                self.run_state.last_error = Some(kind);
                return match kind {
                    ErrorKind::Fatal => {
                        error!("Request #{} rejected, session is no longer valid: {}", request_no, e);
                        self.error = Some(e.to_string());
                        Iteration::Fatal
                    }
                    ErrorKind::Transient => {
                        warn!("Request #{} failed: {}", request_no, e);
                        Iteration::Transient
                    }
                };
            }
        };

        let records = match self.extractor.extract(&response.body) {
            Ok(records) => records,
            Err(e) => {
                warn!("Request #{}: could not read response: {}", request_no, e);
                self.run_state.last_error = Some(ErrorKind::Transient);
                return Iteration::Transient;
            }
        };

        let received = records.len();
        let mut admitted = 0;

        for record in records {
            if !self.dedup.admit(&record) {
                self.run_state.duplicates_skipped += 1;
                continue;
            }

            if let Err(e) = self.sink.append(&record) {
                // Admission and persistence go together
                self.dedup.release(&record.user_id);
                error!("Failed to persist record {}: {}", record.user_id, e);
                self.run_state.last_error = Some(ErrorKind::Fatal);
                self.error = Some(e.to_string());
                return Iteration::Fatal;
            }

            admitted += 1;
            self.run_state.records_persisted += 1;
            if self.sample.len() < SAMPLE_SIZE {
                self.sample.push(record);
            }
        }

        if admitted > 0 {
            info!(
                "Request #{}: found {} new users of {} (total: {})",
                request_no,
                admitted,
                received,
                self.dedup.len()
            );
        } else {
            info!("Request #{}: no new users ({} received)", request_no, received);
        }

        Iteration::Fetched { admitted }
    }
}
