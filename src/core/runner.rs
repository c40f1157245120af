use crate::core::poll::{PollConfig, PollLoop};
use crate::core::settings::SettingsApplier;
use crate::models::{Preferences, RunSummary, StopReason};
use crate::services::recs_api::RecsApi;
use crate::services::sink::RecordSink;
use crate::services::transport::Transport;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Top-level orchestration of a harvesting run
///
/// # Run phases
/// 1. Apply discovery settings once (location, age, distance, gender)
/// 2. Poll the recommendation feed until a stop condition or shutdown
pub struct RunController<T, S> {
    api: RecsApi<T>,
    sink: S,
    shutdown: CancellationToken,
    auto_expand_age: bool,
}

impl<T: Transport, S: RecordSink> RunController<T, S> {
    pub fn new(api: RecsApi<T>, sink: S, shutdown: CancellationToken) -> Self {
        Self {
            api,
            sink,
            shutdown,
            auto_expand_age: true,
        }
    }

    pub fn with_age_auto_expansion(mut self, enabled: bool) -> Self {
        self.auto_expand_age = enabled;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Execute one run and report how it ended
    ///
    /// Each call starts with an empty seen-set, so separate runs never
    /// deduplicate against each other.
    pub async fn run(&mut self, preferences: &Preferences, config: &PollConfig) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        async move {
            tracing::info!("Configuring discovery settings...");

            let applier = SettingsApplier::new(&self.api)
                .with_age_auto_expansion(self.auto_expand_age);

            if let Err(e) = applier.apply(preferences).await {
                return RunSummary {
                    run_id,
                    request_count: 0,
                    stop_reason: StopReason::SettingsFailed,
                    records_persisted: 0,
                    duplicates_skipped: 0,
                    last_error: Some(e.cause.kind()),
                    error: Some(e.to_string()),
                    sample: Vec::new(),
                };
            }

            let outcome = PollLoop::new(
                &self.api,
                &mut self.sink,
                config.clone(),
                self.shutdown.clone(),
            )
            .run()
            .await;

            RunSummary {
                run_id,
                request_count: outcome.run_state.request_count,
                stop_reason: outcome.stop_reason,
                records_persisted: outcome.run_state.records_persisted,
                duplicates_skipped: outcome.run_state.duplicates_skipped,
                last_error: outcome.run_state.last_error,
                error: outcome.error,
                sample: outcome.sample,
            }
        }
        .instrument(span)
        .await
    }
}
