use recs_harvester::config::{LoggingSettings, Settings};
use recs_harvester::models::RunSummary;
use recs_harvester::services::{CsvSink, RecsApi, ReqwestTransport};
use recs_harvester::RunController;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn output_path(settings: &Settings) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    settings
        .output
        .directory
        .join(format!("{}_{}.csv", settings.output.file_prefix, stamp))
}

fn report(summary: &RunSummary, path: &std::path::Path) {
    info!("{}", "=".repeat(60));
    info!("HARVEST SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Run id: {}", summary.run_id);
    info!("Stopped: {}", summary.stop_reason);
    info!("Total requests made: {}", summary.request_count);
    info!("Total unique users collected: {}", summary.records_persisted);
    info!("Duplicates skipped: {}", summary.duplicates_skipped);
    info!("CSV file saved at: {}", path.display());

    if let Some(err) = &summary.error {
        error!("Cause: {}", err);
    }

    if !summary.sample.is_empty() {
        info!("Sample of collected users:");
        for (i, record) in summary.sample.iter().enumerate() {
            let short_id: String = record.user_id.chars().take(8).collect();
            let age = record
                .age
                .map(|a| a.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            info!(
                "  {}. {} (ID: {}...) - Age: {} - {} photos",
                i + 1,
                record.name,
                short_id,
                age,
                record.photo_count
            );
        }
        if summary.records_persisted > summary.sample.len() {
            info!(
                "  ... and {} more users",
                summary.records_persisted - summary.sample.len()
            );
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(&settings.logging);

    info!("Starting Recs Harvester...");

    if settings.api.auth_token.trim().is_empty() {
        error!("No auth token configured (set AUTH_TOKEN or api.auth_token)");
        std::process::exit(2);
    }

    let preferences = match settings.preferences() {
        Ok(prefs) => prefs,
        Err(e) => {
            error!("Invalid discovery settings: {}", e);
            std::process::exit(2);
        }
    };

    let transport = match ReqwestTransport::new(settings.http_timeout()) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(2);
        }
    };
    let api = RecsApi::new(transport, settings.api_options());

    let path = output_path(&settings);
    let sink = match CsvSink::create(&path) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to create {}: {}", path.display(), e);
            std::process::exit(2);
        }
    };
    info!("Initialized CSV file: {}", path.display());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, finishing current response before stopping");
            signal_token.cancel();
        }
    });

    let poll_config = settings.poll_config();
    info!("Delay between requests: {:?}", poll_config.delay);

    let mut controller = RunController::new(api, sink, shutdown)
        .with_age_auto_expansion(settings.discovery.auto_expand_age);

    let summary = controller.run(&preferences, &poll_config).await;
    report(&summary, &path);

    if summary.stop_reason.is_failure() {
        std::process::exit(1);
    }
}
