use std::process::ExitCode;
use std::sync::Arc;

use bikeshare_board::config::AppConfig;
use bikeshare_board::feeds::FeedClient;
use bikeshare_board::logging::init_logging;
use bikeshare_board::pipeline::RefreshPipeline;
use bikeshare_board::render::ArtifactRenderer;
use bikeshare_board::scheduler::Scheduler;
use bikeshare_board::web::{AppState, create_router};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // Create feed client
    let client = match FeedClient::new(config.feeds.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create feed client");
            return ExitCode::FAILURE;
        }
    };

    let mut pipeline = RefreshPipeline::new(client);

    // Artifact directory is created once, up front
    if let Some(artifacts) = &config.capture {
        let renderer = ArtifactRenderer::new(artifacts.clone());
        if let Err(e) = renderer.ensure_output_dir() {
            error!(error = %e, "cannot prepare artifact directory");
            return ExitCode::FAILURE;
        }
        info!(
            dir = %artifacts.output_dir.display(),
            width = artifacts.width,
            height = artifacts.height,
            "artifact capture enabled"
        );
        pipeline = pipeline.with_renderer(renderer);
    }

    let scheduler = Arc::new(Scheduler::new(pipeline));

    // Spawn background task driving the refresh cadence
    tokio::spawn(Arc::clone(&scheduler).run(config.refresh_interval));

    let state = AppState::new(scheduler, config.refresh_interval, &config.static_dir);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.bind_addr,
        interval_secs = config.refresh_interval.as_secs(),
        info_url = %config.feeds.station_information_url,
        status_url = %config.feeds.station_status_url,
        "station board listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
