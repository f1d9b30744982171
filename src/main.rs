// Main entry point - Dependency injection and command dispatch
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::api_client::AuthenticatedClient;
use crate::application::auth_service::AuthService;
use crate::application::battery_api::BatteryApi;
use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::sample_generator::SampleGenerator;
use crate::application::session_store::{SessionContext, SessionStore};
use crate::infrastructure::config::{DashboardConfig, load_dashboard_config};
use crate::infrastructure::file_session_store::FileSessionStore;
use crate::infrastructure::memory_session_store::MemorySessionStore;
use crate::infrastructure::reqwest_transport::ReqwestTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::{Cli, Command};
use crate::presentation::handlers;
use crate::presentation::login_redirect::LoginRedirect;
use crate::presentation::terminal_renderer::TerminalRenderer;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing on stderr; stdout carries the dashboard
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("battery_dashboard=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // One thread, one event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let result = runtime.block_on(run(cli));
    // Don't wait on the blocking stdin reader
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_dashboard_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(battery) = cli.battery {
        config.dashboard.battery_id = battery;
    }

    let state = build_state(&config, cli.ephemeral)?;

    match cli.command {
        Command::Login { username, password } => handlers::login(&state, &username, &password).await,
        Command::Logout => handlers::logout(&state),
        Command::Whoami => handlers::whoami(&state),
        Command::Health => handlers::health(&state).await,
        Command::Limits => handlers::limits(),
        Command::Watch => handlers::watch(&state).await,
        Command::Refresh => handlers::refresh_once(&state).await,
        Command::Submit(args) => handlers::submit(&state, args).await,
        Command::Sample => handlers::sample(&state).await,
        Command::Retrain => handlers::retrain(&state).await,
    }
}

fn build_state(config: &DashboardConfig, ephemeral: bool) -> anyhow::Result<AppState> {
    // Session store (infrastructure layer)
    let store: Arc<dyn SessionStore> = if ephemeral {
        Arc::new(MemorySessionStore::default())
    } else {
        let path = config.session.resolved_path();
        tracing::debug!("Session file: {:?}", path);
        Arc::new(FileSessionStore::new(path))
    };
    let session = SessionContext::new(store);

    let timeout = (config.api.timeout_secs > 0).then(|| Duration::from_secs(config.api.timeout_secs));
    let transport = Arc::new(ReqwestTransport::new(timeout)?);
    let client = AuthenticatedClient::new(
        config.api.base_url.clone(),
        transport,
        session.clone(),
        Arc::new(LoginRedirect::default()),
    );

    // Services (application layer)
    let api = Arc::new(BatteryApi::new(client.clone()));
    let scheduler = Arc::new(RefreshScheduler::new(
        api.clone(),
        Arc::new(TerminalRenderer::new(config.dashboard.history_rows)),
        config.dashboard.battery_id.clone(),
        Duration::from_secs(config.dashboard.refresh_interval_secs.max(1)),
    ));
    let dashboard_service = DashboardService::new(
        api.clone(),
        scheduler.clone(),
        SampleGenerator::new(config.generator.clone()),
    );

    Ok(AppState {
        session,
        api,
        auth_service: AuthService::new(client),
        dashboard_service,
        scheduler,
    })
}
