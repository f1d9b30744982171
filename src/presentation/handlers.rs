// Command handlers
use crate::application::dashboard_service::SubmitError;
use crate::domain::telemetry::TelemetrySample;
use crate::domain::validation::{Field, VALIDATION_RULES, validate_with};
use crate::presentation::app_state::AppState;
use crate::presentation::cli::SubmitArgs;
use crate::presentation::console;
use anyhow::{Context, Result, anyhow};

pub async fn login(state: &AppState, username: &str, password: &str) -> Result<()> {
    let session = state
        .auth_service
        .login(username, password)
        .await
        .context("Login failed")?;
    println!("Logged in as {} ({})", username, session.role());
    Ok(())
}

pub fn logout(state: &AppState) -> Result<()> {
    state.auth_service.logout();
    println!("Logged out");
    Ok(())
}

pub fn whoami(state: &AppState) -> Result<()> {
    state.auth_service.require_auth()?;
    println!(
        "👤 {} ({})",
        state.session.username().as_deref().unwrap_or("unknown user"),
        state.session.role()
    );
    Ok(())
}

pub async fn health(state: &AppState) -> Result<()> {
    let health = state.api.health().await.context("Health check failed")?;
    println!(
        "Service: {} (model {})",
        health.status,
        if health.model_trained { "trained" } else { "not trained" }
    );
    Ok(())
}

pub fn limits() -> Result<()> {
    println!("{}", entry_guidelines());
    Ok(())
}

pub async fn refresh_once(state: &AppState) -> Result<()> {
    state.auth_service.require_auth()?;
    let report = state.scheduler.refresh().await?;
    tracing::debug!(?report, "Refresh finished");
    Ok(())
}

pub async fn watch(state: &AppState) -> Result<()> {
    state.auth_service.require_auth()?;

    let mut console_outcome = Ok(());
    let stop = async {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            }
            result = console::run(state) => console_outcome = result,
        }
    };

    state.scheduler.run(stop).await?;
    console_outcome?;
    Ok(())
}

pub async fn submit(state: &AppState, args: SubmitArgs) -> Result<()> {
    state.auth_service.require_auth()?;

    validate_with(|field| match field {
        Field::Voltage => args.voltage,
        Field::Current => args.current,
        Field::Temperature => args.temperature,
        Field::Capacity => args.capacity,
        Field::CycleNumber => args.cycle_number as f64,
    })
    .map_err(|e| anyhow!("⚠️ {}", e))?;

    let battery_id = args
        .battery_id
        .unwrap_or_else(|| state.scheduler.battery_id().to_string());
    let sample = TelemetrySample::new(
        battery_id,
        u32::try_from(args.cycle_number).context("Cycle number out of range")?,
        args.voltage,
        args.current,
        args.temperature,
        args.capacity,
    );

    state
        .dashboard_service
        .submit_reading(sample)
        .await
        .map_err(describe_submit_error)?;
    println!("✅ Data added successfully!");
    Ok(())
}

pub async fn sample(state: &AppState) -> Result<()> {
    state.auth_service.require_auth()?;
    add_sample(state).await
}

pub async fn retrain(state: &AppState) -> Result<()> {
    state.auth_service.require_auth()?;
    run_retrain(state).await
}

pub(crate) async fn add_sample(state: &AppState) -> Result<()> {
    let (sample, _) = state
        .dashboard_service
        .add_synthetic_sample()
        .await
        .map_err(describe_submit_error)?;
    println!(
        "✅ Sample data added (cycle {}, capacity {:.2} Ah)",
        sample.cycle_number, sample.capacity
    );
    Ok(())
}

pub(crate) async fn run_retrain(state: &AppState) -> Result<()> {
    let outcome = state
        .dashboard_service
        .retrain()
        .await
        .context("Error retraining model")?;
    if outcome.success {
        println!("✅ Model retrained successfully!");
    } else {
        println!("❌ Model retraining failed: {}", outcome.message);
    }
    Ok(())
}

fn describe_submit_error(e: SubmitError) -> anyhow::Error {
    match e {
        SubmitError::Validation(v) => anyhow!("⚠️ {}", v),
        SubmitError::Client(c) => anyhow::Error::new(c).context("❌ Error adding data"),
    }
}

/// The accepted range of every reading field, one per line.
pub fn entry_guidelines() -> String {
    let mut text = String::from("📘 Data entry guidelines:\n");
    for rule in &VALIDATION_RULES {
        text.push_str(&format!(
            "  {}: {} to {}\n",
            rule.label,
            rule.describe_bound(rule.min),
            rule.describe_bound(rule.max)
        ));
    }
    text.push_str("Values outside these ranges are rejected.");
    text
}
