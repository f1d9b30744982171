use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub generator: GeneratorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request timeout; 0 disables it.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub battery_id: String,
    pub refresh_interval_secs: u64,
    pub history_rows: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("battery-dashboard").join("session.toml")))
            .unwrap_or_else(|| PathBuf::from(".battery-dashboard-session.toml"))
    }
}

/// Shape of the synthetic degradation curve and the noise around it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub base_capacity: f64,
    pub degradation_rate: f64,
    pub capacity_floor: f64,
    pub voltage_base: f64,
    pub voltage_jitter: f64,
    pub current_base: f64,
    pub current_jitter: f64,
    pub temperature_base: f64,
    pub temperature_jitter: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_capacity: 100.0,
            degradation_rate: 0.1,
            capacity_floor: 50.0,
            voltage_base: 3.7,
            voltage_jitter: 0.3,
            current_base: 2.0,
            current_jitter: 0.5,
            temperature_base: 25.0,
            temperature_jitter: 10.0,
        }
    }
}

/// Loads defaults, then `path` (or `config/dashboard` if present), then
/// `BATTERY_DASHBOARD__SECTION__KEY` environment variables.
pub fn load_dashboard_config(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
    let generator = GeneratorSettings::default();

    let mut builder = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_secs", 15_i64)?
        .set_default("dashboard.battery_id", "BATT001")?
        .set_default("dashboard.refresh_interval_secs", DEFAULT_REFRESH_INTERVAL_SECS as i64)?
        .set_default("dashboard.history_rows", 10_i64)?
        .set_default("generator.base_capacity", generator.base_capacity)?
        .set_default("generator.degradation_rate", generator.degradation_rate)?
        .set_default("generator.capacity_floor", generator.capacity_floor)?
        .set_default("generator.voltage_base", generator.voltage_base)?
        .set_default("generator.voltage_jitter", generator.voltage_jitter)?
        .set_default("generator.current_base", generator.current_base)?
        .set_default("generator.current_jitter", generator.current_jitter)?
        .set_default("generator.temperature_base", generator.temperature_base)?
        .set_default("generator.temperature_jitter", generator.temperature_jitter)?;

    builder = match path {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::with_name("config/dashboard").required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix("BATTERY_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
