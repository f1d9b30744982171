// Command-line surface
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "battery-dashboard", version, about = "Battery telemetry and remaining-useful-life dashboard")]
pub struct Cli {
    /// Config file (defaults to config/dashboard.* when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Battery to track instead of the configured one
    #[arg(long, global = true)]
    pub battery: Option<String>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "BATTERY_DASHBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user and role
    Whoami,
    /// Check that the prediction service is up
    Health,
    /// Print the accepted range of every reading field
    Limits,
    /// Refresh the dashboard periodically until interrupted
    Watch,
    /// Run a single refresh cycle
    Refresh,
    /// Validate and store one reading
    Submit(SubmitArgs),
    /// Store a synthetic next reading for the tracked battery
    Sample,
    /// Ask the service to retrain its model
    Retrain,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Defaults to the tracked battery
    #[arg(long)]
    pub battery_id: Option<String>,
    #[arg(long)]
    pub voltage: f64,
    #[arg(long)]
    pub current: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: f64,
    #[arg(long)]
    pub capacity: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub cycle_number: i64,
}
