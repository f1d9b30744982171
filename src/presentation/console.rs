// Interactive console used while the dashboard is watching
use crate::application::api_client::{AuthError, ClientError};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    Sample,
    Retrain,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => Some(ConsoleCommand::Refresh),
        "s" | "sample" => Some(ConsoleCommand::Sample),
        "t" | "retrain" => Some(ConsoleCommand::Retrain),
        "h" | "help" | "?" => Some(ConsoleCommand::Help),
        "q" | "quit" | "exit" => Some(ConsoleCommand::Quit),
        _ => None,
    }
}

const HELP: &str = "Commands: [r]efresh, [s]ample, re[t]rain, [h]elp, [q]uit";

/// The auth failure behind a command error, if there was one.
pub fn auth_failure(error: &anyhow::Error) -> Option<AuthError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ClientError>()?.auth())
}

/// Reads commands from stdin until `q` or until the session ends.
/// On end of input it keeps the dashboard running.
pub async fn run(state: &AppState) -> Result<(), AuthError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{}", HELP);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("stdin closed, console disabled");
                return std::future::pending().await;
            }
            Err(e) => {
                tracing::warn!("Failed to read stdin: {}", e);
                return std::future::pending().await;
            }
        };

        let result = match parse_command(&line) {
            Some(ConsoleCommand::Refresh) => {
                state.scheduler.request_refresh();
                Ok(())
            }
            Some(ConsoleCommand::Sample) => handlers::add_sample(state).await,
            Some(ConsoleCommand::Retrain) => handlers::run_retrain(state).await,
            Some(ConsoleCommand::Help) => {
                eprintln!("{}", HELP);
                Ok(())
            }
            Some(ConsoleCommand::Quit) => return Ok(()),
            None if line.trim().is_empty() => Ok(()),
            None => {
                eprintln!("Unknown command {:?}. {}", line.trim(), HELP);
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("{:#}", e);
            if let Some(auth) = auth_failure(&e) {
                return Err(auth);
            }
        }
        if !state.session.is_authenticated() {
            return Err(AuthError::MissingToken);
        }
    }
}
