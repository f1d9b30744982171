// Login redirect for the terminal
use crate::application::navigator::Navigator;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tells the user to log in again. Announces once per process.
#[derive(Debug, Default)]
pub struct LoginRedirect {
    announced: AtomicBool,
}

impl Navigator for LoginRedirect {
    fn redirect_to_login(&self) {
        if self.announced.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::warn!("No valid session, redirecting to login");
        eprintln!("Not logged in. Run: battery-dashboard login --username <name>");
    }
}
