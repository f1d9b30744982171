// Navigation side effect performed when the session is gone

/// Sends the user to the login entry point. Implementations must be
/// idempotent: several failing requests may each call it.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}
