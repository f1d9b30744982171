// Session store trait and the session context injected into clients
use crate::domain::session::Session;
use std::sync::Arc;

/// Persistence for the client-side session.
///
/// `save` and `clear` must each be a single step from a reader's point of
/// view: a concurrent `load` sees the old session or the new one, never a mix.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Session;

    fn save(&self, session: &Session) -> anyhow::Result<()>;

    fn clear(&self) -> anyhow::Result<()>;
}

/// Handle onto the session store shared by the request client, the
/// scheduler and the command handlers. Every accessor reads the store.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Stores a fresh session, replacing whatever was there.
    pub fn init(&self, token: String, username: String, role: Option<String>) -> anyhow::Result<Session> {
        let session = Session::new(token, username, role);
        self.save(&session)?;
        Ok(session)
    }

    pub fn current(&self) -> Session {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.current().token().map(str::to_string)
    }

    pub fn username(&self) -> Option<String> {
        self.current().username
    }

    pub fn role(&self) -> String {
        self.current().role().to_string()
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.store.save(session)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.clear()
    }
}
