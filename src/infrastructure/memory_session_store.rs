// In-process session store
use crate::application::session_store::SessionStore;
use crate::domain::session::Session;
use std::sync::Mutex;

/// Keeps the session in memory; it is swapped as a whole under the lock.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Session>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Session {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = session.clone();
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Session::default();
        Ok(())
    }
}
