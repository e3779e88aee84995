use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::session::Session;

/// Persistence capability handed to the live engine.
pub trait SessionStore {
    fn load_session(&self, id: &str) -> Result<Option<Session>>;
    fn save_session(&self, session: &Session) -> Result<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for Box<T> {
    fn load_session(&self, id: &str) -> Result<Option<Session>> { (**self).load_session(id) }
    fn save_session(&self, session: &Session) -> Result<()> { (**self).save_session(session) }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn load_session(&self, id: &str) -> Result<Option<Session>> { (**self).load_session(id) }
    fn save_session(&self, session: &Session) -> Result<()> { (**self).save_session(session) }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize { *self.saves.lock() }

    pub fn get(&self, id: &str) -> Option<Session> { self.sessions.lock().get(id).cloned() }
}

impl SessionStore for MemoryStore {
    fn load_session(&self, id: &str) -> Result<Option<Session>> { Ok(self.get(id)) }

    fn save_session(&self, session: &Session) -> Result<()> {
        self.sessions.lock().insert(session.id.clone(), session.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}
