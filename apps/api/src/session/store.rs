use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::flow::Session;

/// In-memory sessions, one per user. Nothing is persisted.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    /// Returns a snapshot; network calls run on the snapshot without holding the lock.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Runs `f` against the stored session, if it still exists.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        self.inner.write().await.get_mut(&id).map(f)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
