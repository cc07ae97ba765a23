use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::orchestrator::WorkflowSession;

/// Persists workflow sessions between requests, keyed by session id
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<WorkflowSession>;
    async fn set(&self, id: &str, session: WorkflowSession);
    async fn clear(&self, id: &str);
}

struct Entry {
    session: WorkflowSession,
    touched: Instant,
}

/// Process-local store. Entries idle for longer than `idle` read as absent
/// and are dropped by [`MemoryStore::purge_expired`].
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    idle: Duration,
}

impl MemoryStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            idle,
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.touched.elapsed() >= self.idle
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.touched.elapsed() < self.idle);
        before - entries.len()
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn get(&self, id: &str) -> Option<WorkflowSession> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(id)?;
        if self.is_expired(entry) {
            entries.remove(id);
            return None;
        }
        entry.touched = Instant::now();
        Some(entry.session.clone())
    }

    async fn set(&self, id: &str, session: WorkflowSession) {
        self.entries.write().await.insert(
            id.to_string(),
            Entry {
                session,
                touched: Instant::now(),
            },
        );
    }

    async fn clear(&self, id: &str) {
        self.entries.write().await.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::WorkflowState;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_set_get_clear() {
        let store = MemoryStore::new(HOUR);
        let mut session = WorkflowSession::new("abc");
        session.state = WorkflowState::Authenticated;
        store.set("abc", session).await;

        let loaded = store.get("abc").await.unwrap();
        assert_eq!(loaded.id, "abc");
        assert_eq!(loaded.state, WorkflowState::Authenticated);
        assert!(store.get("other").await.is_none());

        store.clear("abc").await;
        assert!(store.get("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = MemoryStore::new(HOUR);
        store.set("a", WorkflowSession::new("a")).await;
        let mut b = WorkflowSession::new("b");
        b.author = Some("bob".into());
        store.set("b", b).await;

        assert!(store.get("a").await.unwrap().author.is_none());
        assert_eq!(store.get("b").await.unwrap().author.as_deref(), Some("bob"));
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_sessions_read_as_absent() {
        let store = MemoryStore::new(Duration::ZERO);
        store.set("abc", WorkflowSession::new("abc")).await;

        assert!(store.get("abc").await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let expired = MemoryStore::new(Duration::ZERO);
        expired.set("a", WorkflowSession::new("a")).await;
        expired.set("b", WorkflowSession::new("b")).await;
        assert_eq!(expired.purge_expired().await, 2);
        assert_eq!(expired.count().await, 0);

        let live = MemoryStore::new(HOUR);
        live.set("a", WorkflowSession::new("a")).await;
        assert_eq!(live.purge_expired().await, 0);
        assert_eq!(live.count().await, 1);
    }
}
