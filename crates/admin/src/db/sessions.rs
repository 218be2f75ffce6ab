//! Session stores.
//!
//! The relational backend keeps sessions in `tower_sessions.session` through
//! `PostgresStore`; the in-memory backend uses [`MemorySessionStore`]. Both are
//! wrapped in a [`SessionBackend`] so the session layer and the expiry sweep
//! never need to know which one is active.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{ExpiredDeletion, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

/// A session store that can drop its expired records on demand.
#[async_trait]
pub trait SweepingSessionStore: SessionStore {
    /// Delete every record whose expiry date has passed.
    async fn sweep_expired(&self) -> session_store::Result<()>;
}

#[async_trait]
impl SweepingSessionStore for PostgresStore {
    async fn sweep_expired(&self) -> session_store::Result<()> {
        self.delete_expired().await
    }
}

/// Process-local session store.
///
/// Records past their expiry are invisible to `load` immediately and are
/// physically removed by the periodic sweep.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// True when no records are held.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_active(record))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl SweepingSessionStore for MemorySessionStore {
    async fn sweep_expired(&self) -> session_store::Result<()> {
        self.records.lock().await.retain(|_, record| is_active(record));
        Ok(())
    }
}

/// Cloneable handle over whichever session store the storage backend uses.
#[derive(Debug, Clone)]
pub struct SessionBackend(Arc<dyn SweepingSessionStore>);

impl SessionBackend {
    pub fn new(store: impl SweepingSessionStore) -> Self {
        Self(Arc::new(store))
    }

    /// Delete expired sessions now.
    ///
    /// # Errors
    ///
    /// Returns the underlying store's error.
    pub async fn sweep_expired(&self) -> session_store::Result<()> {
        self.0.sweep_expired().await
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.0.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.0.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.delete(session_id).await
    }
}

/// Sweep expired sessions every `period`, forever.
///
/// Spawned once at startup. Failures are logged and retried on the next tick.
pub async fn sweep_expired_sessions(sessions: SessionBackend, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match sessions.sweep_expired().await {
            Ok(()) => tracing::debug!("Expired sessions swept"),
            Err(e) => tracing::warn!(error = %e, "Failed to sweep expired sessions"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(expires_in: time::Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_create_load_delete() {
        let store = MemorySessionStore::new();
        let mut rec = record(time::Duration::hours(1));
        store.create(&mut rec).await.unwrap();

        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, rec.id);

        store.delete(&rec.id).await.unwrap();
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = MemorySessionStore::new();
        let mut first = record(time::Duration::hours(1));
        store.create(&mut first).await.unwrap();

        let mut second = record(time::Duration::hours(1));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_records_hidden_then_swept() {
        let store = MemorySessionStore::new();
        let mut live = record(time::Duration::hours(1));
        let mut stale = record(time::Duration::seconds(-5));
        store.create(&mut live).await.unwrap();
        store.create(&mut stale).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
        assert_eq!(store.len().await, 2);

        let backend = SessionBackend::new(store.clone());
        backend.sweep_expired().await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(backend.load(&live.id).await.unwrap().is_some());
    }
}
