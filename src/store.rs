use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use neo4rs::{query, Graph};

use crate::config::Neo4jConfig;
use crate::constants::{MATCH_PREFERENCES, UPSERT_PREFERENCES};
use crate::error::{Result, TourError};
use crate::models::PreferenceRecord;

/// Per-user preference persistence.
///
/// `close` succeeds once; afterwards every call fails with
/// [`TourError::StoreClosed`].
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Creates or overwrites the record for `user_id`.
    async fn store_preferences(&self, user_id: &str, record: &PreferenceRecord) -> Result<()>;

    /// Returns the last record written for `user_id`, or `None` if there is none.
    async fn get_preferences(&self, user_id: &str) -> Result<Option<PreferenceRecord>>;

    async fn close(&self) -> Result<()>;
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> TourError {
    TourError::Storage("store lock poisoned by a panicked writer".to_string())
}

/// Preference store backed by a Neo4j graph.
///
/// Records live on `(:User {id})` nodes as a JSON string property, since graph
/// properties cannot hold maps.
pub struct Neo4jPreferenceStore {
    graph: Mutex<Option<Graph>>,
    timeout: Duration,
}

impl Neo4jPreferenceStore {
    /// Creates the driver handle. Bounded by `timeout` like every other call.
    pub async fn connect(config: &Neo4jConfig, timeout: Duration) -> Result<Self> {
        let graph = tokio::time::timeout(
            timeout,
            Graph::new(&config.uri, &config.user, &config.password),
        )
        .await
        .map_err(|_| {
            TourError::ConnectionUnavailable(format!(
                "could not reach {} within {}s",
                config.uri,
                timeout.as_secs()
            ))
        })??;
        tracing::info!("Preference store configured for {}", config.uri);
        Ok(Self {
            graph: Mutex::new(Some(graph)),
            timeout,
        })
    }

    /// Clones the driver handle out so no lock is held across an await.
    fn graph(&self) -> Result<Graph> {
        self.graph
            .lock()
            .map_err(poisoned)?
            .clone()
            .ok_or(TourError::StoreClosed)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, op).await.map_err(|_| {
            TourError::ConnectionUnavailable(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))
        })?
    }
}

#[async_trait]
impl PreferenceStore for Neo4jPreferenceStore {
    async fn store_preferences(&self, user_id: &str, record: &PreferenceRecord) -> Result<()> {
        let graph = self.graph()?;
        let preferences = serde_json::to_string(record)?;
        let q = query(UPSERT_PREFERENCES)
            .param("user_id", user_id)
            .param("preferences", preferences);

        self.bounded(async { graph.run(q).await.map_err(TourError::from) })
            .await?;

        tracing::debug!("Stored preferences for {}", user_id);
        Ok(())
    }

    async fn get_preferences(&self, user_id: &str) -> Result<Option<PreferenceRecord>> {
        let graph = self.graph()?;
        let q = query(MATCH_PREFERENCES).param("user_id", user_id);

        let row = self
            .bounded(async {
                let mut stream = graph.execute(q).await?;
                Ok::<_, TourError>(stream.next().await?)
            })
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("preferences")?;
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<()> {
        let graph = self
            .graph
            .lock()
            .map_err(poisoned)?
            .take()
            .ok_or(TourError::StoreClosed)?;
        // Dropping the last handle shuts the connection pool down.
        drop(graph);
        tracing::info!("Preference store connection closed");
        Ok(())
    }
}

/// Process-memory store with the same semantics as the graph store
pub struct InMemoryPreferenceStore {
    records: Mutex<Option<HashMap<String, PreferenceRecord>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Some(HashMap::new())),
        }
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, PreferenceRecord>) -> T,
    ) -> Result<T> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        let records = guard.as_mut().ok_or(TourError::StoreClosed)?;
        Ok(f(records))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.with_records(|records| records.len()).unwrap_or(0)
    }
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn store_preferences(&self, user_id: &str, record: &PreferenceRecord) -> Result<()> {
        self.with_records(|records| {
            records.insert(user_id.to_string(), record.clone());
        })
    }

    async fn get_preferences(&self, user_id: &str) -> Result<Option<PreferenceRecord>> {
        self.with_records(|records| records.get(user_id).cloned())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.take().map(|_| ()).ok_or(TourError::StoreClosed)
    }
}
