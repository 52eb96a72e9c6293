//! StateStore: redb-backed deployment records.
//!
//! Values are JSON-serialized `Deployment`s keyed by id. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;
use warpscale_core::Deployment;

use crate::error::{StateError, StateResult};
use crate::tables::DEPLOYMENTS;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe deployment store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or replace a deployment record.
    pub fn put_deployment(&self, deployment: &Deployment) -> StateResult<()> {
        let value = encode(deployment)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
            table
                .insert(deployment.id.as_str(), value.as_slice())
                .map_err(map_err!(Storage))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(deployment = %deployment.id, "deployment stored");
        Ok(())
    }

    /// Get a deployment by id.
    pub fn get_deployment(&self, id: &str) -> StateResult<Option<Deployment>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Storage))? {
            Some(guard) => Ok(Some(decode(id, guard.value())?)),
            None => Ok(None),
        }
    }

    /// Find a deployment by id, falling back to a match on its URL host.
    pub fn find_deployment(&self, id_or_host: &str) -> StateResult<Option<Deployment>> {
        if let Some(deployment) = self.get_deployment(id_or_host)? {
            return Ok(Some(deployment));
        }
        let host = id_or_host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Ok(self
            .list_deployments()?
            .into_iter()
            .find(|d| d.host().eq_ignore_ascii_case(host)))
    }

    /// List all deployments, ordered by id.
    pub fn list_deployments(&self) -> StateResult<Vec<Deployment>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Storage))? {
            let (key, value) = entry.map_err(map_err!(Storage))?;
            results.push(decode(key.value(), value.value())?);
        }
        Ok(results)
    }

    /// Delete a deployment by id. Returns true if it existed.
    pub fn delete_deployment(&self, id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Storage))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(deployment = %id, existed, "deployment deleted");
        Ok(existed)
    }

    /// Read-modify-write a deployment inside one write transaction.
    ///
    /// Returns `Ok(None)` if the deployment does not exist. Nothing is
    /// written when `f` fails.
    pub fn modify_deployment<R, E>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Deployment) -> Result<R, E>,
    ) -> Result<Option<R>, E>
    where
        E: From<StateError>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let result;
        {
            let mut table = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
            let mut deployment = match table.get(id).map_err(map_err!(Storage))? {
                Some(guard) => decode(id, guard.value())?,
                None => return Ok(None),
            };
            result = f(&mut deployment)?;

            let value = encode(&deployment)?;
            table
                .insert(id, value.as_slice())
                .map_err(map_err!(Storage))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(deployment = %id, "deployment updated");
        Ok(Some(result))
    }
}

fn encode(deployment: &Deployment) -> StateResult<Vec<u8>> {
    serde_json::to_vec(deployment).map_err(map_err!(Encode))
}

fn decode(key: &str, bytes: &[u8]) -> StateResult<Deployment> {
    serde_json::from_slice(bytes).map_err(|e| StateError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
