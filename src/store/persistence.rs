//! Durable endpoint store.
//!
//! # Responsibilities
//! - Restore definitions from the backing file at startup
//! - Schedule a write-back after every successful mutation
//! - Coalesce bursts of mutations into one write (debounce)
//! - Flush pending state on shutdown
//!
//! # Design Decisions
//! - One long-lived flusher task; mutations only send a "dirty" signal
//! - Each signal restarts the quiet period, so a superseded timer never fires
//! - The whole collection is snapshotted at write time, never a diff
//! - Writes go to a temp file and are renamed over the target
//! - Persistence is best-effort: failures are logged, memory stays authoritative

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::StorageConfig;
use crate::observability::metrics;
use crate::store::endpoint::{EndpointDefinition, EndpointInput, HttpMethod};
use crate::store::memory::{EndpointRepository, MemoryStore, StoreError};

/// Error type for reading or writing the backing file.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record {id:?} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        id: String,
        reason: String,
    },

    #[error("Failed to serialize endpoints: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read definitions from `path`.
///
/// A missing file is an empty collection, not an error.
pub fn load_definitions(path: &Path) -> Result<Vec<EndpointDefinition>, PersistenceError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let defs: Vec<EndpointDefinition> =
        serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(defs.len());
    for def in &defs {
        let reason = match def.check() {
            Err(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            Ok(()) if !seen.insert(def.id.as_str()) => "duplicate id".to_string(),
            Ok(()) => continue,
        };
        return Err(PersistenceError::InvalidRecord {
            path: path.to_path_buf(),
            id: def.id.clone(),
            reason,
        });
    }

    Ok(defs)
}

/// Overwrite `path` with the full collection.
pub async fn write_definitions(path: &Path, defs: &[EndpointDefinition]) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec_pretty(defs)?;
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

/// Endpoint store that survives restarts.
///
/// Reads and writes hit the in-memory store; every mutation that changed
/// state wakes the flusher task.
pub struct PersistentStore {
    inner: Arc<MemoryStore>,
    dirty_tx: mpsc::UnboundedSender<()>,
    flushes: Arc<AtomicU64>,
}

impl PersistentStore {
    /// Load the backing file and start the flusher task.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// completes after the final flush that follows a shutdown signal.
    pub fn open(config: &StorageConfig, shutdown: broadcast::Receiver<()>) -> (Self, JoinHandle<()>) {
        let path = PathBuf::from(&config.path);

        let inner = match load_definitions(&path) {
            Ok(defs) => {
                tracing::info!(path = ?path, endpoints = defs.len(), "Endpoint store loaded");
                MemoryStore::from_definitions(defs)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load endpoint store, starting empty");
                MemoryStore::new()
            }
        };
        metrics::record_endpoint_count(inner.len());

        let inner = Arc::new(inner);
        let flushes = Arc::new(AtomicU64::new(0));
        let (dirty_tx, dirty_rx) = mpsc::unbounded_channel();

        let flusher = Flusher {
            store: inner.clone(),
            path,
            delay: Duration::from_millis(config.flush_delay_ms),
            dirty_rx,
            flushes: flushes.clone(),
        };
        let handle = tokio::spawn(flusher.run(shutdown));

        (
            Self {
                inner,
                dirty_tx,
                flushes,
            },
            handle,
        )
    }

    /// Number of completed writes to the backing file.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }

    fn mark_dirty(&self) {
        metrics::record_endpoint_count(self.inner.len());
        if self.dirty_tx.send(()).is_err() {
            tracing::warn!("Store flusher has stopped, change will not be persisted");
        }
    }
}

impl EndpointRepository for PersistentStore {
    fn list(&self) -> Vec<EndpointDefinition> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Option<EndpointDefinition> {
        self.inner.get(id)
    }

    fn find_by_method_and_path(&self, method: HttpMethod, path: &str) -> Option<EndpointDefinition> {
        self.inner.find_by_method_and_path(method, path)
    }

    fn create(&self, input: EndpointInput) -> EndpointDefinition {
        let def = self.inner.create(input);
        self.mark_dirty();
        def
    }

    fn update(&self, id: &str, input: EndpointInput) -> Result<EndpointDefinition, StoreError> {
        let def = self.inner.update(id, input)?;
        self.mark_dirty();
        Ok(def)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id)?;
        self.mark_dirty();
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Background task owning the debounce timer.
struct Flusher {
    store: Arc<MemoryStore>,
    path: PathBuf,
    delay: Duration,
    dirty_rx: mpsc::UnboundedReceiver<()>,
    flushes: Arc<AtomicU64>,
}

impl Flusher {
    async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(path = ?self.path, delay = ?self.delay, "Store flusher starting");

        loop {
            // Idle until something changes.
            tokio::select! {
                dirty = self.dirty_rx.recv() => {
                    if dirty.is_none() {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }

            // Quiet period; every new signal restarts it.
            let mut stopping = false;
            loop {
                tokio::select! {
                    _ = time::sleep(self.delay) => break,
                    dirty = self.dirty_rx.recv() => {
                        if dirty.is_none() {
                            stopping = true;
                            break;
                        }
                    }
                    _ = shutdown.recv() => {
                        stopping = true;
                        break;
                    }
                }
            }

            self.flush().await;
            if stopping {
                tracing::info!("Store flusher stopped");
                return;
            }
        }

        // Shutdown while idle: persist anything signalled but not yet picked up.
        if self.dirty_rx.try_recv().is_ok() {
            self.flush().await;
        }
        tracing::info!("Store flusher stopped");
    }

    async fn flush(&mut self) {
        while self.dirty_rx.try_recv().is_ok() {}

        let snapshot = self.store.list();
        match write_definitions(&self.path, &snapshot).await {
            Ok(()) => {
                self.flushes.fetch_add(1, Ordering::SeqCst);
                metrics::record_flush("ok");
                tracing::debug!(path = ?self.path, endpoints = snapshot.len(), "Endpoint store flushed");
            }
            Err(e) => {
                metrics::record_flush("error");
                tracing::error!(error = %e, "Failed to persist endpoint store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn input(path: &str, body: &str) -> EndpointInput {
        EndpointInput {
            method: HttpMethod::Get,
            path_template: path.to_string(),
            validation_rule: String::new(),
            response_body: body.to_string(),
            status_code: 200,
        }
    }

    fn storage(dir: &TempDir, delay_ms: u64) -> StorageConfig {
        StorageConfig {
            path: dir.path().join("endpoints.json").to_string_lossy().into_owned(),
            flush_delay_ms: delay_ms,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let defs = load_definitions(&dir.path().join("nope.json")).unwrap();
        assert!(defs.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("endpoints.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_definitions(&path), Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn test_invalid_record_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("endpoints.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","method":"GET","pathTemplate":"/ok","validationRule":"","responseBody":"","statusCode":200},
                {"id":"b","method":"GET","pathTemplate":"/bad","validationRule":"","responseBody":"","statusCode":999}]"#,
        )
        .unwrap();

        match load_definitions(&path) {
            Err(PersistenceError::InvalidRecord { id, .. }) => assert_eq!(id, "b"),
            other => panic!("expected invalid record, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_id_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("endpoints.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","method":"GET","pathTemplate":"/one","validationRule":"","responseBody":"","statusCode":200},
                {"id":"a","method":"POST","pathTemplate":"/two","validationRule":"","responseBody":"","statusCode":200}]"#,
        )
        .unwrap();

        match load_definitions(&path) {
            Err(PersistenceError::InvalidRecord { id, reason, .. }) => {
                assert_eq!(id, "a");
                assert_eq!(reason, "duplicate id");
            }
            other => panic!("expected invalid record, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("endpoints.json");

        let store = MemoryStore::new();
        store.create(input("/a", "{\"a\":1}"));
        store.create(input("/b/:id", "plain text"));
        let defs = store.list();

        write_definitions(&path, &defs).await.unwrap();
        assert_eq!(load_definitions(&path).unwrap(), defs);
    }

    #[tokio::test]
    async fn test_open_with_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let config = storage(&dir, 10);
        std::fs::write(&config.path, "garbage").unwrap();

        let (_tx, rx) = broadcast::channel(1);
        let (store, _handle) = PersistentStore::open(&config, rx);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_mutations_do_not_flush() {
        let dir = TempDir::new().unwrap();
        let config = storage(&dir, 20);
        let (_tx, rx) = broadcast::channel(1);
        let (store, _handle) = PersistentStore::open(&config, rx);

        assert!(store.delete("missing").is_err());
        assert!(store.update("missing", input("/x", "")).is_err());

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.flush_count(), 0);
        assert!(!Path::new(&config.path).exists());
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_state() {
        let dir = TempDir::new().unwrap();
        let config = storage(&dir, 60_000);
        let (tx, rx) = broadcast::channel(1);
        let (store, handle) = PersistentStore::open(&config, rx);

        let created = store.create(input("/late", "{}"));
        tx.send(()).unwrap();
        handle.await.unwrap();

        let defs = load_definitions(Path::new(&config.path)).unwrap();
        assert_eq!(defs, vec![created]);
        assert_eq!(store.flush_count(), 1);
    }
}
