//! In-memory endpoint store.
//!
//! # Responsibilities
//! - Hold endpoint definitions keyed by id
//! - Preserve insertion order for traffic lookup
//! - Assign fresh ids on create

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::routing;
use crate::store::endpoint::{EndpointDefinition, EndpointInput, HttpMethod};

/// Error type for store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("endpoint {0} not found")]
    NotFound(String),
}

/// Operations shared by every endpoint store.
///
/// All operations are synchronous from the caller's point of view.
pub trait EndpointRepository: Send + Sync {
    /// All definitions, in store iteration order.
    fn list(&self) -> Vec<EndpointDefinition>;

    fn get(&self, id: &str) -> Option<EndpointDefinition>;

    /// First definition (in iteration order) whose method equals `method`
    /// and whose template matches `path`.
    fn find_by_method_and_path(&self, method: HttpMethod, path: &str) -> Option<EndpointDefinition>;

    fn create(&self, input: EndpointInput) -> EndpointDefinition;

    /// Replace every field but the id. Unknown ids are not inserted.
    fn update(&self, id: &str, input: EndpointInput) -> Result<EndpointDefinition, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Ids in insertion order.
    order: Vec<String>,
    by_id: HashMap<String, EndpointDefinition>,
}

impl Inner {
    fn iter(&self) -> impl Iterator<Item = &EndpointDefinition> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    fn insert(&mut self, def: EndpointDefinition) {
        if !self.by_id.contains_key(&def.id) {
            self.order.push(def.id.clone());
        }
        self.by_id.insert(def.id.clone(), def);
    }
}

/// Insertion-ordered store behind a single `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted definitions, keeping their order.
    pub fn from_definitions(defs: impl IntoIterator<Item = EndpointDefinition>) -> Self {
        let mut inner = Inner::default();
        for def in defs {
            inner.insert(def);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EndpointRepository for MemoryStore {
    fn list(&self) -> Vec<EndpointDefinition> {
        self.read().iter().cloned().collect()
    }

    fn get(&self, id: &str) -> Option<EndpointDefinition> {
        self.read().by_id.get(id).cloned()
    }

    fn find_by_method_and_path(&self, method: HttpMethod, path: &str) -> Option<EndpointDefinition> {
        self.read()
            .iter()
            .find(|def| def.method == method && routing::matches(&def.path_template, path))
            .cloned()
    }

    fn create(&self, input: EndpointInput) -> EndpointDefinition {
        let mut inner = self.write();
        let mut id = Uuid::new_v4().to_string();
        while inner.by_id.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }
        let def = EndpointDefinition::from_input(id, input);
        inner.insert(def.clone());
        def
    }

    fn update(&self, id: &str, input: EndpointInput) -> Result<EndpointDefinition, StoreError> {
        let mut inner = self.write();
        let slot = inner
            .by_id
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = EndpointDefinition::from_input(id.to_string(), input);
        Ok(slot.clone())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.by_id.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        inner.order.retain(|existing| existing != id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.read().by_id.len()
    }
}
