use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{Document, DocumentStore, Filter, RepositoryError};

/// Process-local collection keyed by document id.
pub struct MemoryStore<D> {
    records: Arc<Mutex<HashMap<String, D>>>,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Default for MemoryStore<D> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            _marker: PhantomData,
        }
    }
}

impl<D> Clone for MemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            _marker: PhantomData,
        }
    }
}

impl<D: Document> MemoryStore<D> {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, D>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store poisoned".to_string()))
    }

    fn matches(document: &D, filter: &Filter) -> Result<bool, RepositoryError> {
        if filter.clauses().is_empty() {
            return Ok(true);
        }

        let value = to_json(document)?;
        Ok(filter
            .clauses()
            .iter()
            .all(|(field, expected)| {
                value.get(*field).and_then(Value::as_str) == Some(expected.as_str())
            }))
    }

    /// Rejects `document` when one of its unique fields is already held by another id.
    fn check_unique(
        records: &HashMap<String, D>,
        document: &D,
    ) -> Result<(), RepositoryError> {
        if D::UNIQUE.is_empty() {
            return Ok(());
        }

        let candidate = to_json(document)?;
        for other in records.values().filter(|other| other.id() != document.id()) {
            let existing = to_json(other)?;
            let taken = D::UNIQUE.iter().any(|field| match candidate.get(*field) {
                None | Some(Value::Null) => false,
                Some(value) => existing.get(*field) == Some(value),
            });
            if taken {
                return Err(RepositoryError::Conflict);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_json<D: Document>(document: &D) -> Result<Value, RepositoryError> {
    serde_json::to_value(document).map_err(|err| RepositoryError::Serialization(err.to_string()))
}

#[async_trait]
impl<D: Document> DocumentStore<D> for MemoryStore<D> {
    async fn insert(&self, document: D) -> Result<D, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(document.id()) {
            return Err(RepositoryError::Conflict);
        }
        Self::check_unique(&guard, &document)?;
        guard.insert(document.id().to_string(), document.clone());
        Ok(document)
    }

    async fn replace(&self, document: D) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(document.id()) {
            Self::check_unique(&guard, &document)?;
        }
        match guard.get_mut(document.id()) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<D>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn list(&self, filter: &Filter) -> Result<Vec<D>, RepositoryError> {
        let guard = self.lock()?;
        let mut documents = Vec::new();
        for document in guard.values() {
            if Self::matches(document, filter)? {
                documents.push(document.clone());
            }
        }
        documents.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(documents)
    }
}
