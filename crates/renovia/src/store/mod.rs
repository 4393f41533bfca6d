//! Document persistence for users, expertises and subsidy applications.
//!
//! Every collection goes through [`DocumentStore`], so services and routers only ever see a
//! trait object. Two backends exist: [`MemoryStore`] for tests and database-less runs, and
//! [`MongoStore`] sharing one client pool owned by [`Database`].

mod memory;
mod mongo;
pub mod timestamp;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::accounts::User;
use crate::config::DatabaseConfig;
use crate::records::expertise::Expertise;
use crate::records::pda::Pda;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A record persisted as one document of a named collection.
pub trait Document:
    Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    const COLLECTION: &'static str;
    /// Top-level fields whose values may appear on at most one document.
    const UNIQUE: &'static [&'static str] = &[];

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Conjunction of equality clauses on top-level string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(&'static str, String)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push((field, value.into()));
        self
    }

    pub fn clauses(&self) -> &[(&'static str, String)] {
        &self.clauses
    }
}

/// Storage abstraction so services can be exercised against any backend.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    async fn insert(&self, document: D) -> Result<D, RepositoryError>;
    async fn replace(&self, document: D) -> Result<(), RepositoryError>;
    async fn fetch(&self, id: &str) -> Result<Option<D>, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
    /// Matching documents, newest first.
    async fn list(&self, filter: &Filter) -> Result<Vec<D>, RepositoryError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, RepositoryError> {
        Ok(self.list(filter).await?.into_iter().next())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("document could not be (de)serialized: {0}")]
    Serialization(String),
}

pub type SharedStore<D> = Arc<dyn DocumentStore<D>>;

/// The three typed collections of the application.
#[derive(Clone)]
pub struct Stores {
    pub users: SharedStore<User>,
    pub expertises: SharedStore<Expertise>,
    pub pdas: SharedStore<Pda>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::<User>::default()),
            expertises: Arc::new(MemoryStore::<Expertise>::default()),
            pdas: Arc::new(MemoryStore::<Pda>::default()),
        }
    }
}

/// Connection handle owning the backend for the lifetime of the process.
pub enum Database {
    Memory(Stores),
    Mongo {
        client: mongodb::Client,
        stores: Stores,
    },
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let Some(url) = config.url.as_deref() else {
            info!("no database url configured, keeping records in memory");
            return Ok(Self::Memory(Stores::in_memory()));
        };

        let client = mongodb::Client::with_uri_str(url)
            .await
            .map_err(mongo::unavailable)?;
        let database = client.database(&config.name);

        let users = MongoStore::<User>::new(&database);
        let expertises = MongoStore::<Expertise>::new(&database);
        let pdas = MongoStore::<Pda>::new(&database);
        users.ensure_indexes().await?;
        expertises.ensure_indexes().await?;
        pdas.ensure_indexes().await?;

        let stores = Stores {
            users: Arc::new(users),
            expertises: Arc::new(expertises),
            pdas: Arc::new(pdas),
        };
        info!(database = %config.name, "connected to document store");

        Ok(Self::Mongo { client, stores })
    }

    pub fn stores(&self) -> Stores {
        match self {
            Self::Memory(stores) | Self::Mongo { stores, .. } => stores.clone(),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Mongo { .. } => "mongodb",
        }
    }

    pub async fn shutdown(self) {
        if let Self::Mongo { client, .. } = self {
            client.shutdown().await;
            info!("document store connection closed");
        }
    }
}
