use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document as BsonDocument};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use super::{Document, DocumentStore, Filter, RepositoryError};

const DUPLICATE_KEY: i32 = 11000;

/// Collection-backed store sharing the client pool of its [`Database`].
pub struct MongoStore<D: Document> {
    collection: Collection<D>,
}

impl<D: Document> MongoStore<D> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection::<D>(D::COLLECTION),
        }
    }

    /// Creates one unique index per [`Document::UNIQUE`] field.
    pub(crate) async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        for field in D::UNIQUE {
            let mut keys = BsonDocument::new();
            keys.insert(*field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection
                .create_index(index)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }
}

fn filter_document(filter: &Filter) -> BsonDocument {
    let mut document = BsonDocument::new();
    for (field, value) in filter.clauses() {
        document.insert(*field, value.clone());
    }
    document
}

pub(super) fn unavailable(err: MongoError) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

fn write_error(err: MongoError) -> RepositoryError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == DUPLICATE_KEY => {
            RepositoryError::Conflict
        }
        ErrorKind::BsonSerialization(inner) => RepositoryError::Serialization(inner.to_string()),
        _ => unavailable(err),
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for MongoStore<D> {
    async fn insert(&self, document: D) -> Result<D, RepositoryError> {
        self.collection
            .insert_one(&document)
            .await
            .map_err(write_error)?;
        Ok(document)
    }

    async fn replace(&self, document: D) -> Result<(), RepositoryError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": document.id() }, &document)
            .await
            .map_err(write_error)?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<D>, RepositoryError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(unavailable)?;
        Ok(result.deleted_count > 0)
    }

    async fn list(&self, filter: &Filter) -> Result<Vec<D>, RepositoryError> {
        let cursor = self
            .collection
            .find(filter_document(filter))
            .sort(doc! { "createdAt": -1, "_id": 1 })
            .await
            .map_err(unavailable)?;
        cursor.try_collect().await.map_err(unavailable)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, RepositoryError> {
        self.collection
            .find_one(filter_document(filter))
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_document_maps_every_clause() {
        let filter = Filter::all()
            .eq("createdBy", "user-1")
            .eq("email", "agent@renovia.fr");
        let document = filter_document(&filter);
        assert_eq!(document.get_str("createdBy").unwrap(), "user-1");
        assert_eq!(document.get_str("email").unwrap(), "agent@renovia.fr");
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(filter_document(&Filter::all()).is_empty());
    }
}
