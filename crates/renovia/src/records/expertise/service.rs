use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::domain::{Expertise, ExpertiseDraft};
use super::scoring::fill_derived;
use crate::access::{ensure_owner_or_admin, visible_records};
use crate::accounts::CurrentUser;
use crate::http::ApiError;
use crate::store::{RepositoryError, SharedStore};

/// Expertise CRUD scoped by the caller's role and ownership.
pub struct ExpertiseService {
    store: SharedStore<Expertise>,
}

impl ExpertiseService {
    pub fn new(store: SharedStore<Expertise>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user: &CurrentUser) -> Result<Vec<Expertise>, ApiError> {
        Ok(self.store.list(&visible_records(user)).await?)
    }

    pub async fn get(&self, user: &CurrentUser, id: &str) -> Result<Expertise, ApiError> {
        let expertise = self
            .store
            .fetch(id)
            .await?
            .ok_or(ApiError::NotFound("expertise"))?;
        ensure_owner_or_admin(user, &expertise.created_by)?;
        Ok(expertise)
    }

    pub async fn create(
        &self,
        user: &CurrentUser,
        draft: ExpertiseDraft,
    ) -> Result<Expertise, ApiError> {
        let content = prepare(draft)?;
        let now = Utc::now();
        let expertise = Expertise {
            id: Uuid::new_v4().to_string(),
            content,
            created_by: user.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert(expertise).await?;
        info!(expertise_id = %stored.id, created_by = %stored.created_by, "expertise created");
        Ok(stored)
    }

    /// Full replace of the editable content; owner and creation time are preserved.
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: &str,
        draft: ExpertiseDraft,
    ) -> Result<Expertise, ApiError> {
        let existing = self.get(user, id).await?;
        let updated = Expertise {
            content: prepare(draft)?,
            updated_at: Utc::now(),
            ..existing
        };

        self.store
            .replace(updated.clone())
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ApiError::NotFound("expertise"),
                other => ApiError::Repository(other),
            })?;
        info!(expertise_id = %id, updated_by = %user.id, "expertise updated");
        Ok(updated)
    }

    pub async fn delete(&self, user: &CurrentUser, id: &str) -> Result<(), ApiError> {
        self.get(user, id).await?;
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound("expertise"));
        }
        info!(expertise_id = %id, deleted_by = %user.id, "expertise deleted");
        Ok(())
    }
}

fn prepare(mut draft: ExpertiseDraft) -> Result<ExpertiseDraft, ApiError> {
    draft
        .validate(Utc::now().date_naive())
        .map_err(ApiError::Validation)?;
    fill_derived(&mut draft.evaluations);
    Ok(draft)
}
