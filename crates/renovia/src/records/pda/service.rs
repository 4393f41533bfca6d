use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::domain::{Pda, PdaDraft};
use super::grant::grant_amount;
use crate::access::{ensure_owner_or_admin, visible_records};
use crate::accounts::CurrentUser;
use crate::config::SubsidyConfig;
use crate::http::ApiError;
use crate::store::{RepositoryError, SharedStore};

/// Subsidy application CRUD; the grant amount is always derived server-side.
pub struct PdaService {
    store: SharedStore<Pda>,
    subsidy: SubsidyConfig,
}

impl PdaService {
    pub fn new(store: SharedStore<Pda>, subsidy: SubsidyConfig) -> Self {
        Self { store, subsidy }
    }

    pub fn grant_ratio(&self) -> f64 {
        self.subsidy.grant_ratio
    }

    pub async fn list(&self, user: &CurrentUser) -> Result<Vec<Pda>, ApiError> {
        Ok(self.store.list(&visible_records(user)).await?)
    }

    pub async fn get(&self, user: &CurrentUser, id: &str) -> Result<Pda, ApiError> {
        let pda = self
            .store
            .fetch(id)
            .await?
            .ok_or(ApiError::NotFound("pda"))?;
        ensure_owner_or_admin(user, &pda.created_by)?;
        Ok(pda)
    }

    pub async fn create(&self, user: &CurrentUser, draft: PdaDraft) -> Result<Pda, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let now = Utc::now();
        let pda = Pda {
            id: Uuid::new_v4().to_string(),
            grant_amount: grant_amount(draft.estimated_cost, self.subsidy.grant_ratio),
            content: draft,
            created_by: user.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert(pda).await?;
        info!(
            pda_id = %stored.id,
            created_by = %stored.created_by,
            grant_amount = stored.grant_amount,
            "pda created"
        );
        Ok(stored)
    }

    pub async fn update(
        &self,
        user: &CurrentUser,
        id: &str,
        draft: PdaDraft,
    ) -> Result<Pda, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let existing = self.get(user, id).await?;
        let updated = Pda {
            grant_amount: grant_amount(draft.estimated_cost, self.subsidy.grant_ratio),
            content: draft,
            updated_at: Utc::now(),
            ..existing
        };

        self.store
            .replace(updated.clone())
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ApiError::NotFound("pda"),
                other => ApiError::Repository(other),
            })?;
        info!(pda_id = %id, updated_by = %user.id, "pda updated");
        Ok(updated)
    }

    pub async fn delete(&self, user: &CurrentUser, id: &str) -> Result<(), ApiError> {
        self.get(user, id).await?;
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound("pda"));
        }
        info!(pda_id = %id, deleted_by = %user.id, "pda deleted");
        Ok(())
    }
}
