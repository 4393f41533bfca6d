use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;

use crate::accounts::{account_router, AccountService, TokenKeys};
use crate::config::{AuthConfig, SubsidyConfig};
use crate::records::expertise::{expertise_router, ExpertiseService};
use crate::records::pda::{pda_router, PdaService};
use crate::store::Stores;

/// Shared state handed to every API handler.
#[derive(Clone)]
pub struct AppContext {
    pub accounts: Arc<AccountService>,
    pub expertises: Arc<ExpertiseService>,
    pub pdas: Arc<PdaService>,
    pub tokens: Arc<TokenKeys>,
}

impl AppContext {
    pub fn new(stores: Stores, auth: &AuthConfig, subsidy: SubsidyConfig) -> Self {
        Self::with_tokens(stores, Arc::new(TokenKeys::from_config(auth)), subsidy)
    }

    pub fn with_tokens(stores: Stores, tokens: Arc<TokenKeys>, subsidy: SubsidyConfig) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(stores.users, tokens.clone())),
            expertises: Arc::new(ExpertiseService::new(stores.expertises)),
            pdas: Arc::new(PdaService::new(stores.pdas, subsidy)),
            tokens,
        }
    }
}

impl FromRef<AppContext> for Arc<TokenKeys> {
    fn from_ref(ctx: &AppContext) -> Self {
        ctx.tokens.clone()
    }
}

/// Every `/api` route, ready to be served or layered further.
pub fn api_router(ctx: AppContext) -> Router {
    Router::new()
        .merge(account_router())
        .merge(expertise_router())
        .merge(pda_router())
        .with_state(ctx)
}
