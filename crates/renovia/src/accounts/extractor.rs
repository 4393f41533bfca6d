use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::async_trait;

use super::domain::Role;
use super::token::TokenKeys;
use crate::http::ApiError;

/// Authenticated caller, resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthorized("authentication required"))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("malformed authorization header"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(ApiError::Unauthorized("malformed authorization header"))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(ApiError::Unauthorized("malformed authorization header"));
    }
    Ok(token.trim())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<TokenKeys>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = Arc::<TokenKeys>::from_ref(state);
        let claims = keys.verify(bearer_token(parts)?)?;
        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::get("/api/expertises");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).expect("request builds").into_parts().0
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert!(bearer_token(&parts_with(None)).is_err());
        assert!(bearer_token(&parts_with(Some("Basic abc"))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer "))).is_err());
        assert!(bearer_token(&parts_with(Some("abc"))).is_err());
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc.def"))).expect("token"),
            "abc.def"
        );
        assert_eq!(
            bearer_token(&parts_with(Some("bearer  xyz"))).expect("token"),
            "xyz"
        );
    }
}
