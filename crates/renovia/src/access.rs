//! Role and ownership checks shared by every record type.

use crate::accounts::CurrentUser;
use crate::http::ApiError;
use crate::store::Filter;

pub fn ensure_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("administrator access required"))
    }
}

/// Admins may act on any record, agents only on their own.
pub fn ensure_owner_or_admin(user: &CurrentUser, created_by: &str) -> Result<(), ApiError> {
    if user.is_admin() || user.id == created_by {
        Ok(())
    } else {
        Err(ApiError::Forbidden("you do not have access to this record"))
    }
}

/// Listing scope: everything for admins, own records for agents.
pub fn visible_records(user: &CurrentUser) -> Filter {
    if user.is_admin() {
        Filter::all()
    } else {
        Filter::all().eq("createdBy", user.id.clone())
    }
}
