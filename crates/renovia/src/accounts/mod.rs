//! User accounts: registration, login, bearer tokens and administration.

pub mod domain;
mod extractor;
pub mod password;
pub mod router;
pub mod service;
pub mod token;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    EmailUpdate, LoginRequest, NewUser, PasswordUpdate, ProfileUpdate, RegistrationRequest, Role,
    Session, User, UserUpdate, UserView,
};
pub use extractor::CurrentUser;
pub use router::account_router;
pub use service::{AccountError, AccountService};
pub use token::{Claims, TokenError, TokenKeys};
