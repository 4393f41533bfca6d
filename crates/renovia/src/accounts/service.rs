use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::domain::{
    is_valid_email, normalize_email, EmailUpdate, LoginRequest, NewUser, PasswordUpdate,
    ProfileUpdate, RegistrationRequest, Role, Session, User, UserUpdate,
};
use super::password::{hash_password, verify_password, PasswordError};
use super::token::{TokenError, TokenKeys};
use crate::config::AdminSeed;
use crate::http::ApiError;
use crate::store::{Filter, RepositoryError, SharedStore};

const MIN_PASSWORD_LEN: usize = 8;

/// Account registration, login and administration over the `users` collection.
pub struct AccountService {
    users: SharedStore<User>,
    tokens: Arc<TokenKeys>,
}

impl AccountService {
    pub fn new(users: SharedStore<User>, tokens: Arc<TokenKeys>) -> Self {
        Self { users, tokens }
    }

    /// Self-service sign-up; always yields an agent account.
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, AccountError> {
        self.create(NewUser {
            name: request.name,
            email: request.email,
            password: request.password,
            role: Role::User,
        })
        .await
    }

    pub async fn create(&self, request: NewUser) -> Result<User, AccountError> {
        let name = required_name(&request.name)?;
        let email = self.available_email(&request.email, None).await?;
        validate_password(&request.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: hash_password(&request.password)?,
            role: request.role,
            avatar: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.users.insert(user).await.map_err(|err| match err {
            RepositoryError::Conflict => AccountError::EmailTaken,
            other => AccountError::Repository(other),
        })?;
        info!(user_id = %stored.id, role = stored.role.label(), "account created");
        Ok(stored)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Session, AccountError> {
        let email = normalize_email(&request.email);
        let user = self
            .users
            .find_one(&Filter::all().eq("email", email))
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(Session {
            token,
            user: user.view(),
        })
    }

    pub async fn get(&self, id: &str) -> Result<User, AccountError> {
        self.users.fetch(id).await?.ok_or(AccountError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<User>, AccountError> {
        Ok(self.users.list(&Filter::all()).await?)
    }

    pub async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<User, AccountError> {
        let mut user = self.get(id).await?;
        if let Some(name) = update.name {
            user.name = required_name(&name)?;
        }
        if let Some(avatar) = update.avatar {
            let avatar = avatar.trim().to_string();
            user.avatar = (!avatar.is_empty()).then_some(avatar);
        }
        self.save(user).await
    }

    pub async fn update_email(&self, id: &str, update: EmailUpdate) -> Result<User, AccountError> {
        let mut user = self.get(id).await?;
        if !verify_password(&update.current_password, &user.password_hash)? {
            return Err(AccountError::WrongPassword);
        }
        user.email = self.available_email(&update.email, Some(id)).await?;
        self.save(user).await
    }

    pub async fn update_password(
        &self,
        id: &str,
        update: PasswordUpdate,
    ) -> Result<(), AccountError> {
        let mut user = self.get(id).await?;
        if !verify_password(&update.current_password, &user.password_hash)? {
            return Err(AccountError::WrongPassword);
        }
        validate_password(&update.new_password)?;
        user.password_hash = hash_password(&update.new_password)?;
        self.save(user).await?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Administrator edit of another account.
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<User, AccountError> {
        let mut user = self.get(id).await?;
        if let Some(name) = update.name {
            user.name = required_name(&name)?;
        }
        if let Some(email) = update.email {
            user.email = self.available_email(&email, Some(id)).await?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        self.save(user).await
    }

    /// Records created by the deleted account are left in place.
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<(), AccountError> {
        if actor_id == id {
            return Err(AccountError::SelfDeletion);
        }
        if !self.users.delete(id).await? {
            return Err(AccountError::NotFound);
        }
        info!(user_id = %id, deleted_by = %actor_id, "account deleted");
        Ok(())
    }

    /// Creates the configured administrator unless the address is already registered.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<bool, AccountError> {
        let email = normalize_email(&seed.email);
        if self
            .users
            .find_one(&Filter::all().eq("email", email.clone()))
            .await?
            .is_some()
        {
            return Ok(false);
        }

        self.create(NewUser {
            name: seed.name.clone(),
            email,
            password: seed.password.clone(),
            role: Role::Admin,
        })
        .await?;
        Ok(true)
    }

    async fn save(&self, mut user: User) -> Result<User, AccountError> {
        user.updated_at = Utc::now();
        self.users.replace(user.clone()).await.map_err(|err| match err {
            RepositoryError::Conflict => AccountError::EmailTaken,
            RepositoryError::NotFound => AccountError::NotFound,
            other => AccountError::Repository(other),
        })?;
        Ok(user)
    }

    async fn available_email(
        &self,
        raw: &str,
        owner: Option<&str>,
    ) -> Result<String, AccountError> {
        let email = normalize_email(raw);
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidInput(
                "a valid email address is required".to_string(),
            ));
        }

        let existing = self
            .users
            .find_one(&Filter::all().eq("email", email.clone()))
            .await?;
        match existing {
            Some(user) if Some(user.id.as_str()) != owner => Err(AccountError::EmailTaken),
            _ => Ok(email),
        }
    }
}

fn required_name(raw: &str) -> Result<String, AccountError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AccountError::InvalidInput("name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("email address is already in use")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("user not found")]
    NotFound,
    #[error("administrators cannot delete their own account")]
    SelfDeletion,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AccountError> for ApiError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::InvalidInput(message) => ApiError::Validation(message),
            AccountError::EmailTaken
            | AccountError::WrongPassword
            | AccountError::SelfDeletion => ApiError::Validation(value.to_string()),
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized("invalid email or password")
            }
            AccountError::NotFound => ApiError::NotFound("user"),
            AccountError::Repository(err) => ApiError::Repository(err),
            AccountError::Password(err) => ApiError::from(err),
            AccountError::Token(err) => ApiError::from(err),
        }
    }
}
