use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Router;

use super::domain::{
    EmailUpdate, LoginRequest, NewUser, PasswordUpdate, ProfileUpdate, RegistrationRequest,
    Session, UserUpdate, UserView,
};
use super::extractor::CurrentUser;
use crate::access::ensure_admin;
use crate::app::AppContext;
use crate::http::{ApiError, ApiResponse, JsonBody};

/// Authentication, self-service account and user administration endpoints.
pub fn account_router() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/account/profile", put(profile_handler))
        .route("/api/account/email", put(email_handler))
        .route("/api/account/password", put(password_handler))
        .route("/api/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/api/users/:user_id",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
}

pub(crate) async fn register_handler(
    State(ctx): State<AppContext>,
    JsonBody(request): JsonBody<RegistrationRequest>,
) -> Result<ApiResponse<Session>, ApiError> {
    let password = request.password.clone();
    let user = ctx.accounts.register(request).await?;
    let session = ctx
        .accounts
        .login(LoginRequest {
            email: user.email,
            password,
        })
        .await?;
    Ok(ApiResponse::created(session, "account created"))
}

pub(crate) async fn login_handler(
    State(ctx): State<AppContext>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<ApiResponse<Session>, ApiError> {
    let session = ctx.accounts.login(request).await?;
    Ok(ApiResponse::ok(session).with_message("login successful"))
}

pub(crate) async fn me_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> Result<ApiResponse<UserView>, ApiError> {
    let account = ctx.accounts.get(&user.id).await?;
    Ok(ApiResponse::ok(account.view()))
}

pub(crate) async fn profile_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<ApiResponse<UserView>, ApiError> {
    let account = ctx.accounts.update_profile(&user.id, update).await?;
    Ok(ApiResponse::ok(account.view()).with_message("profile updated"))
}

pub(crate) async fn email_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(update): JsonBody<EmailUpdate>,
) -> Result<ApiResponse<UserView>, ApiError> {
    let account = ctx.accounts.update_email(&user.id, update).await?;
    Ok(ApiResponse::ok(account.view()).with_message("email updated"))
}

pub(crate) async fn password_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(update): JsonBody<PasswordUpdate>,
) -> Result<ApiResponse<()>, ApiError> {
    ctx.accounts.update_password(&user.id, update).await?;
    Ok(ApiResponse::message("password updated"))
}

pub(crate) async fn list_users_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> Result<ApiResponse<Vec<UserView>>, ApiError> {
    ensure_admin(&user)?;
    let users = ctx.accounts.list().await?;
    Ok(ApiResponse::ok(users.iter().map(|u| u.view()).collect()))
}

pub(crate) async fn create_user_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(request): JsonBody<NewUser>,
) -> Result<ApiResponse<UserView>, ApiError> {
    ensure_admin(&user)?;
    let created = ctx.accounts.create(request).await?;
    Ok(ApiResponse::created(created.view(), "user created"))
}

pub(crate) async fn get_user_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<UserView>, ApiError> {
    ensure_admin(&user)?;
    let account = ctx.accounts.get(&user_id).await?;
    Ok(ApiResponse::ok(account.view()))
}

pub(crate) async fn update_user_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(user_id): Path<String>,
    JsonBody(update): JsonBody<UserUpdate>,
) -> Result<ApiResponse<UserView>, ApiError> {
    ensure_admin(&user)?;
    let account = ctx.accounts.update(&user_id, update).await?;
    Ok(ApiResponse::ok(account.view()).with_message("user updated"))
}

pub(crate) async fn delete_user_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    ensure_admin(&user)?;
    ctx.accounts.delete(&user.id, &user_id).await?;
    Ok(ApiResponse::message("user deleted"))
}
