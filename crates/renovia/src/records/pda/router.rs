use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use super::domain::{Pda, PdaDraft};
use crate::accounts::CurrentUser;
use crate::app::AppContext;
use crate::http::{ApiError, ApiResponse, JsonBody};
use crate::report::{pda_pdf, pdf_attachment};

/// Router builder exposing subsidy application CRUD and PDF export.
pub fn pda_router() -> Router<AppContext> {
    Router::new()
        .route("/api/pdas", get(list_handler).post(create_handler))
        .route(
            "/api/pdas/:pda_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/pdas/:pda_id/pdf", get(export_handler))
}

pub(crate) async fn list_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> Result<ApiResponse<Vec<Pda>>, ApiError> {
    Ok(ApiResponse::ok(ctx.pdas.list(&user).await?))
}

pub(crate) async fn get_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(pda_id): Path<String>,
) -> Result<ApiResponse<Pda>, ApiError> {
    Ok(ApiResponse::ok(ctx.pdas.get(&user, &pda_id).await?))
}

pub(crate) async fn create_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(draft): JsonBody<PdaDraft>,
) -> Result<ApiResponse<Pda>, ApiError> {
    let pda = ctx.pdas.create(&user, draft).await?;
    Ok(ApiResponse::created(pda, "pda created"))
}

pub(crate) async fn update_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(pda_id): Path<String>,
    JsonBody(draft): JsonBody<PdaDraft>,
) -> Result<ApiResponse<Pda>, ApiError> {
    let pda = ctx.pdas.update(&user, &pda_id, draft).await?;
    Ok(ApiResponse::ok(pda).with_message("pda updated"))
}

pub(crate) async fn delete_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(pda_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    ctx.pdas.delete(&user, &pda_id).await?;
    Ok(ApiResponse::message("pda deleted"))
}

pub(crate) async fn export_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(pda_id): Path<String>,
) -> Result<Response, ApiError> {
    let pda = ctx.pdas.get(&user, &pda_id).await?;
    let bytes = pda_pdf(&pda)?;
    Ok(pdf_attachment(format!("pda-{}.pdf", pda.id), bytes))
}
