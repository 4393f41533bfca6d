use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use super::domain::{Expertise, ExpertiseDraft};
use crate::accounts::CurrentUser;
use crate::app::AppContext;
use crate::http::{ApiError, ApiResponse, JsonBody};
use crate::report::{expertise_pdf, pdf_attachment};

/// Router builder exposing expertise CRUD and PDF export.
pub fn expertise_router() -> Router<AppContext> {
    Router::new()
        .route("/api/expertises", get(list_handler).post(create_handler))
        .route(
            "/api/expertises/:expertise_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/expertises/:expertise_id/pdf", get(export_handler))
}

pub(crate) async fn list_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> Result<ApiResponse<Vec<Expertise>>, ApiError> {
    Ok(ApiResponse::ok(ctx.expertises.list(&user).await?))
}

pub(crate) async fn get_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(expertise_id): Path<String>,
) -> Result<ApiResponse<Expertise>, ApiError> {
    Ok(ApiResponse::ok(ctx.expertises.get(&user, &expertise_id).await?))
}

pub(crate) async fn create_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(draft): JsonBody<ExpertiseDraft>,
) -> Result<ApiResponse<Expertise>, ApiError> {
    let expertise = ctx.expertises.create(&user, draft).await?;
    Ok(ApiResponse::created(expertise, "expertise created"))
}

pub(crate) async fn update_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(expertise_id): Path<String>,
    JsonBody(draft): JsonBody<ExpertiseDraft>,
) -> Result<ApiResponse<Expertise>, ApiError> {
    let expertise = ctx.expertises.update(&user, &expertise_id, draft).await?;
    Ok(ApiResponse::ok(expertise).with_message("expertise updated"))
}

pub(crate) async fn delete_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(expertise_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    ctx.expertises.delete(&user, &expertise_id).await?;
    Ok(ApiResponse::message("expertise deleted"))
}

pub(crate) async fn export_handler(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(expertise_id): Path<String>,
) -> Result<Response, ApiError> {
    let expertise = ctx.expertises.get(&user, &expertise_id).await?;
    let bytes = expertise_pdf(&expertise)?;
    Ok(pdf_attachment(
        format!("expertise-{}.pdf", expertise.id),
        bytes,
    ))
}
