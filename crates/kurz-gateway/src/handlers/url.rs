use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kurz_core::ShortCode;
use kurz_engine::{Resolved, StoreLookup};
use tracing::debug;

/// Response header naming where a redirect target was found.
pub const LOOKUP_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-lookup-source");

pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<Response> {
    let original_url = request.original_url.trim();
    if original_url.is_empty() {
        return Err(AppError::InvalidRequest("original_url must not be empty".into()));
    }

    let code = state.resolver().create_short_url(original_url).await?;
    let body = CreateUrlResponse {
        short_url: code.to_url(state.base_url()),
        short_code: code.into(),
        original_url: original_url.to_string(),
    };

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_code(short_code)?;
    let resolved = state.resolver().resolve(&code).await?;
    redirect(&code, resolved)
}

pub async fn indexed_redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_code(short_code)?;
    let resolved = state
        .resolver()
        .resolve_via_store_only(&code, StoreLookup::Indexed)
        .await?;
    redirect(&code, resolved)
}

pub async fn baseline_redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_code(short_code)?;
    let resolved = state
        .resolver()
        .resolve_via_store_only(&code, StoreLookup::Unindexed)
        .await?;
    redirect(&code, resolved)
}

/// A code that can never have been issued is reported as unknown.
pub(crate) fn parse_code(raw: String) -> Result<ShortCode> {
    ShortCode::new(raw).map_err(|e| {
        debug!(error = %e, "rejected malformed short code");
        AppError::NotFound
    })
}

fn redirect(code: &ShortCode, resolved: Resolved) -> Result<Response> {
    let location = HeaderValue::try_from(resolved.original_url).map_err(|_| {
        AppError::UnredirectableUrl {
            code: code.to_string(),
        }
    })?;

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, location),
            (
                LOOKUP_SOURCE_HEADER,
                HeaderValue::from_static(resolved.source.as_str()),
            ),
        ],
    )
        .into_response())
}
