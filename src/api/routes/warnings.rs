//! Warning handlers.

use super::WarningsQuery;
use crate::api::AppState;
use crate::error::{ApiError, Error};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::LazyLock;

/// Accepted warning identifier shape
static WARNING_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").ok());

fn is_valid_warning_id(id: &str) -> bool {
    WARNING_ID_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(id))
}

/// GET /warnings - Identifiers of active warnings in a state
#[utoipa::path(
    get,
    path = "/warnings",
    tag = "warnings",
    params(WarningsQuery),
    responses(
        (status = 200, description = "Identifiers of active warnings", body = Vec<crate::types::WarningId>),
        (status = 400, description = "Missing state parameter", body = ApiError),
        (status = 404, description = "No warnings for the state", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_warnings(
    State(state): State<AppState>,
    Query(query): Query<WarningsQuery>,
) -> Response {
    let Some(region) = query.state.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("State query parameter is required")),
        )
            .into_response();
    };

    let ids = state.service.list_warnings(&region).await;
    if ids.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                "not_found",
                "No warnings found for the specified state",
            )),
        )
            .into_response();
    }

    (StatusCode::OK, Json(ids.as_slice())).into_response()
}

/// GET /warning/:id - Decoded detail of one warning
#[utoipa::path(
    get,
    path = "/warning/{id}",
    tag = "warnings",
    params(
        ("id" = String, Path, description = "Warning identifier, e.g. IDV60000")
    ),
    responses(
        (status = 200, description = "Warning detail", body = crate::types::WarningDetail),
        (status = 400, description = "Invalid warning identifier", body = ApiError),
        (status = 404, description = "Warning not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn get_warning(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if !is_valid_warning_id(&id) {
        return Error::InvalidIdentifier(id).into_response();
    }

    match state.service.get_warning_detail(&id).await {
        Ok(Some(detail)) => (StatusCode::OK, Json(detail.as_ref())).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("warning {id}"))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Error fetching warning by id");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_id_validation() {
        assert!(is_valid_warning_id("IDV60000"));
        assert!(is_valid_warning_id("idq-20885"));
        assert!(!is_valid_warning_id(""));
        assert!(!is_valid_warning_id("IDV60000.amoc.xml"));
        assert!(!is_valid_warning_id("../etc"));
        assert!(!is_valid_warning_id("IDV 60000"));
    }
}
