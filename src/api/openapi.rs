//! OpenAPI documentation and schema generation
//!
//! Uses utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the flood-warnings REST API
///
/// Served at `/openapi.json`, and through `/swagger-ui` when enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "flood-warnings REST API",
        version = "0.1.0",
        description = "Active flood warnings and warning details from the Bureau of Meteorology public FTP repository",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Warnings
        crate::api::routes::list_warnings,
        crate::api::routes::get_warning,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::WarningId,
        crate::types::WarningInfo,
        crate::types::WarningDetail,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "warnings", description = "Flood warnings - List active warnings per state and fetch warning details"),
        (name = "system", description = "System endpoints - Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
