//! Label analysis endpoint.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use vinmap_inference::{enrich, EnrichmentRequest, WineDetails};

use crate::{extract::ApiJson, ApiError, AppState};

/// Analyze a bottle label and return draft wine details.
///
/// # Request Body
///
/// `{ image, wineName?, reviews?, apiKey, mode? }`. The image is raw base64
/// or a `data:` URL; `mode` is `two-step` (default) or `single-shot`.
///
/// # Returns
///
/// The synthesized details. The caller reviews them before saving a wine.
pub async fn analyze_wine(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EnrichmentRequest>,
) -> Result<Json<WineDetails>, ApiError> {
    let details = enrich(state.gateway.as_ref(), &request, &state.enrich).await?;

    info!(
        subsystem = "api",
        component = "analyze",
        op = "analyze_wine",
        name = %details.name,
        "Label analyzed"
    );
    Ok(Json(details))
}

/// Plain `OPTIONS` on the analysis route.
pub async fn analyze_options() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
