//! Admin session endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    extract::{AdminSession, ApiJson},
    ApiError, AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Exchange the admin password for a session token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.admin.login(&body.password).await?;
    Ok(Json(SessionResponse {
        token: session.token,
        expires_in_secs: session.expires_in.as_secs(),
    }))
}

pub async fn logout(session: AdminSession, State(state): State<AppState>) -> StatusCode {
    state.admin.logout(&session.token).await;
    StatusCode::NO_CONTENT
}
