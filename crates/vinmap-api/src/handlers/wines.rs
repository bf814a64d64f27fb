//! Wine catalog endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use vinmap_core::{Country, NewWine, Wine, WineFilter, WineUpdate};

use crate::{
    extract::{AdminSession, ApiJson, ApiPath, ApiQuery},
    ApiError, AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineListQuery {
    pub country: Option<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub in_stock_only: Option<bool>,
}

impl WineListQuery {
    fn filter(&self) -> WineFilter {
        WineFilter {
            price_min: self.price_min,
            price_max: self.price_max,
            in_stock_only: self.in_stock_only.unwrap_or(false),
        }
    }
}

/// List wines, newest first.
///
/// Query: `country`, `priceMin`, `priceMax`, `inStockOnly`.
pub async fn list_wines(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WineListQuery>,
) -> Result<Json<Vec<Wine>>, ApiError> {
    let country = query
        .country
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<Country>)
        .transpose()?;
    Ok(Json(state.wines.list(country, &query.filter()).await))
}

pub async fn get_wine(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Wine>, ApiError> {
    state
        .wines
        .by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Wine not found: {}", id)))
}

/// Create a wine.
///
/// # Returns
///
/// 201 with the stored record.
pub async fn create_wine(
    _session: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewWine>,
) -> Result<(StatusCode, Json<Wine>), ApiError> {
    let wine = state.wines.add(body).await?;
    Ok((StatusCode::CREATED, Json(wine)))
}

/// Apply a partial update; absent fields are left alone, `null` clears.
pub async fn update_wine(
    _session: AdminSession,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<WineUpdate>,
) -> Result<Json<Wine>, ApiError> {
    Ok(Json(state.wines.update(id, body).await?))
}

pub async fn delete_wine(
    _session: AdminSession,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.wines.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
