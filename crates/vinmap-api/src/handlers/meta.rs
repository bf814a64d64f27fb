//! Health and country table endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use vinmap_core::WineFilter;

use crate::{extract::ApiQuery, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub x: f32,
    pub y: f32,
    pub color: &'static str,
    pub wine_count: usize,
}

/// The static country table with wine counts under the filter.
pub async fn countries(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<WineFilter>,
) -> Json<Vec<CountryEntry>> {
    let counts = state.wines.count_by_country(&filter).await;
    let entries = counts
        .into_iter()
        .map(|(country, wine_count)| {
            let marker = country.marker();
            CountryEntry {
                code: country.code(),
                name: country.display_name(),
                x: marker.x,
                y: marker.y,
                color: marker.color,
                wine_count,
            }
        })
        .collect();
    Json(entries)
}
