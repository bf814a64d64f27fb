//! The enrichment pipeline.
//!
//! Two steps run sequentially against the gateway: label extraction reads
//! the bottle, then detail synthesis writes the catalog entry. The
//! single-shot mode skips the first step and runs synthesis on the strong
//! tier with the image attached.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use vinmap_core::defaults::{ENRICH_OUTPUT_LANGUAGE, ENV_ENRICH_MODE, ENV_ENRICH_OUTPUT_LANGUAGE};
use vinmap_core::{Country, Error, PipelineStep, Rating, Result, WineCategory};

use crate::extract::{parse_object, parse_reply};
use crate::gateway::{GatewayBackend, GatewayCall, ModelTier};
use crate::image::ImagePayload;
use crate::prompts::{
    detail_synthesis_prompt, label_extraction_prompt, SynthesisPrompt, RED_WORDS, ROSE_WORDS,
    WHITE_WORDS,
};

// =============================================================================
// TYPES
// =============================================================================

/// Pipeline variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentMode {
    /// Label extraction, then detail synthesis on the fast tier.
    #[default]
    TwoStep,
    /// One strong-tier call with the image.
    SingleShot,
}

impl fmt::Display for EnrichmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentMode::TwoStep => f.write_str("two-step"),
            EnrichmentMode::SingleShot => f.write_str("single-shot"),
        }
    }
}

impl FromStr for EnrichmentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "two-step" | "two_step" | "twostep" => Ok(EnrichmentMode::TwoStep),
            "single-shot" | "single_shot" | "singleshot" => Ok(EnrichmentMode::SingleShot),
            other => Err(Error::Config(format!(
                "unknown enrichment mode '{}', expected two-step or single-shot",
                other
            ))),
        }
    }
}

/// Pipeline settings shared by every invocation.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub mode: EnrichmentMode,
    /// Language for free-text output fields.
    pub output_language: String,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            mode: EnrichmentMode::default(),
            output_language: ENRICH_OUTPUT_LANGUAGE.to_string(),
        }
    }
}

impl EnrichOptions {
    pub fn from_env() -> Result<Self> {
        let mode = match std::env::var(ENV_ENRICH_MODE) {
            Ok(s) if !s.trim().is_empty() => s.parse()?,
            _ => EnrichmentMode::default(),
        };
        let output_language = std::env::var(ENV_ENRICH_OUTPUT_LANGUAGE)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ENRICH_OUTPUT_LANGUAGE.to_string());
        Ok(Self {
            mode,
            output_language,
        })
    }
}

/// Enrichment input as posted by the catalog UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub wine_name: Option<String>,
    #[serde(default)]
    pub reviews: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request override of the configured mode.
    #[serde(default)]
    pub mode: Option<EnrichmentMode>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EnrichmentRequest {
    pub fn api_key(&self) -> Option<&str> {
        present(&self.api_key)
    }

    pub fn image(&self) -> Option<&str> {
        present(&self.image)
    }

    pub fn wine_name(&self) -> Option<&str> {
        present(&self.wine_name)
    }

    pub fn reviews(&self) -> Option<&str> {
        present(&self.reviews)
    }
}

/// What step A read from the label. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelExtraction {
    #[serde(default, deserialize_with = "loose_string")]
    pub wine_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub winery: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub vintage: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub wine_type: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub grape_variety: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub other_text: Option<String>,
}

/// Strings, numbers (vintages) and blanks, normalized to a trimmed option.
fn loose_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(text_of(&Value::deserialize(d)?))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The synthesized description. Advisory: the operator reviews it before saving.
///
/// Ratings the AI left out are omitted so the caller's draft values stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WineDetails {
    pub name: String,
    pub winery: String,
    pub winery_info: String,
    pub country: Option<Country>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acidity: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Rating>,
    pub description: String,
}

impl WineDetails {
    /// Normalize a synthesis reply object.
    ///
    /// Ratings are clamped into range (missing stays `None`), unknown countries
    /// become `None` and a missing name falls back to `fallback_name`.
    pub fn from_object(obj: &Map<String, Value>, fallback_name: Option<&str>) -> Self {
        let field = |key: &str| obj.get(key).and_then(text_of);

        let country = field("country").and_then(|code| match code.parse::<Country>() {
            Ok(country) => Some(country),
            Err(_) => {
                warn!(
                    subsystem = "inference",
                    component = "pipeline",
                    country = %code,
                    "AI returned an unknown country code"
                );
                None
            }
        });

        Self {
            name: field("name")
                .or_else(|| fallback_name.map(str::to_string))
                .unwrap_or_default(),
            winery: field("winery").unwrap_or_default(),
            winery_info: field("wineryInfo").unwrap_or_default(),
            country,
            wine_type: field("wineType"),
            sweetness: rating_of(obj, "sweetness"),
            acidity: rating_of(obj, "acidity"),
            body: rating_of(obj, "body"),
            description: field("description").unwrap_or_default(),
        }
    }
}

fn rating_of(obj: &Map<String, Value>, key: &str) -> Option<Rating> {
    let raw = match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };

    match raw {
        Some(v) => {
            let rating = Rating::clamped(v);
            if i64::from(rating.get()) != v {
                warn!(
                    subsystem = "inference",
                    component = "pipeline",
                    field = key,
                    value = v,
                    clamped = rating.get(),
                    "AI rating out of range"
                );
            }
            Some(rating)
        }
        None => {
            debug!(
                subsystem = "inference",
                component = "pipeline",
                field = key,
                "AI rating missing"
            );
            None
        }
    }
}

// =============================================================================
// TYPE WORDS
// =============================================================================

fn name_has_word(name: &str, word: &str) -> bool {
    if word.is_ascii() || word == "rosé" {
        name.split(|c: char| !c.is_alphanumeric())
            .any(|token| token == word)
    } else {
        name.contains(word)
    }
}

/// Type fixed by a word in the wine name (e.g. "Blanc" means White).
pub fn forced_wine_type(name: &str) -> Option<WineCategory> {
    let name = name.to_lowercase();
    [
        (WineCategory::Rose, ROSE_WORDS),
        (WineCategory::White, WHITE_WORDS),
        (WineCategory::Red, RED_WORDS),
    ]
    .into_iter()
    .find(|(_, words)| words.iter().any(|w| name_has_word(&name, w)))
    .map(|(category, _)| category)
}

// =============================================================================
// STEPS
// =============================================================================

/// Step A: read the label.
pub async fn extract_label(
    gateway: &dyn GatewayBackend,
    api_key: &str,
    image: &ImagePayload,
    wine_name: Option<&str>,
) -> Result<LabelExtraction> {
    let step = PipelineStep::LabelExtraction;
    let start = Instant::now();
    debug!(subsystem = "inference", component = "pipeline", step = step.as_str(), "Step started");

    let prompt = label_extraction_prompt(wine_name);
    let reply = gateway
        .complete(GatewayCall {
            step,
            api_key,
            tier: ModelTier::Fast,
            image: Some(image),
            prompt: &prompt,
        })
        .await?;
    let label: LabelExtraction = parse_reply(step, &reply)?;

    debug!(
        subsystem = "inference",
        component = "pipeline",
        step = step.as_str(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Step finished"
    );
    Ok(label)
}

/// Inputs to step B.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub api_key: &'a str,
    pub label: Option<&'a LabelExtraction>,
    pub wine_name: Option<&'a str>,
    pub reviews: Option<&'a str>,
    /// Attached only in single-shot mode.
    pub image: Option<&'a ImagePayload>,
    pub output_language: &'a str,
}

/// Step B: write the catalog entry.
///
/// Runs as [`PipelineStep::SingleShot`] on the strong tier when an image is
/// attached, otherwise as [`PipelineStep::DetailSynthesis`] on the fast tier.
pub async fn synthesize_details(
    gateway: &dyn GatewayBackend,
    input: SynthesisInput<'_>,
) -> Result<WineDetails> {
    let (step, tier) = match input.image {
        Some(_) => (PipelineStep::SingleShot, ModelTier::Strong),
        None => (PipelineStep::DetailSynthesis, ModelTier::Fast),
    };
    let start = Instant::now();
    debug!(subsystem = "inference", component = "pipeline", step = step.as_str(), "Step started");

    let prompt = detail_synthesis_prompt(SynthesisPrompt {
        label: input.label,
        wine_name: input.wine_name,
        reviews: input.reviews,
        output_language: input.output_language,
    });
    let reply = gateway
        .complete(GatewayCall {
            step,
            api_key: input.api_key,
            tier,
            image: input.image,
            prompt: &prompt,
        })
        .await?;
    let obj = parse_object(step, &reply)?;

    let fallback_name = input
        .wine_name
        .or_else(|| input.label.and_then(|l| l.wine_name.as_deref()));
    let mut details = WineDetails::from_object(&obj, fallback_name);

    if let Some(forced) = fallback_name.and_then(forced_wine_type) {
        if details.wine_type.as_deref() != Some(forced.label()) {
            debug!(
                subsystem = "inference",
                component = "pipeline",
                ai_type = ?details.wine_type,
                forced = forced.label(),
                "Wine type overridden by name"
            );
            details.wine_type = Some(forced.label().to_string());
        }
    }

    debug!(
        subsystem = "inference",
        component = "pipeline",
        step = step.as_str(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Step finished"
    );
    Ok(details)
}

/// Run the whole pipeline for one request.
///
/// Missing key or image fails before any gateway call. Any step failure
/// aborts the run; no partial result is returned.
pub async fn enrich(
    gateway: &dyn GatewayBackend,
    request: &EnrichmentRequest,
    options: &EnrichOptions,
) -> Result<WineDetails> {
    let api_key = request
        .api_key()
        .ok_or_else(|| Error::Validation("API key is required".to_string()))?;
    let raw_image = request
        .image()
        .ok_or_else(|| Error::Validation("Image is required".to_string()))?;
    let image = ImagePayload::parse(raw_image)?;

    let mode = request.mode.unwrap_or(options.mode);
    let wine_name = request.wine_name();
    let reviews = request.reviews();
    let start = Instant::now();

    debug!(
        subsystem = "inference",
        component = "pipeline",
        op = "enrich",
        mode = %mode,
        name_anchored = wine_name.is_some(),
        media_type = %image.media_type,
        "Enrichment started"
    );

    let details = match mode {
        EnrichmentMode::TwoStep => {
            let label = extract_label(gateway, api_key, &image, wine_name).await?;
            synthesize_details(
                gateway,
                SynthesisInput {
                    api_key,
                    label: Some(&label),
                    wine_name,
                    reviews,
                    image: None,
                    output_language: &options.output_language,
                },
            )
            .await?
        }
        EnrichmentMode::SingleShot => {
            synthesize_details(
                gateway,
                SynthesisInput {
                    api_key,
                    label: None,
                    wine_name,
                    reviews,
                    image: Some(&image),
                    output_language: &options.output_language,
                },
            )
            .await?
        }
    };

    debug!(
        subsystem = "inference",
        component = "pipeline",
        op = "enrich",
        duration_ms = start.elapsed().as_millis() as u64,
        "Enrichment finished"
    );
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forced_wine_type() {
        assert_eq!(forced_wine_type("Chablis Blanc 2020"), Some(WineCategory::White));
        assert_eq!(forced_wine_type("Rosso di Montalcino"), Some(WineCategory::Red));
        assert_eq!(forced_wine_type("Whispering Angel Rosé"), Some(WineCategory::Rose));
        assert_eq!(forced_wine_type("마제스틱 화이트"), Some(WineCategory::White));
        assert_eq!(forced_wine_type("Barolo"), None);
    }

    #[test]
    fn test_forced_wine_type_needs_whole_words() {
        // "rot" inside Rothschild, "red" inside Redwood
        assert_eq!(forced_wine_type("Chateau Mouton Rothschild"), None);
        assert_eq!(forced_wine_type("Redwood Creek"), None);
        assert_eq!(forced_wine_type("Spätburgunder Rot"), Some(WineCategory::Red));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("two-step".parse::<EnrichmentMode>().unwrap(), EnrichmentMode::TwoStep);
        assert_eq!("Single_Shot".parse::<EnrichmentMode>().unwrap(), EnrichmentMode::SingleShot);
        assert!("three-step".parse::<EnrichmentMode>().is_err());
        assert_eq!(
            serde_json::from_value::<EnrichmentMode>(json!("single-shot")).unwrap(),
            EnrichmentMode::SingleShot
        );
    }

    #[test]
    fn test_blank_request_fields_count_as_absent() {
        let request: EnrichmentRequest = serde_json::from_value(json!({
            "image": "  ",
            "wineName": "",
            "apiKey": "sk"
        }))
        .unwrap();
        assert!(request.image().is_none());
        assert!(request.wine_name().is_none());
        assert_eq!(request.api_key(), Some("sk"));
    }

    #[test]
    fn test_label_accepts_numeric_vintage() {
        let label: LabelExtraction = serde_json::from_value(json!({
            "wineName": "Tignanello",
            "vintage": 2018,
            "region": null,
            "otherText": ""
        }))
        .unwrap();
        assert_eq!(label.vintage.as_deref(), Some("2018"));
        assert!(label.region.is_none());
        assert!(label.other_text.is_none());
    }

    #[test]
    fn test_details_normalization() {
        let obj = json!({
            "winery": "Antinori",
            "country": "ITALY",
            "sweetness": 9,
            "acidity": "4",
            "body": 0,
            "description": "Cherry and tobacco."
        });
        let details = WineDetails::from_object(obj.as_object().unwrap(), Some("Tignanello"));
        assert_eq!(details.name, "Tignanello");
        assert_eq!(details.country, Some(Country::Italy));
        assert_eq!(details.sweetness.map(Rating::get), Some(5));
        assert_eq!(details.acidity.map(Rating::get), Some(4));
        assert_eq!(details.body.map(Rating::get), Some(1));
        assert_eq!(details.winery_info, "");
    }

    #[test]
    fn test_details_unknown_country_and_missing_rating() {
        let obj = json!({ "name": "X", "country": "narnia" });
        let details = WineDetails::from_object(obj.as_object().unwrap(), None);
        assert!(details.country.is_none());
        assert!(details.sweetness.is_none());
        assert!(details.acidity.is_none());
        assert!(details.body.is_none());
    }

    #[test]
    fn test_details_serialize_camel_case() {
        let obj = json!({
            "name": "X",
            "wineryInfo": "Old estate",
            "country": "france",
            "body": 4
        });
        let details = WineDetails::from_object(obj.as_object().unwrap(), None);
        let v = serde_json::to_value(&details).unwrap();
        assert_eq!(v["wineryInfo"], "Old estate");
        assert_eq!(v["country"], "france");
        assert_eq!(v["body"], 4);
        assert!(v.get("sweetness").is_none());
        assert!(v.get("wineType").is_none());
    }
}
