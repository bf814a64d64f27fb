//! # vinmap-inference
//!
//! AI enrichment for vinmap wine records.
//!
//! This crate provides:
//! - The gateway backend trait and a Messages API client
//! - Label image normalization (data URLs, media type sniffing)
//! - Prompt templates for label extraction and detail synthesis
//! - Extraction of the JSON object from free-form model replies
//! - The enrichment pipeline composing the steps
//!
//! # Example
//!
//! ```rust,no_run
//! use vinmap_inference::{enrich, AnthropicGateway, EnrichOptions, EnrichmentRequest};
//!
//! #[tokio::main]
//! async fn main() -> vinmap_core::Result<()> {
//!     let gateway = AnthropicGateway::from_env()?;
//!     let request = EnrichmentRequest {
//!         image: Some("/9j/4AAQSkZJRg==".to_string()),
//!         wine_name: Some("Chablis Premier Cru 2020".to_string()),
//!         api_key: Some(std::env::var("API_KEY").unwrap_or_default()),
//!         ..Default::default()
//!     };
//!     let details = enrich(&gateway, &request, &EnrichOptions::default()).await?;
//!     println!("{} / {}", details.name, details.winery);
//!     Ok(())
//! }
//! ```

pub mod extract;
pub mod gateway;
pub mod image;
pub mod pipeline;
pub mod prompts;
pub mod types;

pub use extract::{extract_json_object, parse_object, parse_reply};
pub use gateway::{AnthropicGateway, GatewayBackend, GatewayCall, GatewayConfig, ModelTier};
pub use image::ImagePayload;
pub use pipeline::{
    enrich, extract_label, forced_wine_type, synthesize_details, EnrichOptions, EnrichmentMode,
    EnrichmentRequest, LabelExtraction, SynthesisInput, WineDetails,
};
