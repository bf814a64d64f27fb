//! AI gateway client.
//!
//! The gateway is an external vision/LLM completion API speaking the
//! Messages wire format. The caller's API key is supplied per call; the
//! client itself holds no credentials.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, trace, warn};

use vinmap_core::defaults::{
    ENV_GATEWAY_BASE_URL, ENV_GATEWAY_FAST_MODEL, ENV_GATEWAY_MAX_TOKENS,
    ENV_GATEWAY_STRONG_MODEL, ENV_GATEWAY_TIMEOUT_SECS, GATEWAY_API_VERSION,
    GATEWAY_FALLBACK_ERROR, GATEWAY_FAST_MODEL, GATEWAY_MAX_TOKENS, GATEWAY_STRONG_MODEL,
    GATEWAY_TIMEOUT_SECS, GATEWAY_URL,
};
use vinmap_core::{Error, PipelineStep, Result};

use crate::image::ImagePayload;
use crate::types::*;

/// Which model tier a call runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Label extraction and detail synthesis.
    Fast,
    /// The single-shot variant.
    Strong,
}

/// One completion request: an optional image plus a text prompt.
#[derive(Debug, Clone, Copy)]
pub struct GatewayCall<'a> {
    pub step: PipelineStep,
    pub api_key: &'a str,
    pub tier: ModelTier,
    pub image: Option<&'a ImagePayload>,
    pub prompt: &'a str,
}

/// Backend able to answer a completion request with free-form text.
#[async_trait]
pub trait GatewayBackend: Send + Sync {
    /// Run one completion and return the reply text.
    ///
    /// Non-success statuses fail with [`Error::Gateway`] tagged with the
    /// call's step.
    async fn complete(&self, call: GatewayCall<'_>) -> Result<String>;

    /// Model name used for a tier.
    fn model_for(&self, tier: ModelTier) -> &str;
}

/// Configuration for the gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL; `/v1/messages` is appended.
    pub base_url: String,
    pub fast_model: String,
    pub strong_model: String,
    /// Output token budget per request.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: GATEWAY_URL.to_string(),
            fast_model: GATEWAY_FAST_MODEL.to_string(),
            strong_model: GATEWAY_STRONG_MODEL.to_string(),
            max_tokens: GATEWAY_MAX_TOKENS,
            timeout_secs: GATEWAY_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var(ENV_GATEWAY_BASE_URL).unwrap_or(defaults.base_url),
            fast_model: std::env::var(ENV_GATEWAY_FAST_MODEL).unwrap_or(defaults.fast_model),
            strong_model: std::env::var(ENV_GATEWAY_STRONG_MODEL)
                .unwrap_or(defaults.strong_model),
            max_tokens: std::env::var(ENV_GATEWAY_MAX_TOKENS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout_secs: std::env::var(ENV_GATEWAY_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Messages API client.
pub struct AnthropicGateway {
    client: Client,
    config: GatewayConfig,
}

impl AnthropicGateway {
    /// Create a new gateway client with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gateway",
            base_url = %config.base_url,
            fast_model = %config.fast_model,
            strong_model = %config.strong_model,
            "Initializing AI gateway client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

fn build_request(model: &str, max_tokens: u32, call: &GatewayCall<'_>) -> MessagesRequest {
    let mut content = Vec::with_capacity(2);
    if let Some(image) = call.image {
        content.push(ContentBlock::Image {
            source: ImageSource::base64(image.media_type.as_str(), image.data.as_str()),
        });
    }
    content.push(ContentBlock::Text {
        text: call.prompt.to_string(),
    });

    MessagesRequest {
        model: model.to_string(),
        max_tokens,
        messages: vec![Message {
            role: "user".to_string(),
            content,
        }],
    }
}

/// Gateway's error type and its own message, or the generic fallback.
fn error_details(body: &str) -> (Option<String>, String) {
    let error = serde_json::from_str::<ErrorResponse>(body).ok().map(|e| e.error);
    let error_type = error.as_ref().and_then(|e| e.error_type.clone());
    let message = error
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GATEWAY_FALLBACK_ERROR.to_string());
    (error_type, message)
}

#[async_trait]
impl GatewayBackend for AnthropicGateway {
    async fn complete(&self, call: GatewayCall<'_>) -> Result<String> {
        let model = self.model_for(call.tier);
        let request = build_request(model, self.config.max_tokens, &call);
        let start = Instant::now();

        debug!(
            subsystem = "inference",
            component = "gateway",
            step = call.step.as_str(),
            model,
            prompt_len = call.prompt.len(),
            with_image = call.image.is_some(),
            "Sending gateway request"
        );
        trace!(step = call.step.as_str(), prompt = call.prompt, "Gateway prompt");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", call.api_key)
            .header("anthropic-version", GATEWAY_API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} request failed: {}", call.step, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("{} response unreadable: {}", call.step, e)))?;

        if !status.is_success() {
            let (error_type, message) = error_details(&body);
            warn!(
                subsystem = "inference",
                component = "gateway",
                step = call.step.as_str(),
                status = status.as_u16(),
                error_type = error_type.as_deref().unwrap_or("unknown"),
                error = %message,
                "Gateway returned an error"
            );
            return Err(Error::Gateway {
                step: call.step,
                status: status.as_u16(),
                message,
            });
        }

        let parsed = serde_json::from_str::<MessagesResponse>(&body).ok();
        let text = parsed
            .as_ref()
            .and_then(|r| r.first_text().map(str::to_string))
            .ok_or_else(|| Error::ResponseFormat {
                step: call.step,
                raw: body.clone(),
            })?;
        let (served_model, stop_reason) = parsed
            .map(|r| (r.model, r.stop_reason))
            .unwrap_or_default();

        if stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                subsystem = "inference",
                component = "gateway",
                step = call.step.as_str(),
                max_tokens = self.config.max_tokens,
                "Gateway response truncated at max_tokens"
            );
        }

        debug!(
            subsystem = "inference",
            component = "gateway",
            step = call.step.as_str(),
            model,
            served_model = served_model.as_deref().unwrap_or(model),
            stop_reason = stop_reason.as_deref().unwrap_or("unknown"),
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Gateway request complete"
        );
        trace!(step = call.step.as_str(), response = %text, "Gateway response");

        Ok(text)
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Strong => &self.config.strong_model,
        }
    }
}
