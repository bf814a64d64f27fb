//! Centralized default constants for vinmap.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// AI GATEWAY
// =============================================================================

/// Base URL of the Messages API.
pub const GATEWAY_URL: &str = "https://api.anthropic.com";

/// API version header value sent with every gateway request.
pub const GATEWAY_API_VERSION: &str = "2023-06-01";

/// Fast tier, used for label extraction and detail synthesis.
pub const GATEWAY_FAST_MODEL: &str = "claude-3-5-haiku-20241022";

/// Strong tier, used for the single-shot variant.
pub const GATEWAY_STRONG_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Output token budget per gateway request.
pub const GATEWAY_MAX_TOKENS: u32 = 1024;

/// Gateway request timeout in seconds.
pub const GATEWAY_TIMEOUT_SECS: u64 = 120;

/// Media type assumed when an image carries no prefix and is not recognized.
pub const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// Language the free-text enrichment fields are written in.
pub const ENRICH_OUTPUT_LANGUAGE: &str = "Korean";

/// Message used when the gateway reports a failure without one.
pub const GATEWAY_FALLBACK_ERROR: &str = "AI analysis failed";

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Largest accepted request body (base64 images).
pub const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Lifetime of an admin session token in seconds.
pub const ADMIN_SESSION_TTL_SECS: u64 = 30 * 60;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_GATEWAY_BASE_URL: &str = "GATEWAY_BASE_URL";
pub const ENV_GATEWAY_FAST_MODEL: &str = "GATEWAY_FAST_MODEL";
pub const ENV_GATEWAY_STRONG_MODEL: &str = "GATEWAY_STRONG_MODEL";
pub const ENV_GATEWAY_MAX_TOKENS: &str = "GATEWAY_MAX_TOKENS";
pub const ENV_GATEWAY_TIMEOUT_SECS: &str = "GATEWAY_TIMEOUT_SECS";
pub const ENV_ENRICH_MODE: &str = "ENRICH_MODE";
pub const ENV_ENRICH_OUTPUT_LANGUAGE: &str = "ENRICH_OUTPUT_LANGUAGE";
pub const ENV_ADMIN_PASSWORD_HASH: &str = "ADMIN_PASSWORD_HASH";
pub const ENV_ADMIN_SESSION_TTL_SECS: &str = "ADMIN_SESSION_TTL_SECS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const ENV_STORAGE: &str = "STORAGE";
