//! Structured logging field name constants for vinmap.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query by the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Unparseable gateway replies, failed persistence |
//! | WARN  | Gateway errors, values coerced into range |
//! | INFO  | Lifecycle events (startup, shutdown), migration progress |
//! | DEBUG | Pipeline step start/finish, config choices |
//! | TRACE | Prompt and response bodies |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "migrate"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gateway", "pipeline", "wine_store", "admin_gate", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "enrich", "extract_label", "synthesize_details", "backfill"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Wine UUID being operated on.
pub const WINE_ID: &str = "wine_id";

/// Pipeline step name.
pub const STEP: &str = "step";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or processed.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for a gateway request.
pub const MODEL: &str = "model";

/// HTTP status returned by the gateway.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
