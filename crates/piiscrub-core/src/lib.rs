//! Rule-based PII sanitization for structured values and free text.
//!
//! - **Classification**: record keys are matched by substring against an
//!   ordered table (`phoneNumber` hits the `phone` rule).
//! - **Content scanning**: strings are searched for email, phone and card
//!   shapes.
//! - **Redaction** replaces sensitive leaves with tags, **detection** reports
//!   where they are, **masking** builds partial display strings, and the
//!   **safe logger** redacts log context before it reaches a sink.
//!
//! This is best-effort redaction: known field names and known text patterns
//! are always caught, nothing more is promised.
//!
//! ```
//! use piiscrub_core::{contains_pii, mask_for_display, redact_pii, PiiCategory};
//! use serde_json::json;
//!
//! let redacted = redact_pii(&json!({"phoneNumber": "555-123-4567", "rideId": "ride_123"}));
//! assert_eq!(redacted, json!({"phoneNumber": "[REDACTED_PHONENUMBER]", "rideId": "ride_123"}));
//!
//! assert!(contains_pii(&json!({"note": "mail me at a@b.com"})).has_pii);
//! assert_eq!(mask_for_display("4111111111111111", PiiCategory::Card), "****-****-****-1111");
//! ```

pub mod classification;
pub mod config;
pub mod detector;
pub mod error;
pub mod logger;
pub mod masker;
pub mod patterns;
pub mod policy;
pub mod redactor;
pub mod types;

use serde_json::Value;

pub use classification::{field_tag, normalize_key, ClassificationRule, ClassificationTable};
pub use config::SanitizerConfig;
pub use detector::{DetectionResult, Detector, Finding, MatchReason};
pub use error::{Result, SanitizeError};
pub use logger::{create_safe_logger, LogSink, SafeLogger, TracingSink};
pub use masker::{mask_for_display, MaskRule};
pub use patterns::{ContentPattern, Detection, PatternSet, PiiDetector};
pub use policy::{PolicyBuilder, SanitizerPolicy, MAX_DEPTH_TAG};
pub use redactor::Redactor;
pub use types::PiiCategory;

/// Redact `value` with the default policy.
///
/// Absent values are handled by the caller: `opt.map(redact_pii)`.
pub fn redact_pii(value: &Value) -> Value {
    Redactor::default().redact(value)
}

/// Report every field of `value` the default policy considers sensitive.
pub fn contains_pii(value: &Value) -> DetectionResult {
    Detector::default().detect(value)
}
