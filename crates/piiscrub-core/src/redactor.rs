use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::classification::field_tag;
use crate::patterns::Detection;
use crate::policy::{self, SanitizerPolicy, MAX_DEPTH_TAG};

/// Structural redaction engine – walks a value and replaces sensitive leaves.
///
/// The input is never mutated; every call returns a fresh value of the same
/// shape.
#[derive(Debug, Clone)]
pub struct Redactor {
    policy: Arc<SanitizerPolicy>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(policy::shared_default())
    }
}

impl Redactor {
    pub fn new(policy: Arc<SanitizerPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SanitizerPolicy {
        &self.policy
    }

    /// Redact a structured value.
    ///
    /// - classified record keys: value replaced by `[REDACTED_<KEY>]`
    /// - strings: content matches replaced by their category placeholder
    /// - arrays and unclassified records: walked recursively, order kept
    /// - null, booleans, numbers: returned unchanged
    pub fn redact(&self, value: &Value) -> Value {
        self.redact_at(value, 0)
    }

    /// Redact PII from free text – returns Cow<str> for zero-copy when clean
    pub fn redact_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let detections = self.policy.scan_text(text);
        if detections.is_empty() {
            return Cow::Borrowed(text);
        }
        Cow::Owned(self.apply_redactions(text, &detections))
    }

    fn redact_at(&self, value: &Value, depth: usize) -> Value {
        if depth > self.policy.max_depth() {
            tracing::warn!(depth, "value nested beyond max depth replaced with sentinel");
            return Value::String(MAX_DEPTH_TAG.to_string());
        }

        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
            Value::String(text) => Value::String(self.redact_text(text).into_owned()),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.redact_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(self.redact_record(map, depth)),
        }
    }

    fn redact_record(&self, map: &Map<String, Value>, depth: usize) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| {
                let redacted = match self.policy.classify_field(key) {
                    Some(_) => Value::String(field_tag(key)),
                    None => self.redact_at(value, depth + 1),
                };
                (key.clone(), redacted)
            })
            .collect()
    }

    fn apply_redactions(&self, text: &str, detections: &[Detection]) -> String {
        let mut result = String::with_capacity(text.len());
        let mut last_idx = 0;

        for detection in detections {
            if detection.start > last_idx {
                result.push_str(&text[last_idx..detection.start]);
            }
            result.push_str(self.policy.placeholder_for(detection.category));
            last_idx = detection.end;
        }

        if last_idx < text.len() {
            result.push_str(&text[last_idx..]);
        }

        result
    }
}
