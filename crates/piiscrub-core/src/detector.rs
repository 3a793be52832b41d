use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::policy::{self, SanitizerPolicy};
use crate::types::PiiCategory;

/// Path reported for a string scanned at the root of the input
pub const ROOT_PATH: &str = "$";

/// Why a field was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// The record key classified against the field table
    FieldName,
    /// The string value contained a content-pattern match
    Content,
    /// The value was nested beyond the policy's max depth
    DepthLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: String,
    pub category: PiiCategory,
    pub reason: MatchReason,
}

/// Outcome of a detection walk.
///
/// `fields` lists offending paths in traversal order; `findings` carries the
/// category and reason behind each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    pub has_pii: bool,
    pub fields: Vec<String>,
    pub findings: Vec<Finding>,
}

impl DetectionResult {
    fn record(&mut self, path: &str, categories: &[PiiCategory], reason: MatchReason) {
        let path = if path.is_empty() { ROOT_PATH } else { path };
        self.has_pii = true;
        self.fields.push(path.to_string());
        for &category in categories {
            self.findings.push(Finding {
                path: path.to_string(),
                category,
                reason,
            });
        }
    }

    /// Distinct categories found, in first-seen order
    pub fn categories(&self) -> Vec<PiiCategory> {
        let mut seen = Vec::new();
        for finding in &self.findings {
            if !seen.contains(&finding.category) {
                seen.push(finding.category);
            }
        }
        seen
    }
}

/// Read-only counterpart of the redactor: same traversal, no output tree.
#[derive(Debug, Clone)]
pub struct Detector {
    policy: Arc<SanitizerPolicy>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(policy::shared_default())
    }
}

impl Detector {
    pub fn new(policy: Arc<SanitizerPolicy>) -> Self {
        Self { policy }
    }

    /// Walk `value` and collect every field that would be redacted.
    pub fn detect(&self, value: &Value) -> DetectionResult {
        let mut result = DetectionResult::default();
        self.traverse(value, "", 0, &mut result);
        result
    }

    fn traverse(&self, value: &Value, path: &str, depth: usize, result: &mut DetectionResult) {
        if depth > self.policy.max_depth() {
            tracing::warn!(path, depth, "value nested beyond max depth reported as PII");
            result.record(path, &[PiiCategory::Generic], MatchReason::DepthLimit);
            return;
        }

        match value {
            Value::String(text) => {
                let detections = self.policy.scan_text(text);
                if !detections.is_empty() {
                    let mut categories: Vec<PiiCategory> = Vec::new();
                    for detection in &detections {
                        if !categories.contains(&detection.category) {
                            categories.push(detection.category);
                        }
                    }
                    result.record(path, &categories, MatchReason::Content);
                }
            }
            Value::Object(map) => {
                for (key, val) in map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    match self.policy.classify_field(key) {
                        Some(category) => {
                            result.record(&child_path, &[category], MatchReason::FieldName)
                        }
                        None => self.traverse(val, &child_path, depth + 1, result),
                    }
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let child_path = format!("{path}[{idx}]");
                    self.traverse(item, &child_path, depth + 1, result);
                }
            }
            // Numbers, booleans, null - nothing to scan
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}
