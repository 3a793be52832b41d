//! TOML configuration for sanitizer policies.
//!
//! ```toml
//! max_depth = 32
//! strict_card_validation = true
//! disabled_categories = ["name"]
//! field_allowlist = ["fileName"]
//! text_allowlist = ["support@example.com"]
//!
//! [[field_rules]]
//! substring = "licensePlate"
//! category = "generic"
//!
//! [[content_patterns]]
//! name = "employee_id"
//! category = "generic"
//! pattern = '\bEMP-\d{6}\b'
//!
//! [placeholders]
//! email = "<email>"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SanitizeError};
use crate::patterns::{ContentPattern, PatternSet};
use crate::policy::{SanitizerPolicy, DEFAULT_MAX_DEPTH};
use crate::types::PiiCategory;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRuleConfig {
    pub substring: String,
    pub category: PiiCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentPatternConfig {
    pub name: String,
    pub category: PiiCategory,
    pub pattern: String,
}

/// Deserializable form of a [`SanitizerPolicy`]. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerConfig {
    pub max_depth: usize,
    pub strict_card_validation: bool,
    pub disabled_categories: Vec<PiiCategory>,
    /// Registered ahead of the built-in rules, in file order
    pub field_rules: Vec<FieldRuleConfig>,
    /// Appended after the built-in patterns
    pub content_patterns: Vec<ContentPatternConfig>,
    pub field_allowlist: Vec<String>,
    pub text_allowlist: Vec<String>,
    /// Category label (e.g. `email`, `auth_secret`) to content placeholder
    pub placeholders: BTreeMap<String, String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_card_validation: false,
            disabled_categories: Vec::new(),
            field_rules: Vec::new(),
            content_patterns: Vec::new(),
            field_allowlist: Vec::new(),
            text_allowlist: Vec::new(),
            placeholders: BTreeMap::new(),
        }
    }
}

impl SanitizerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            field_rules = config.field_rules.len(),
            content_patterns = config.content_patterns.len(),
            "loaded sanitizer configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SanitizeError::Config(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        if let Some(rule) = self.field_rules.iter().find(|r| r.substring.trim().is_empty()) {
            return Err(SanitizeError::Config(format!(
                "field rule for category {} has an empty substring",
                rule.category
            )));
        }
        if self.placeholders.is_empty() {
            return Ok(());
        }
        // A placeholder that itself matches a content pattern would be
        // redacted again on a second pass
        let patterns = PatternSet::builtin()?;
        for (label, placeholder) in &self.placeholders {
            label.parse::<PiiCategory>()?;
            if placeholder.is_empty() {
                return Err(SanitizeError::Config(format!(
                    "placeholder for {label} must not be empty"
                )));
            }
            if let Some(detection) = patterns.scan(placeholder).first() {
                return Err(SanitizeError::Config(format!(
                    "placeholder for {label} looks like {} data",
                    detection.category
                )));
            }
        }
        Ok(())
    }

    /// Compile into a policy; fails on the first invalid pattern.
    pub fn to_policy(&self) -> Result<SanitizerPolicy> {
        let mut builder = SanitizerPolicy::builder()
            .max_depth(self.max_depth)
            .strict_validation(self.strict_card_validation)
            .with_field_allowlist(self.field_allowlist.iter().map(String::as_str).collect())
            .with_text_allowlist(self.text_allowlist.iter().map(String::as_str).collect());

        for &category in &self.disabled_categories {
            builder = builder.disable(category);
        }
        for rule in &self.field_rules {
            builder = builder.with_field_rule(&rule.substring, rule.category);
        }
        for pattern in &self.content_patterns {
            let compiled =
                ContentPattern::compile(pattern.name.clone(), pattern.category, &pattern.pattern)?;
            builder = builder.with_content_pattern(compiled);
        }
        for (label, placeholder) in &self.placeholders {
            builder = builder.with_placeholder(label.parse()?, placeholder);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    const FULL: &str = r#"
max_depth = 8
strict_card_validation = true
disabled_categories = ["name"]
field_allowlist = ["fileName"]
text_allowlist = ["support@example.com"]

[[field_rules]]
substring = "licensePlate"
category = "generic"

[[content_patterns]]
name = "employee_id"
category = "generic"
pattern = '\bEMP-\d{6}\b'

[placeholders]
email = "<email>"
"#;

    #[test]
    fn test_empty_config_is_default() {
        let config = SanitizerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SanitizerConfig::default());
    }

    #[test]
    fn test_full_config_builds_policy() {
        let config = SanitizerConfig::from_toml_str(FULL).unwrap();
        let policy = config.to_policy().unwrap();

        assert_eq!(policy.max_depth(), 8);
        assert!(policy.requires_validation());
        assert!(!policy.is_enabled(PiiCategory::Name));
        assert_eq!(policy.classify_field("firstName"), None);
        assert_eq!(policy.classify_field("licensePlate"), Some(PiiCategory::Generic));
        assert_eq!(policy.classify_field("fileName"), None);
        assert_eq!(policy.placeholder_for(PiiCategory::Email), "<email>");
        assert_eq!(policy.scan_text("badge EMP-123456").len(), 1);
        assert!(policy.scan_text("mail support@example.com").is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SanitizerConfig::from_toml_str("max_dept = 3").unwrap_err();
        assert!(matches!(err, SanitizeError::Toml(_)));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = SanitizerConfig::from_toml_str(r#"disabled_categories = ["passport"]"#).unwrap_err();
        assert!(matches!(err, SanitizeError::Toml(_)));
    }

    #[test]
    fn test_unknown_placeholder_category_rejected() {
        let err = SanitizerConfig::from_toml_str("[placeholders]\nvin = \"<vin>\"").unwrap_err();
        assert!(matches!(err, SanitizeError::UnknownCategory(ref s) if s == "vin"));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = SanitizerConfig::from_toml_str("max_depth = 0").unwrap_err();
        assert!(matches!(err, SanitizeError::Config(_)));
    }

    #[test]
    fn test_empty_rule_substring_rejected() {
        let content = r#"
[[field_rules]]
substring = "  "
category = "generic"
"#;
        let err = SanitizerConfig::from_toml_str(content).unwrap_err();
        assert!(matches!(err, SanitizeError::Config(_)));
    }

    #[test_case("<a@b.co>" ; "email")]
    #[test_case("call 555-123-4567" ; "phone")]
    #[test_case("4111 1111 1111 1111" ; "card")]
    fn test_pii_shaped_placeholder_rejected(placeholder: &str) {
        let content = format!("[placeholders]\nemail = \"{placeholder}\"");
        let err = SanitizerConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, SanitizeError::Config(ref msg) if msg.contains("placeholder for email")));
    }

    #[test]
    fn test_invalid_pattern_reported_on_policy_build() {
        let content = r#"
[[content_patterns]]
name = "broken"
category = "generic"
pattern = '(\d{3}'
"#;
        let config = SanitizerConfig::from_toml_str(content).unwrap();
        let err = config.to_policy().unwrap_err();
        assert!(matches!(err, SanitizeError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = SanitizerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.field_rules.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SanitizerConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, SanitizeError::Io(_)));
    }
}
