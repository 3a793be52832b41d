use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use crate::classification::{normalize_key, ClassificationRule, ClassificationTable};
use crate::patterns::{ContentPattern, Detection, PatternSet};
use crate::types::PiiCategory;

/// Nesting depth beyond which values are replaced instead of traversed
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Sentinel written in place of subtrees nested deeper than `max_depth`
pub const MAX_DEPTH_TAG: &str = "[REDACTED_MAX_DEPTH]";

static SHARED_DEFAULT: LazyLock<Arc<SanitizerPolicy>> =
    LazyLock::new(|| Arc::new(SanitizerPolicy::default()));

/// Process-wide default policy, built on first use and shared thereafter.
pub fn shared_default() -> Arc<SanitizerPolicy> {
    Arc::clone(&SHARED_DEFAULT)
}

/// Sanitization policy – defines WHAT is sensitive and HOW it is tagged.
///
/// Immutable once built; share it behind an `Arc` between redactors,
/// detectors and loggers.
#[derive(Debug, Clone)]
pub struct SanitizerPolicy {
    /// Enabled categories (default: all)
    enabled_categories: BTreeSet<PiiCategory>,

    /// Ordered field-name rules, disabled categories already removed
    classification: ClassificationTable,

    /// Content patterns, disabled categories already removed
    patterns: PatternSet,

    /// Custom content placeholder per category (overrides defaults)
    placeholder_map: HashMap<PiiCategory, String>,

    /// Normalized keys that are never classified (e.g., "filename")
    field_allowlist: HashSet<String>,

    /// Terms never redacted inside free text (e.g., a support address)
    text_allowlist: Vec<String>,

    max_depth: usize,

    strict_validation: bool,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        Self {
            enabled_categories: PiiCategory::ALL.into_iter().collect(),
            classification: ClassificationTable::builtin(),
            patterns: PatternSet::builtin().expect("built-in content patterns must compile"),
            placeholder_map: HashMap::new(),
            field_allowlist: HashSet::new(),
            text_allowlist: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            strict_validation: false,
        }
    }
}

impl SanitizerPolicy {
    /// Builder pattern for ergonomic configuration
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn is_enabled(&self, category: PiiCategory) -> bool {
        self.enabled_categories.contains(&category)
    }

    /// Classify a record key, honouring the field allowlist.
    pub fn classify_field(&self, key: &str) -> Option<PiiCategory> {
        if !self.field_allowlist.is_empty() && self.field_allowlist.contains(&normalize_key(key)) {
            return None;
        }
        self.classification.classify(key)
    }

    /// Content placeholder for a category
    pub fn placeholder_for(&self, category: PiiCategory) -> &str {
        self.placeholder_map
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| category.placeholder())
    }

    /// Sorted, non-overlapping content matches outside allowlisted terms
    pub fn scan_text(&self, text: &str) -> Vec<Detection> {
        self.patterns.scan_with_allowlist(text, &self.text_allowlist)
    }

    pub fn classification(&self) -> &ClassificationTable {
        &self.classification
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether card matches must pass the Luhn check
    pub fn requires_validation(&self) -> bool {
        self.strict_validation
    }
}

/// Builder for SanitizerPolicy – enables fluent configuration
#[derive(Default)]
pub struct PolicyBuilder {
    policy: SanitizerPolicy,
    custom_rules: Vec<ClassificationRule>,
}

impl PolicyBuilder {
    pub fn enable(mut self, category: PiiCategory) -> Self {
        self.policy.enabled_categories.insert(category);
        self
    }

    pub fn disable(mut self, category: PiiCategory) -> Self {
        self.policy.enabled_categories.remove(&category);
        self
    }

    pub fn with_placeholder(mut self, category: PiiCategory, placeholder: &str) -> Self {
        self.policy.placeholder_map.insert(category, placeholder.to_string());
        self
    }

    /// Register a field rule ahead of the built-in table. Custom rules keep
    /// the order in which they were added.
    pub fn with_field_rule(mut self, substring: &str, category: PiiCategory) -> Self {
        self.custom_rules
            .push(ClassificationRule::new(substring.to_string(), category));
        self
    }

    /// Replace the built-in classification table entirely.
    pub fn with_classification_table(mut self, table: ClassificationTable) -> Self {
        self.policy.classification = table;
        self
    }

    pub fn with_content_pattern(mut self, pattern: ContentPattern) -> Self {
        self.policy.patterns.push(pattern);
        self
    }

    /// Replace the built-in content patterns entirely.
    pub fn with_pattern_set(mut self, patterns: PatternSet) -> Self {
        self.policy.patterns = patterns;
        self
    }

    pub fn with_field_allowlist(mut self, keys: Vec<&str>) -> Self {
        self.policy.field_allowlist = keys.into_iter().map(normalize_key).collect();
        self
    }

    pub fn with_text_allowlist(mut self, terms: Vec<&str>) -> Self {
        self.policy.text_allowlist = terms.into_iter().map(String::from).collect();
        self
    }

    pub fn strict_validation(mut self, enabled: bool) -> Self {
        self.policy.strict_validation = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.policy.max_depth = depth;
        self
    }

    pub fn build(self) -> SanitizerPolicy {
        let Self {
            mut policy,
            custom_rules,
        } = self;

        policy.classification.prepend(custom_rules);
        for category in PiiCategory::ALL {
            if !policy.is_enabled(category) {
                policy.classification.remove_category(category);
                policy.patterns.remove_category(category);
            }
        }
        policy.patterns.set_strict_validation(policy.strict_validation);

        tracing::debug!(
            field_rules = policy.classification.rules().len(),
            content_patterns = policy.patterns.patterns().len(),
            max_depth = policy.max_depth,
            strict_validation = policy.strict_validation,
            "built sanitizer policy"
        );
        policy
    }
}
