//! Field-name classification.
//!
//! Keys are normalized (trimmed, lower-cased) and matched by substring
//! against an ordered rule list. The first matching rule wins, so rules are
//! registered from most specific to most generic.

use std::borrow::Cow;

use crate::types::PiiCategory;

/// A single `(substring, category)` entry of the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    substring: Cow<'static, str>,
    category: PiiCategory,
}

impl ClassificationRule {
    /// Build a rule; the substring is normalized the same way keys are.
    pub fn new(substring: impl Into<Cow<'static, str>>, category: PiiCategory) -> Self {
        let substring = substring.into();
        let substring = if substring.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
            Cow::Owned(normalize_key(&substring))
        } else {
            substring
        };
        Self { substring, category }
    }

    const fn builtin(substring: &'static str, category: PiiCategory) -> Self {
        Self {
            substring: Cow::Borrowed(substring),
            category,
        }
    }

    pub fn substring(&self) -> &str {
        &self.substring
    }

    pub fn category(&self) -> PiiCategory {
        self.category
    }

    fn matches(&self, normalized_key: &str) -> bool {
        !self.substring.is_empty() && normalized_key.contains(self.substring.as_ref())
    }
}

// Most specific first. Secrets lead so that e.g. `emailToken` is treated as a
// credential rather than an address.
const BUILTIN_RULES: &[ClassificationRule] = &[
    ClassificationRule::builtin("password", PiiCategory::AuthSecret),
    ClassificationRule::builtin("passwd", PiiCategory::AuthSecret),
    ClassificationRule::builtin("secret", PiiCategory::AuthSecret),
    ClassificationRule::builtin("token", PiiCategory::AuthSecret),
    ClassificationRule::builtin("apikey", PiiCategory::AuthSecret),
    ClassificationRule::builtin("api_key", PiiCategory::AuthSecret),
    ClassificationRule::builtin("authorization", PiiCategory::AuthSecret),
    ClassificationRule::builtin("credential", PiiCategory::AuthSecret),
    ClassificationRule::builtin("cardnumber", PiiCategory::Card),
    ClassificationRule::builtin("card_number", PiiCategory::Card),
    ClassificationRule::builtin("creditcard", PiiCategory::Card),
    ClassificationRule::builtin("cvv", PiiCategory::Card),
    ClassificationRule::builtin("cvc", PiiCategory::Card),
    ClassificationRule::builtin("card", PiiCategory::Card),
    ClassificationRule::builtin("email", PiiCategory::Email),
    ClassificationRule::builtin("e_mail", PiiCategory::Email),
    ClassificationRule::builtin("phone", PiiCategory::Phone),
    ClassificationRule::builtin("mobile", PiiCategory::Phone),
    ClassificationRule::builtin("msisdn", PiiCategory::Phone),
    ClassificationRule::builtin("street", PiiCategory::Address),
    ClassificationRule::builtin("postal", PiiCategory::Address),
    ClassificationRule::builtin("zipcode", PiiCategory::Address),
    ClassificationRule::builtin("address", PiiCategory::Address),
    ClassificationRule::builtin("ssn", PiiCategory::Generic),
    ClassificationRule::builtin("passport", PiiCategory::Generic),
    ClassificationRule::builtin("nationalid", PiiCategory::Generic),
    ClassificationRule::builtin("national_id", PiiCategory::Generic),
    ClassificationRule::builtin("birth", PiiCategory::Generic),
    ClassificationRule::builtin("firstname", PiiCategory::Name),
    ClassificationRule::builtin("first_name", PiiCategory::Name),
    ClassificationRule::builtin("lastname", PiiCategory::Name),
    ClassificationRule::builtin("last_name", PiiCategory::Name),
    ClassificationRule::builtin("fullname", PiiCategory::Name),
    ClassificationRule::builtin("full_name", PiiCategory::Name),
    ClassificationRule::builtin("name", PiiCategory::Name),
];

/// Ordered, read-only list of classification rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTable {
    rules: Vec<ClassificationRule>,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ClassificationTable {
    /// Built-in rules covering contact details, payment data, names,
    /// addresses and credentials.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Insert `rules` ahead of the existing ones, keeping their relative order.
    pub fn prepend(&mut self, rules: impl IntoIterator<Item = ClassificationRule>) {
        let mut merged: Vec<ClassificationRule> = rules.into_iter().collect();
        merged.append(&mut self.rules);
        self.rules = merged;
    }

    pub fn push(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Drop every rule resolving to `category`.
    pub fn remove_category(&mut self, category: PiiCategory) {
        self.rules.retain(|rule| rule.category != category);
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// First rule whose substring occurs in the normalized key.
    pub fn matching_rule(&self, key: &str) -> Option<&ClassificationRule> {
        let normalized = normalize_key(key);
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }

    pub fn classify(&self, key: &str) -> Option<PiiCategory> {
        self.matching_rule(key).map(ClassificationRule::category)
    }
}

/// Trim and lower-case a record key.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Tag replacing the value of a classified field: derived from the original
/// key, not the resolved category (`phoneNumber` -> `[REDACTED_PHONENUMBER]`).
pub fn field_tag(key: &str) -> String {
    format!("[REDACTED_{}]", key.to_uppercase())
}
