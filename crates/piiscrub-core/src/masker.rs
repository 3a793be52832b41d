//! Partial masking for display strings.
//!
//! Unlike redaction, masking keeps a recognisable fragment (first letter of
//! an email, last four digits of a phone or card). Inputs shorter than the
//! rule's minimum length are returned verbatim. Lengths are counted in
//! characters.

use crate::types::PiiCategory;

const SECRET_MASK: &str = "********";

/// Per-category formatter plus the length below which it is skipped.
#[derive(Debug, Clone, Copy)]
pub struct MaskRule {
    pub min_len: usize,
    format: fn(&str) -> String,
}

impl MaskRule {
    pub fn for_category(category: PiiCategory) -> Self {
        match category {
            PiiCategory::Email => Self { min_len: 3, format: mask_email },
            PiiCategory::Phone => Self { min_len: 4, format: mask_phone },
            PiiCategory::Card => Self { min_len: 4, format: mask_card },
            PiiCategory::Name => Self { min_len: 2, format: mask_name },
            PiiCategory::Address | PiiCategory::Generic => Self {
                min_len: 4,
                format: mask_leading,
            },
            // Secrets never reveal a character, whatever their length
            PiiCategory::AuthSecret => Self { min_len: 0, format: mask_secret },
        }
    }

    pub fn apply(&self, value: &str) -> String {
        if value.chars().count() < self.min_len {
            return value.to_string();
        }
        (self.format)(value)
    }
}

/// Mask a single value for display according to its category.
pub fn mask_for_display(value: &str, category: PiiCategory) -> String {
    MaskRule::for_category(category).apply(value)
}

fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => format!("***@{domain}"),
        },
        None => mask_leading(value),
    }
}

fn mask_phone(value: &str) -> String {
    format!("***-***-{}", last_chars(value, 4))
}

fn mask_card(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let tail = if digits.len() >= 4 {
        last_chars(&digits, 4)
    } else {
        last_chars(value, 4)
    };
    format!("****-****-****-{tail}")
}

fn mask_name(value: &str) -> String {
    value
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .map(|first| format!("{first}***"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn mask_leading(value: &str) -> String {
    match value.chars().next() {
        Some(first) => format!("{first}***"),
        None => String::new(),
    }
}

fn mask_secret(_value: &str) -> String {
    SECRET_MASK.to_string()
}

fn last_chars(value: &str, n: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(n)).collect()
}
