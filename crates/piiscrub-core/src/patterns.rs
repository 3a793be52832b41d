use std::borrow::Cow;
use std::ops::RangeInclusive;

use regex::Regex;
use zeroize::Zeroize;

use crate::error::{Result, SanitizeError};
use crate::types::PiiCategory;

/// Content match with memory safety guarantees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub category: PiiCategory,
    pub start: usize,     // UTF-8 byte offset (NOT char index)
    pub end: usize,       // UTF-8 byte offset
    pub original: String, // Matched text – zeroized on drop
}

impl Detection {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

impl Zeroize for Detection {
    fn zeroize(&mut self) {
        self.original.zeroize();
    }
}

impl Drop for Detection {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Text-level detection contract shared by every content matcher
pub trait PiiDetector: Send + Sync {
    fn category(&self) -> PiiCategory;

    /// Detect PII in text.
    ///
    /// Returned spans MUST lie on UTF-8 boundaries; ordering and overlap
    /// are resolved by [`PatternSet`].
    fn detect(&self, text: &str) -> Vec<Detection>;

    /// Optional post-match validation (e.g., Luhn check for cards).
    /// Only consulted when strict validation is enabled.
    fn validate(&self, _candidate: &str) -> bool {
        true
    }
}

/// A named regex tagged with the category it detects.
#[derive(Debug, Clone)]
pub struct ContentPattern {
    name: Cow<'static, str>,
    category: PiiCategory,
    regex: Regex,
}

impl ContentPattern {
    pub fn new(name: impl Into<Cow<'static, str>>, category: PiiCategory, regex: Regex) -> Self {
        Self {
            name: name.into(),
            category,
            regex,
        }
    }

    /// Compile `pattern`, reporting failures against `name`.
    pub fn compile(
        name: impl Into<Cow<'static, str>>,
        category: PiiCategory,
        pattern: &str,
    ) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| SanitizeError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self::new(name, category, regex))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn detection(&self, text: &str, start: usize, end: usize) -> Detection {
        Detection {
            category: self.category,
            start,
            end,
            original: text[start..end].to_string(),
        }
    }
}

impl PiiDetector for ContentPattern {
    fn category(&self) -> PiiCategory {
        self.category
    }

    fn detect(&self, text: &str) -> Vec<Detection> {
        let mut detections = Vec::new();
        for m in self.regex.find_iter(text) {
            match self.category {
                PiiCategory::Phone => {
                    for (start, end) in phone_segments(m.as_str()) {
                        detections.push(self.detection(text, m.start() + start, m.start() + end));
                    }
                }
                _ => detections.push(self.detection(text, m.start(), m.end())),
            }
        }
        detections
    }

    fn validate(&self, candidate: &str) -> bool {
        match self.category {
            PiiCategory::Card => luhn_valid(candidate),
            _ => true,
        }
    }
}

// The regex crate matches in linear time. The email local part is left
// unbounded so a long address is never matched from the middle.
const EMAIL_PATTERN: &str =
    r"[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]{1,63}\.){1,8}[A-Za-z]{2,24}\b";

const CARD_PATTERN: &str = concat!(
    r"\b(?:\d{4}[ -]){3}\d{4}\b",
    r"|\b\d{4}[ -]\d{6}[ -]\d{5}\b",
    r"|\b\d{13,19}\b",
);

// Digit groups joined by `-`, `.` or a space; the digit count is checked by
// `phone_segments`.
const PHONE_PATTERN: &str = concat!(
    r"(?:\+\d{1,3}[ .-]?)?\(\d{1,4}\)(?:[ .-]?\d{1,4}){1,6}\b",
    r"|(?:\+|\b)\d{1,4}(?:[ .-]?\d{1,4}){1,7}\b",
);

/// Digits in a phone number, separators excluded
const PHONE_DIGITS: RangeInclusive<usize> = 7..=15;

fn digit_count(text: &str) -> usize {
    text.bytes().filter(u8::is_ascii_digit).count()
}

/// Split a phone candidate into byte ranges that each hold 7–15 digits.
///
/// A candidate with too many digits is usually several numbers separated by
/// spaces, so it is cut at spaces: a segment closes once it reaches the
/// minimum, and a short remainder joins the previous segment when it fits.
/// Runs longer than any phone number (e.g. card digits) are skipped.
fn phone_segments(candidate: &str) -> Vec<(usize, usize)> {
    let total = digit_count(candidate);
    if PHONE_DIGITS.contains(&total) {
        return vec![(0, candidate.len())];
    }
    if total < *PHONE_DIGITS.start() {
        return Vec::new();
    }

    let mut segments: Vec<(usize, usize, usize)> = Vec::new();
    let mut open: Option<(usize, usize, usize)> = None;
    let mut offset = 0;
    for chunk in candidate.split(' ') {
        let start = offset;
        let end = start + chunk.len();
        offset = end + 1;

        let digits = digit_count(chunk);
        if digits > *PHONE_DIGITS.end() {
            close_segment(&mut segments, open.take());
            continue;
        }
        let merged = match open.take() {
            Some((seg_start, _, seg_digits)) if seg_digits + digits <= *PHONE_DIGITS.end() => {
                (seg_start, end, seg_digits + digits)
            }
            previous => {
                close_segment(&mut segments, previous);
                (start, end, digits)
            }
        };
        if merged.2 >= *PHONE_DIGITS.start() {
            segments.push(merged);
            open = None;
        } else {
            open = Some(merged);
        }
    }
    close_segment(&mut segments, open);

    segments.into_iter().map(|(start, end, _)| (start, end)).collect()
}

fn close_segment(segments: &mut Vec<(usize, usize, usize)>, remainder: Option<(usize, usize, usize)>) {
    let Some((start, end, digits)) = remainder else {
        return;
    };
    if let Some(last) = segments.last_mut() {
        // Only a chunk directly after the segment may join it
        if last.1 + 1 == start && last.2 + digits <= *PHONE_DIGITS.end() {
            last.1 = end;
            last.2 += digits;
        }
    }
}

/// Ordered Content Pattern Set.
///
/// Registration order breaks ties between equally long matches at the same
/// offset, so cards are registered ahead of phone numbers.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<ContentPattern>,
    strict_validation: bool,
}

impl PatternSet {
    /// Built-in email, card and phone patterns
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            patterns: vec![
                ContentPattern::compile("email", PiiCategory::Email, EMAIL_PATTERN)?,
                ContentPattern::compile("card", PiiCategory::Card, CARD_PATTERN)?,
                ContentPattern::compile("phone", PiiCategory::Phone, PHONE_PATTERN)?,
            ],
            strict_validation: false,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            strict_validation: false,
        }
    }

    pub fn push(&mut self, pattern: ContentPattern) {
        self.patterns.push(pattern);
    }

    pub fn remove_category(&mut self, category: PiiCategory) {
        self.patterns.retain(|p| p.category != category);
    }

    pub fn set_strict_validation(&mut self, enabled: bool) {
        self.strict_validation = enabled;
    }

    pub fn patterns(&self) -> &[ContentPattern] {
        &self.patterns
    }

    /// Scan text with every pattern; returns sorted, non-overlapping detections.
    pub fn scan(&self, text: &str) -> Vec<Detection> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut detections = Vec::new();
        for pattern in &self.patterns {
            detections.extend(
                pattern
                    .detect(text)
                    .into_iter()
                    .filter(|d| !self.strict_validation || pattern.validate(&d.original)),
            );
        }
        Self::resolve_overlaps(detections)
    }

    /// Scan text, discarding detections that overlap any allowlisted term.
    pub fn scan_with_allowlist(&self, text: &str, allowlist: &[String]) -> Vec<Detection> {
        let detections = self.scan(text);
        if allowlist.is_empty() || detections.is_empty() {
            return detections;
        }

        let spans = allowlist_spans(text, allowlist);
        detections
            .into_iter()
            .filter(|d| !spans.iter().any(|&(start, end)| d.overlaps(start, end)))
            .collect()
    }

    /// Merge overlapping detections into their union. The merged span takes
    /// the category of the longest match; equal lengths keep the earlier one.
    fn resolve_overlaps(mut detections: Vec<Detection>) -> Vec<Detection> {
        detections.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.len().cmp(&a.len()))
        });

        let mut resolved: Vec<Detection> = Vec::with_capacity(detections.len());
        let mut longest = 0;
        for detection in detections {
            if let Some(current) = resolved.last_mut() {
                if detection.start < current.end {
                    if detection.len() > longest {
                        longest = detection.len();
                        current.category = detection.category;
                    }
                    if detection.end > current.end {
                        let tail = &detection.original[current.end - detection.start..];
                        current.original.push_str(tail);
                        current.end = detection.end;
                    }
                    continue;
                }
            }
            longest = detection.len();
            resolved.push(detection);
        }
        resolved
    }
}

fn allowlist_spans(text: &str, allowlist: &[String]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for term in allowlist.iter().filter(|t| !t.is_empty()) {
        for (start, _) in text.match_indices(term.as_str()) {
            spans.push((start, start + term.len()));
        }
    }
    spans
}

/// Luhn checksum over the digits of `candidate` (13–19 digits).
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn categories(text: &str) -> Vec<PiiCategory> {
        PatternSet::builtin()
            .unwrap()
            .scan(text)
            .iter()
            .map(|d| d.category)
            .collect()
    }

    #[test]
    fn test_builtin_patterns_compile() {
        let set = PatternSet::builtin().unwrap();
        let names: Vec<_> = set.patterns().iter().map(ContentPattern::name).collect();
        assert_eq!(names, vec!["email", "card", "phone"]);
    }

    #[test_case("john@example.com", PiiCategory::Email)]
    #[test_case("reach me at john.doe+rides@mail.example.co.uk", PiiCategory::Email)]
    #[test_case("555-123-4567", PiiCategory::Phone)]
    #[test_case("(555) 123-4567", PiiCategory::Phone)]
    #[test_case("+1 555.123.4567", PiiCategory::Phone)]
    #[test_case("+44 20 7946 0958", PiiCategory::Phone)]
    #[test_case("call 5551234567 now", PiiCategory::Phone)]
    #[test_case("0612 345 678", PiiCategory::Phone)]
    #[test_case("06 12 34 56 78", PiiCategory::Phone)]
    #[test_case("55-5123-4567", PiiCategory::Phone)]
    #[test_case("5551 234 567", PiiCategory::Phone)]
    #[test_case("555.123.45.67", PiiCategory::Phone)]
    #[test_case("555 1234567", PiiCategory::Phone)]
    #[test_case("555-1234", PiiCategory::Phone)]
    #[test_case("+1 (555) 123-4567", PiiCategory::Phone)]
    #[test_case("4111111111111111", PiiCategory::Card)]
    #[test_case("4111 1111 1111 1111", PiiCategory::Card)]
    #[test_case("4111-1111-1111-1111", PiiCategory::Card)]
    #[test_case("3782 822463 10005", PiiCategory::Card)]
    fn test_detects_single(text: &str, expected: PiiCategory) {
        assert_eq!(categories(text), vec![expected]);
    }

    #[test_case("ride_123")]
    #[test_case("completed")]
    #[test_case("2024-10-19T18:41:00Z")]
    #[test_case("order 42 shipped")]
    #[test_case("badge EMP-123456")]
    #[test_case("")]
    fn test_ignores_clean_text(text: &str) {
        assert!(categories(text).is_empty());
    }

    #[test]
    fn test_detects_multiple_in_order() {
        let found = categories("Contact john@example.com or call 555-123-4567");
        assert_eq!(found, vec![PiiCategory::Email, PiiCategory::Phone]);
    }

    #[test_case("0612 345 678")]
    #[test_case("555 1234567")]
    #[test_case("+44 20 7946 0958")]
    #[test_case("(555) 123-4567")]
    fn test_phone_match_covers_whole_number(text: &str) {
        let detections = PatternSet::builtin().unwrap().scan(text);
        assert_eq!(detections.len(), 1);
        assert_eq!((detections[0].start, detections[0].end), (0, text.len()));
    }

    #[test]
    fn test_adjacent_phone_numbers_split_into_two() {
        let text = "555-123-4567 555-987-6543";
        let detections = PatternSet::builtin().unwrap().scan(text);
        let spans: Vec<_> = detections.iter().map(|d| &text[d.start..d.end]).collect();
        assert_eq!(spans, vec!["555-123-4567", "555-987-6543"]);
    }

    #[test_case("5", vec![])]
    #[test_case("555-1234", vec![(0, 8)])]
    #[test_case("555 123 4567 555 987 6543", vec![(0, 12), (13, 25)])]
    #[test_case("555-1234 5678 9012 3456", vec![(0, 8), (9, 23)])]
    #[test_case("12345678901234567", vec![])]
    fn test_phone_segments(candidate: &str, expected: Vec<(usize, usize)>) {
        assert_eq!(phone_segments(candidate), expected);
    }

    #[test]
    fn test_long_email_local_part_matched_whole() {
        let text = format!("{}@example.com", "a".repeat(80));
        let detections = PatternSet::builtin().unwrap().scan(&text);
        assert_eq!(detections.len(), 1);
        assert_eq!((detections[0].start, detections[0].end), (0, text.len()));
    }

    #[test]
    fn test_detection_spans_are_byte_offsets() {
        let text = "café: 555-123-4567";
        let detections = PatternSet::builtin().unwrap().scan(text);
        assert_eq!(detections.len(), 1);
        assert_eq!(&text[detections[0].start..detections[0].end], "555-123-4567");
        assert_eq!(detections[0].original, "555-123-4567");
    }

    #[test]
    fn test_resolve_overlaps_merges_into_union() {
        let short = Detection {
            category: PiiCategory::Phone,
            start: 10,
            end: 20,
            original: "1234567890".to_string(),
        };
        let long = Detection {
            category: PiiCategory::Card,
            start: 12,
            end: 28,
            original: "4111111111111111".to_string(),
        };

        let resolved = PatternSet::resolve_overlaps(vec![short, long]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, PiiCategory::Card);
        assert_eq!((resolved[0].start, resolved[0].end), (10, 28));
        assert_eq!(resolved[0].original, "123456789011111111");
    }

    #[test]
    fn test_phone_prefix_merged_into_overlapping_card() {
        let text = "call 555-1234 5678 9012 3456";
        let detections = PatternSet::builtin().unwrap().scan(text);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].category, PiiCategory::Card);
        assert_eq!(&text[detections[0].start..], "555-1234 5678 9012 3456");
    }

    #[test]
    fn test_resolve_overlaps_keeps_disjoint() {
        let first = Detection {
            category: PiiCategory::Email,
            start: 0,
            end: 5,
            original: "a@b.c".to_string(),
        };
        let second = Detection {
            category: PiiCategory::Phone,
            start: 5,
            end: 12,
            original: "5551234".to_string(),
        };

        let resolved = PatternSet::resolve_overlaps(vec![second, first]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].start, 0);
        assert_eq!(resolved[1].start, 5);
    }

    #[test]
    fn test_strict_validation_rejects_non_luhn_cards() {
        let mut set = PatternSet::builtin().unwrap();
        set.set_strict_validation(true);

        let valid = set.scan("4111 1111 1111 1111");
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].category, PiiCategory::Card);

        // Fails Luhn, so only the phone-shaped halves remain
        let invalid = set.scan("4111 1111 1111 1112");
        assert!(invalid.iter().all(|d| d.category == PiiCategory::Phone));
        assert_eq!(invalid.len(), 2);
    }

    #[test]
    fn test_allowlist_suppresses_overlapping_matches() {
        let set = PatternSet::builtin().unwrap();
        let allowlist = vec!["support@example.com".to_string()];
        let detections =
            set.scan_with_allowlist("Email support@example.com or john@example.com", &allowlist);

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].original, "john@example.com");
    }

    #[test]
    fn test_custom_pattern() {
        let mut set = PatternSet::empty();
        set.push(ContentPattern::compile("employee_id", PiiCategory::Generic, r"\bEMP-\d{6}\b").unwrap());
        let detections = set.scan("assigned to EMP-004211");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].category, PiiCategory::Generic);
    }

    #[test]
    fn test_invalid_pattern_reports_name() {
        let err = ContentPattern::compile("broken", PiiCategory::Generic, r"(\d{3}").unwrap_err();
        assert!(matches!(err, SanitizeError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test_case("4111111111111111", true)]
    #[test_case("4111 1111 1111 1111", true)]
    #[test_case("5500 0000 0000 0004", true)]
    #[test_case("4111111111111112", false)]
    #[test_case("1234", false)]
    fn test_luhn(candidate: &str, expected: bool) {
        assert_eq!(luhn_valid(candidate), expected);
    }

    #[test]
    fn test_detection_zeroize_clears_original() {
        let mut detection = Detection {
            category: PiiCategory::Email,
            start: 0,
            end: 16,
            original: "john@example.com".to_string(),
        };
        detection.zeroize();
        assert!(detection.original.is_empty());
    }
}
