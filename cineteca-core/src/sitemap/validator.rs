//! Pure classification of why a tracked record is absent from a sitemap.

use std::collections::HashMap;

use cineteca_model::{ExclusionReason, PageEntry};

/// Precomputed `(page_type, slug)` occurrence counts over the full record
/// set, so the duplicate check stays O(1) per record instead of a pairwise
/// scan.
#[derive(Debug, Default)]
pub struct SlugFrequency {
    counts: HashMap<(String, String), usize>,
}

impl SlugFrequency {
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a PageEntry>) -> Self {
        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        for entry in entries {
            if let Some(slug) = entry.slug.as_deref() {
                let key = (
                    entry.page_type.clone().unwrap_or_default(),
                    slug.to_string(),
                );
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    fn count(&self, page_type: &str, slug: &str) -> usize {
        self.counts
            .get(&(page_type.to_string(), slug.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

/// Assign exactly one exclusion reason to a record that did not make it
/// into a sitemap. Rules are evaluated in taxonomy order and the first
/// match wins: an empty slug reports as `empty_or_null` even though it
/// vacuously fails later rules too. Operators triage on these categories,
/// so the ordering is part of the contract.
pub fn classify_exclusion(
    entry: &PageEntry,
    freq: &SlugFrequency,
) -> ExclusionReason {
    let Some(raw) = entry.slug.as_deref() else {
        return ExclusionReason::EmptyOrNull;
    };
    if raw.trim().is_empty() {
        return ExclusionReason::EmptyOrNull;
    }

    let type_key = entry.page_type.as_deref().unwrap_or_default();
    if freq.count(type_key, raw) > 1 {
        return ExclusionReason::DuplicateInStore;
    }

    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return ExclusionReason::InvalidCharacters;
    }

    if raw.chars().any(|c| matches!(c, '<' | '>' | '&' | '\'' | '"')) {
        return ExclusionReason::XmlUnsafeCharacters;
    }

    if raw.chars().count() > 200 {
        return ExclusionReason::TooLong;
    }

    if raw.starts_with('-') {
        return ExclusionReason::LeadingDash;
    }

    // Nothing wrong with the data; the gap is in the generation logic.
    ExclusionReason::Unknown
}
