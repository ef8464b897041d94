use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a tracked record is absent from a published sitemap.
///
/// The variants form a fixed triage taxonomy evaluated in declaration
/// order; the first matching rule wins. Operators key their runbooks off
/// the serialized names, so the strings are load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Slug is null or trims to the empty string.
    EmptyOrNull,
    /// Another record shares the same `(page_type, slug)` pair.
    DuplicateInStore,
    /// Slug contains a character outside `[A-Za-z0-9_-]`.
    InvalidCharacters,
    /// Slug contains one of `< > & ' "`.
    XmlUnsafeCharacters,
    /// Slug is longer than 200 characters.
    TooLong,
    /// Slug starts with a dash.
    LeadingDash,
    /// No rule matched, yet the URL is missing from the sitemap. Signals a
    /// logic gap rather than a data problem.
    Unknown,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::EmptyOrNull => "empty_or_null",
            ExclusionReason::DuplicateInStore => "duplicate_in_store",
            ExclusionReason::InvalidCharacters => "invalid_characters",
            ExclusionReason::XmlUnsafeCharacters => "xml_unsafe_characters",
            ExclusionReason::TooLong => "too_long",
            ExclusionReason::LeadingDash => "leading_dash",
            ExclusionReason::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_names_are_stable() {
        let json = serde_json::to_string(&ExclusionReason::EmptyOrNull).unwrap();
        assert_eq!(json, "\"empty_or_null\"");
        assert_eq!(
            ExclusionReason::XmlUnsafeCharacters.to_string(),
            "xml_unsafe_characters"
        );
    }
}
