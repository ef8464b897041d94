use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Person-family page subtype. Each kind owns a distinct URL prefix; any
/// literal outside the canonical set is carried verbatim so it can be
/// bucketed and reported on its own rather than silently merged into
/// `person`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Attore,
    Regista,
    Cast,
    Crew,
    Person,
    #[serde(untagged)]
    Other(String),
}

impl PersonKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "attore" | "actor" => PersonKind::Attore,
            "regista" | "director" => PersonKind::Regista,
            "cast" => PersonKind::Cast,
            "crew" => PersonKind::Crew,
            "person" => PersonKind::Person,
            other => PersonKind::Other(other.to_string()),
        }
    }

    /// URL prefix for this subtype. Unrecognized literals fall back to the
    /// generic person prefix.
    pub fn path_prefix(&self) -> &str {
        match self {
            PersonKind::Attore => "/attore",
            PersonKind::Regista => "/regista",
            PersonKind::Cast => "/cast",
            PersonKind::Crew => "/crew",
            PersonKind::Person | PersonKind::Other(_) => "/person",
        }
    }

    /// Stable key used to bucket records and label per-subtype counts.
    pub fn bucket_key(&self) -> &str {
        match self {
            PersonKind::Attore => "attore",
            PersonKind::Regista => "regista",
            PersonKind::Cast => "cast",
            PersonKind::Crew => "crew",
            PersonKind::Person => "person",
            PersonKind::Other(raw) => raw,
        }
    }
}

/// Content family of a tracked page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    Film,
    Serie,
    Person(PersonKind),
}

impl PageType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "film" => PageType::Film,
            "serie" => PageType::Serie,
            other => PageType::Person(PersonKind::parse(other)),
        }
    }

    pub fn path_prefix(&self) -> &str {
        match self {
            PageType::Film => "/film",
            PageType::Serie => "/serie",
            PageType::Person(kind) => kind.path_prefix(),
        }
    }
}

/// One row of the `generated_pages` table: a content URL the site has
/// served at least once. This subsystem reads these rows; the page-serving
/// collaborator owns `visit_count` and `last_visited_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPage {
    pub id: i64,
    pub slug: Option<String>,
    pub page_type: Option<String>,
    pub first_generated_at: DateTime<Utc>,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub visit_count: i64,
}

/// Bulk projection of a tracked page used by the sitemap pipeline. Both
/// fields are nullable at the store level; emptiness and missing types are
/// classified, never assumed away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub slug: Option<String>,
    pub page_type: Option<String>,
}

impl PageEntry {
    pub fn new(
        page_type: impl Into<Option<String>>,
        slug: impl Into<Option<String>>,
    ) -> Self {
        Self {
            slug: slug.into(),
            page_type: page_type.into(),
        }
    }

    /// Slug with surrounding whitespace removed; `None` when the column is
    /// null or trims to empty.
    pub fn trimmed_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }

    pub fn parsed_type(&self) -> Option<PageType> {
        self.page_type.as_deref().map(PageType::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_aliases_share_a_bucket() {
        assert_eq!(PersonKind::parse("actor"), PersonKind::Attore);
        assert_eq!(PersonKind::parse("attore"), PersonKind::Attore);
        assert_eq!(PersonKind::parse("director"), PersonKind::Regista);
        assert_eq!(PersonKind::parse("regista"), PersonKind::Regista);
    }

    #[test]
    fn unrecognized_type_keeps_its_literal_and_maps_to_person() {
        let kind = PersonKind::parse("webseries");
        assert_eq!(kind, PersonKind::Other("webseries".to_string()));
        assert_eq!(kind.path_prefix(), "/person");
        assert_eq!(kind.bucket_key(), "webseries");
    }

    #[test]
    fn page_type_prefixes() {
        assert_eq!(PageType::parse("film").path_prefix(), "/film");
        assert_eq!(PageType::parse("serie").path_prefix(), "/serie");
        assert_eq!(PageType::parse("cast").path_prefix(), "/cast");
        assert_eq!(PageType::parse("person").path_prefix(), "/person");
    }

    #[test]
    fn trimmed_slug_rejects_whitespace_only() {
        let entry = PageEntry::new("film".to_string(), "   ".to_string());
        assert_eq!(entry.trimmed_slug(), None);

        let entry =
            PageEntry::new("film".to_string(), " inception-2010-27205 ".to_string());
        assert_eq!(entry.trimmed_slug(), Some("inception-2010-27205"));
    }
}
