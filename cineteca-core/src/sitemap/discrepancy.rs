//! Comparison of the tracked record set against an already-published
//! sitemap, with a classified reason for every record missing from it.
//!
//! One parameterized pass handles every content family; the per-family
//! loop is invoked once per bucket rather than duplicated per type.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use cineteca_model::{ExclusionReason, PageEntry};

use super::builder::{parse_count_attr, parse_header, parse_published_slugs};
use super::reconcile::PartitionedPages;
use super::validator::{SlugFrequency, classify_exclusion};

/// A tracked record absent from the published document, annotated with
/// exactly one reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedPage {
    pub slug: Option<String>,
    pub page_type: Option<String>,
    pub reason: ExclusionReason,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDiscrepancy {
    /// Bucket key: `film`, `serie`, a person subtype, or an unrecognized
    /// literal type.
    pub family: String,
    pub path_prefix: String,
    pub tracked: u64,
    pub included: u64,
    pub excluded: Vec<ExcludedPage>,
}

/// Operator-facing discrepancy report over one published sitemap.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancyReport {
    /// Timestamp parsed from the generation header comment, when present.
    pub generated_at: Option<DateTime<Utc>>,
    /// URL count declared by the header comment.
    pub declared_count: Option<u64>,
    /// URL count declared by the root `count` attribute.
    pub count_attribute: Option<u64>,
    pub total_records: u64,
    pub included: u64,
    /// Records with a NULL `page_type`; reported separately, never merged
    /// into a person bucket.
    pub missing_type: u64,
    pub families: Vec<FamilyDiscrepancy>,
}

/// Compare the tracked record set against a published document. A record
/// counts as included iff its trimmed slug literally appears among the
/// slugs parsed for its family's path prefix; everything else receives one
/// reason from the fixed taxonomy.
pub fn reconcile_published(
    xml: &str,
    base_url: &str,
    entries: Vec<PageEntry>,
) -> DiscrepancyReport {
    let freq = SlugFrequency::build(entries.iter());
    let header = parse_header(xml);
    let count_attribute = parse_count_attr(xml);
    let published = parse_published_slugs(xml, base_url);
    let total_records = entries.len() as u64;

    let partition = PartitionedPages::partition(entries);

    let mut families = Vec::with_capacity(2 + partition.people.len());
    families.push(reconcile_family(
        "film",
        "/film",
        &partition.films,
        &published,
        &freq,
    ));
    families.push(reconcile_family(
        "serie",
        "/serie",
        &partition.series,
        &published,
        &freq,
    ));
    for bucket in &partition.people {
        families.push(reconcile_family(
            &bucket.key,
            bucket.kind.path_prefix(),
            &bucket.entries,
            &published,
            &freq,
        ));
    }

    let included = families.iter().map(|family| family.included).sum();

    DiscrepancyReport {
        generated_at: header.as_ref().and_then(|h| h.generated_at),
        declared_count: header.map(|h| h.url_count),
        count_attribute,
        total_records,
        included,
        missing_type: partition.missing_type,
        families,
    }
}

fn reconcile_family(
    family: &str,
    path_prefix: &str,
    entries: &[PageEntry],
    published: &HashMap<String, HashSet<String>>,
    freq: &SlugFrequency,
) -> FamilyDiscrepancy {
    let empty = HashSet::new();
    let slugs = published.get(path_prefix).unwrap_or(&empty);

    let mut included = 0u64;
    let mut excluded = Vec::new();
    for entry in entries {
        let found = entry
            .trimmed_slug()
            .map(|slug| slugs.contains(slug))
            .unwrap_or(false);

        if found {
            included += 1;
        } else {
            excluded.push(ExcludedPage {
                slug: entry.slug.clone(),
                page_type: entry.page_type.clone(),
                reason: classify_exclusion(entry, freq),
            });
        }
    }

    FamilyDiscrepancy {
        family: family.to_string(),
        path_prefix: path_prefix.to_string(),
        tracked: entries.len() as u64,
        included,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::builder::build_sitemap;

    const BASE: &str = "https://cineteca.example";

    fn entry(page_type: &str, slug: &str) -> PageEntry {
        PageEntry::new(page_type.to_string(), slug.to_string())
    }

    fn published_with(entries: Vec<PageEntry>) -> String {
        let partition = PartitionedPages::partition(entries);
        build_sitemap(BASE, &partition, Utc::now()).xml
    }

    #[test]
    fn matching_records_count_as_included() {
        let xml = published_with(vec![
            entry("film", "dune-2021-438631"),
            entry("serie", "dark-2017-70523"),
        ]);

        let report = reconcile_published(
            &xml,
            BASE,
            vec![
                entry("film", "dune-2021-438631"),
                entry("serie", "dark-2017-70523"),
            ],
        );

        assert_eq!(report.included, 2);
        assert!(report.families.iter().all(|f| f.excluded.is_empty()));
        assert_eq!(report.declared_count, Some(6));
        assert_eq!(report.count_attribute, Some(6));
        assert!(report.generated_at.is_some());
    }

    #[test]
    fn duplicates_missing_from_the_sitemap_both_classify_as_duplicates() {
        let xml = published_with(vec![entry("film", "heat-1995-949")]);

        let report = reconcile_published(
            &xml,
            BASE,
            vec![
                entry("film", "inception-2010-27205"),
                entry("film", "inception-2010-27205"),
                entry("film", "heat-1995-949"),
            ],
        );

        let film = &report.families[0];
        assert_eq!(film.family, "film");
        assert_eq!(film.included, 1);
        assert_eq!(film.excluded.len(), 2);
        assert!(
            film.excluded
                .iter()
                .all(|e| e.reason == ExclusionReason::DuplicateInStore)
        );
    }

    #[test]
    fn unrecognized_type_reconciles_under_the_person_prefix() {
        let xml = published_with(vec![entry("webseries", "pilot-run-2020-1")]);

        let report = reconcile_published(
            &xml,
            BASE,
            vec![
                entry("webseries", "pilot-run-2020-1"),
                entry("webseries", "lost-pilot-2021-2"),
            ],
        );

        let bucket = report
            .families
            .iter()
            .find(|f| f.family == "webseries")
            .unwrap();
        assert_eq!(bucket.path_prefix, "/person");
        assert_eq!(bucket.included, 1);
        assert_eq!(bucket.excluded.len(), 1);
        // clean slug, simply absent: a logic gap, not a data problem
        assert_eq!(bucket.excluded[0].reason, ExclusionReason::Unknown);
    }

    #[test]
    fn every_missing_record_gets_exactly_one_reason() {
        let xml = published_with(vec![entry("film", "present-2020-1")]);

        let records = vec![
            entry("film", "present-2020-1"),
            entry("film", ""),
            entry("film", "bad slug!"),
            entry("film", "-leading"),
            entry("film", &"x".repeat(201)),
        ];

        let first = reconcile_published(&xml, BASE, records.clone());
        let film = &first.families[0];
        assert_eq!(film.tracked, 5);
        assert_eq!(film.included, 1);
        assert_eq!(film.excluded.len(), 4);

        let reasons: Vec<ExclusionReason> =
            film.excluded.iter().map(|e| e.reason).collect();
        assert_eq!(
            reasons,
            [
                ExclusionReason::EmptyOrNull,
                ExclusionReason::InvalidCharacters,
                ExclusionReason::LeadingDash,
                ExclusionReason::TooLong,
            ]
        );

        // determinism: same input, same classifications
        let second = reconcile_published(&xml, BASE, records);
        let again: Vec<ExclusionReason> = second.families[0]
            .excluded
            .iter()
            .map(|e| e.reason)
            .collect();
        assert_eq!(reasons, again);
    }

    #[test]
    fn null_typed_records_are_reported_separately() {
        let xml = published_with(Vec::new());
        let report = reconcile_published(
            &xml,
            BASE,
            vec![PageEntry {
                slug: Some("stray".to_string()),
                page_type: None,
            }],
        );

        assert_eq!(report.missing_type, 1);
        assert!(
            report
                .families
                .iter()
                .all(|f| f.tracked == 0 && f.excluded.is_empty())
        );
    }
}
