//! Partitioning of the tracked record set by content family.

use std::collections::HashSet;

use cineteca_model::{PageEntry, PageType, PersonKind};

/// One person-family bucket, keyed by canonical subtype or, for
/// unrecognized literals, by the literal itself.
#[derive(Debug)]
pub struct PersonBucket {
    pub kind: PersonKind,
    pub key: String,
    pub entries: Vec<PageEntry>,
}

/// The tracked record set split into content families. Person buckets
/// preserve first-appearance order, which later becomes the emission
/// order in the document.
#[derive(Debug, Default)]
pub struct PartitionedPages {
    pub films: Vec<PageEntry>,
    pub series: Vec<PageEntry>,
    pub people: Vec<PersonBucket>,
    /// Records with a NULL `page_type`. Surfaced in run diagnostics,
    /// never merged into `person`.
    pub missing_type: u64,
}

impl PartitionedPages {
    pub fn partition(entries: Vec<PageEntry>) -> Self {
        let mut partitioned = Self::default();

        for entry in entries {
            let Some(page_type) = entry.parsed_type() else {
                partitioned.missing_type += 1;
                continue;
            };

            match page_type {
                PageType::Film => partitioned.films.push(entry),
                PageType::Serie => partitioned.series.push(entry),
                PageType::Person(kind) => {
                    let key = kind.bucket_key().to_string();
                    match partitioned
                        .people
                        .iter_mut()
                        .find(|bucket| bucket.key == key)
                    {
                        Some(bucket) => bucket.entries.push(entry),
                        None => partitioned.people.push(PersonBucket {
                            kind,
                            key,
                            entries: vec![entry],
                        }),
                    }
                }
            }
        }

        partitioned
    }

    /// Total records that landed in a bucket (NULL-typed ones excluded).
    pub fn bucketed_len(&self) -> usize {
        self.films.len()
            + self.series.len()
            + self.people.iter().map(|b| b.entries.len()).sum::<usize>()
    }
}

/// Slugs eligible for emission: non-empty after trimming, first occurrence
/// only. Inclusion is deliberately looser than the exclusion taxonomy —
/// a slug with odd characters is still published; only emptiness keeps a
/// record out of the URL set.
pub fn valid_slugs(entries: &[PageEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut slugs = Vec::new();
    for entry in entries {
        if let Some(slug) = entry.trimmed_slug()
            && seen.insert(slug.to_string())
        {
            slugs.push(slug.to_string());
        }
    }
    slugs
}
