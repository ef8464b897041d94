use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single-row generation statistics record (`sitemap_stats`, id = 1).
///
/// Written only by the generation pipeline; dashboards read it. When
/// `is_error` is true the count fields reflect the last successful run —
/// the failure upsert never zeroes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapStats {
    pub last_generation: DateTime<Utc>,
    pub urls_count: i64,
    pub film_count: i64,
    pub serie_count: i64,
    pub attore_count: i64,
    pub regista_count: i64,
    pub cast_count: i64,
    pub crew_count: i64,
    pub person_count: i64,
    pub other_count: i64,
    pub generation_ms: i64,
    pub is_error: bool,
    pub error_message: Option<String>,
}

impl SitemapStats {
    /// Sum of every person-family bucket, catch-all included.
    pub fn person_family_count(&self) -> i64 {
        self.attore_count
            + self.regista_count
            + self.cast_count
            + self.crew_count
            + self.person_count
            + self.other_count
    }

    /// Count invariant: total URLs must equal the static routes plus every
    /// per-family count.
    pub fn counts_consistent(&self, static_routes: i64) -> bool {
        self.urls_count
            == static_routes
                + self.film_count
                + self.serie_count
                + self.person_family_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_invariant_holds() {
        let stats = SitemapStats {
            last_generation: Utc::now(),
            urls_count: 4 + 10 + 5 + 3,
            film_count: 10,
            serie_count: 5,
            attore_count: 2,
            regista_count: 1,
            cast_count: 0,
            crew_count: 0,
            person_count: 0,
            other_count: 0,
            generation_ms: 42,
            is_error: false,
            error_message: None,
        };
        assert!(stats.counts_consistent(4));
        assert!(!stats.counts_consistent(5));
    }
}
