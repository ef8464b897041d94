//! Deterministic rendering of the canonical sitemap document, plus the
//! parsers other tooling uses to read one back.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use cineteca_model::{PageType, STATIC_ROUTES};

use super::reconcile::{PartitionedPages, valid_slugs};

/// `Generata il: {ISO timestamp} con {N} URL` — machine-readable contract
/// parsed by dashboards; do not reformat.
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Generata il: (.+?) con (\d+) URL").expect("header regex")
});

static COUNT_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<urlset[^>]*\bcount="(\d+)""#).expect("count regex"));

static LOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<loc>([^<]+)</loc>").expect("loc regex"));

/// Per-family URL totals for one rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlCounts {
    pub total: u64,
    pub static_routes: u64,
    pub films: u64,
    pub series: u64,
    /// Person-family buckets in emission order: `(bucket key, count)`.
    pub people: Vec<(String, u64)>,
}

impl UrlCounts {
    pub fn person_family_total(&self) -> u64 {
        self.people.iter().map(|(_, count)| count).sum()
    }
}

/// A rendered sitemap together with the counts it was rendered from.
#[derive(Debug, Clone)]
pub struct SitemapDocument {
    pub xml: String,
    pub generated_at: DateTime<Utc>,
    pub counts: UrlCounts,
}

/// The machine-parseable generation header of a published document.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapHeader {
    pub generated_at: Option<DateTime<Utc>>,
    pub url_count: u64,
}

/// Render the canonical document: static routes first, then films, series
/// and person buckets in first-seen order. Byte-identical for identical
/// inputs apart from the embedded timestamp.
pub fn build_sitemap(
    base_url: &str,
    partition: &PartitionedPages,
    generated_at: DateTime<Utc>,
) -> SitemapDocument {
    let films = valid_slugs(&partition.films);
    let series = valid_slugs(&partition.series);
    let people: Vec<(&str, &str, Vec<String>)> = partition
        .people
        .iter()
        .map(|bucket| {
            (
                bucket.key.as_str(),
                bucket.kind.path_prefix(),
                valid_slugs(&bucket.entries),
            )
        })
        .collect();

    let total = STATIC_ROUTES.len() as u64
        + films.len() as u64
        + series.len() as u64
        + people.iter().map(|(_, _, slugs)| slugs.len() as u64).sum::<u64>();

    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut xml = String::with_capacity(256 + total as usize * 128);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<!-- Generata il: {timestamp} con {total} URL -->\n"
    ));
    xml.push_str(&format!(
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" count=\"{total}\">\n"
    ));

    for route in STATIC_ROUTES {
        push_url(
            &mut xml,
            &format!("{base_url}{}", route.path),
            &route.changefreq.to_string(),
            route.priority,
        );
    }

    let (film_freq, film_priority) = PageType::Film.url_policy();
    for slug in &films {
        push_url(
            &mut xml,
            &format!("{base_url}/film/{slug}"),
            &film_freq.to_string(),
            film_priority,
        );
    }

    let (serie_freq, serie_priority) = PageType::Serie.url_policy();
    for slug in &series {
        push_url(
            &mut xml,
            &format!("{base_url}/serie/{slug}"),
            &serie_freq.to_string(),
            serie_priority,
        );
    }

    for (_, prefix, slugs) in &people {
        let (freq, priority) =
            PageType::parse(prefix.trim_start_matches('/')).url_policy();
        for slug in slugs {
            push_url(
                &mut xml,
                &format!("{base_url}{prefix}/{slug}"),
                &freq.to_string(),
                priority,
            );
        }
    }

    xml.push_str("</urlset>\n");

    let counts = UrlCounts {
        total,
        static_routes: STATIC_ROUTES.len() as u64,
        films: films.len() as u64,
        series: series.len() as u64,
        people: people
            .iter()
            .map(|(key, _, slugs)| (key.to_string(), slugs.len() as u64))
            .collect(),
    };

    SitemapDocument {
        xml,
        generated_at,
        counts,
    }
}

fn push_url(xml: &mut String, loc: &str, changefreq: &str, priority: f32) {
    xml.push_str(&format!(
        "  <url><loc>{}</loc><changefreq>{changefreq}</changefreq><priority>{priority:.1}</priority></url>\n",
        escape_xml(loc)
    ));
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Parse the generation header comment of a published document.
pub fn parse_header(xml: &str) -> Option<SitemapHeader> {
    let captures = HEADER_RE.captures(xml)?;
    let url_count = captures[2].parse().ok()?;
    let generated_at = DateTime::parse_from_rfc3339(&captures[1])
        .ok()
        .map(|ts| ts.with_timezone(&Utc));

    Some(SitemapHeader {
        generated_at,
        url_count,
    })
}

/// Parse the non-standard `count` attribute off the root element.
pub fn parse_count_attr(xml: &str) -> Option<u64> {
    COUNT_ATTR_RE
        .captures(xml)
        .and_then(|captures| captures[1].parse().ok())
}

/// Extract the slug sets of a published document, keyed by path prefix
/// (`/film`, `/serie`, `/attore`, ...). Slugs are taken literally as they
/// appear between the `<loc>` tags: an escaped slug will not match its
/// store counterpart, which is exactly what the discrepancy classifier
/// keys off.
pub fn parse_published_slugs(
    xml: &str,
    base_url: &str,
) -> HashMap<String, HashSet<String>> {
    let mut slugs: HashMap<String, HashSet<String>> = HashMap::new();

    for captures in LOC_RE.captures_iter(xml) {
        let loc = &captures[1];
        let Some(path) = loc.strip_prefix(base_url) else {
            continue;
        };
        let Some(rest) = path.strip_prefix('/') else {
            continue;
        };
        let Some((prefix, slug)) = rest.split_once('/') else {
            continue;
        };
        if slug.is_empty() {
            continue;
        }
        slugs
            .entry(format!("/{prefix}"))
            .or_default()
            .insert(slug.to_string());
    }

    slugs
}
