use std::fmt;

use serde::{Deserialize, Serialize};

use crate::page::PageType;

/// Suggested crawl frequency carried on every sitemap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeFreq::Weekly => f.write_str("weekly"),
            ChangeFreq::Monthly => f.write_str("monthly"),
        }
    }
}

/// A fixed, always-present route of the site.
#[derive(Debug, Clone, Copy)]
pub struct StaticRoute {
    pub path: &'static str,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Static routes, in emission order. The home route outranks everything
/// else on the site.
pub const STATIC_ROUTES: &[StaticRoute] = &[
    StaticRoute {
        path: "",
        changefreq: ChangeFreq::Weekly,
        priority: 1.0,
    },
    StaticRoute {
        path: "/search",
        changefreq: ChangeFreq::Weekly,
        priority: 0.8,
    },
    StaticRoute {
        path: "/login",
        changefreq: ChangeFreq::Weekly,
        priority: 0.8,
    },
    StaticRoute {
        path: "/about",
        changefreq: ChangeFreq::Weekly,
        priority: 0.8,
    },
];

/// One `<url>` entry, computed fresh on every generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapUrl {
    pub loc: String,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl PageType {
    /// Crawl policy per content class: film/serie pages refresh weekly,
    /// person pages monthly and at a lower priority.
    pub fn url_policy(&self) -> (ChangeFreq, f32) {
        match self {
            PageType::Film | PageType::Serie => (ChangeFreq::Weekly, 0.8),
            PageType::Person(_) => (ChangeFreq::Monthly, 0.6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_routes_start_with_home() {
        assert_eq!(STATIC_ROUTES[0].path, "");
        assert_eq!(STATIC_ROUTES[0].priority, 1.0);
        assert_eq!(STATIC_ROUTES.len(), 4);
    }

    #[test]
    fn person_pages_rank_below_content_pages() {
        let (freq, prio) = PageType::parse("attore").url_policy();
        assert_eq!(freq, ChangeFreq::Monthly);
        assert!(prio < PageType::Film.url_policy().1);
    }
}
