use crate::identity::Storefront;
use crate::page::FetchedPage;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// A listing discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: String,
    pub key: String,
}

/// Find listing links on a page.
///
/// Links keep document order, are unique by identity key and never include
/// `exclude_key`. The result is uncapped.
pub fn discover_links(
    page: &FetchedPage,
    storefront: Storefront,
    exclude_key: Option<&str>,
) -> Vec<DiscoveredLink> {
    let base = Url::parse(&page.url).ok();
    let candidates = if page.is_json() {
        json_strings(&page.body)
    } else {
        html_hrefs(&page.body)
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for href in candidates {
        let Some(canonical) = storefront.canonical_url(&href, base.as_ref()) else {
            continue;
        };
        let Some(key) = storefront.key_of(&canonical) else {
            continue;
        };
        if exclude_key == Some(key.as_str()) || !seen.insert(key.clone()) {
            continue;
        }
        debug!("Found listing link: {} ({})", canonical, key);
        links.push(DiscoveredLink {
            url: canonical.to_string(),
            key,
        });
    }

    links
}

fn html_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

fn json_strings(body: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    collect_strings(&value, &mut out);
    out
}

fn collect_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
