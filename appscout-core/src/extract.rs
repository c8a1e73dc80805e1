use crate::app_store::AppStoreExtractor;
use crate::google_play::GooglePlayExtractor;
use crate::record::{Field, Record};
use appscout_scanner::Storefront;
use scraper::{Html, Selector};

/// Turns a listing page into a record.
///
/// Never fails: fields that cannot be found are `Field::Unknown`. The record's
/// `app_link` is always the listing URL it was extracted from.
pub trait FieldExtractor: Send + Sync {
    fn storefront(&self) -> Storefront;

    fn extract(&self, content: &str, listing_url: &str) -> Record;
}

pub fn extractor_for(storefront: Storefront) -> Box<dyn FieldExtractor> {
    match storefront {
        Storefront::GooglePlay => Box::new(GooglePlayExtractor),
        Storefront::AppStore => Box::new(AppStoreExtractor),
    }
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the first element matching `css`.
pub(crate) fn first_text(document: &Html, css: &str) -> Field {
    let Some(selector) = selector(css) else {
        return Field::Unknown;
    };
    document
        .select(&selector)
        .next()
        .map(|el| Field::new(element_text(el)))
        .unwrap_or_default()
}

/// Texts of every element matching `css`, in document order.
pub(crate) fn all_texts(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| element_text(el).trim().to_string())
        .collect()
}

pub(crate) fn first_attr(document: &Html, css: &str, attr: &str) -> Field {
    let Some(selector) = selector(css) else {
        return Field::Unknown;
    };
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(Field::new)
        .unwrap_or_default()
}

/// Up to `max_chars` characters following the first occurrence of `marker`.
pub(crate) fn text_after_marker<'a>(content: &'a str, marker: &str, max_chars: usize) -> Option<&'a str> {
    let start = content.find(marker)? + marker.len();
    let rest = &content[start..];
    let end = rest
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
