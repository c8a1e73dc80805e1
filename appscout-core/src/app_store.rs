use crate::extract::{FieldExtractor, first_text, selector};
use crate::record::{Field, Record};
use appscout_scanner::Storefront;
use chrono::{DateTime, NaiveDate};
use scraper::Html;
use serde_json::Value;

const TITLE_SUFFIX: &str = " on the App Store";

/// Field extraction for App Store listing pages, read from the page's
/// `SoftwareApplication` JSON-LD block.
///
/// The App Store publishes no install numbers, so the install count is an
/// estimate bucketed from the review count.
pub struct AppStoreExtractor;

impl FieldExtractor for AppStoreExtractor {
    fn storefront(&self) -> Storefront {
        Storefront::AppStore
    }

    fn extract(&self, content: &str, listing_url: &str) -> Record {
        let document = Html::parse_document(content);
        let app = software_application(&document).unwrap_or(Value::Null);

        let reviews = app
            .pointer("/aggregateRating/reviewCount")
            .and_then(number);
        let rating = app
            .pointer("/aggregateRating/ratingValue")
            .and_then(number)
            .map(|r| format!("{:.1}", r));

        Record {
            niche: Field::from_option(string_at(&app, "/applicationCategory")),
            app_name: Field::from_option(string_at(&app, "/name")).or_else(|| {
                match first_text(&document, "title") {
                    Field::Known(title) => Field::new(title.replace('\u{200e}', "").replace(TITLE_SUFFIX, "")),
                    Field::Unknown => Field::Unknown,
                }
            }),
            logo_url: Field::from_option(
                string_at(&app, "/image").or_else(|| string_at(&app, "/image/url")),
            ),
            install_count: Field::from_option(reviews.map(|r| estimate_install_count(r as u64))),
            release_date: Field::from_option(
                string_at(&app, "/datePublished").and_then(|d| normalize_date(&d)),
            ),
            rating: Field::from_option(rating),
            review_count: Field::from_option(reviews.map(|r| format_review_count(r as u64))),
            app_link: Field::new(listing_url),
            developer: Field::from_option(string_at(&app, "/author/name")),
        }
    }
}

/// The first JSON-LD object typed `SoftwareApplication`.
fn software_application(document: &Html) -> Option<Value> {
    let scripts = selector(r#"script[type="application/ld+json"]"#)?;
    document
        .select(&scripts)
        .filter_map(|el| serde_json::from_str::<Value>(&el.text().collect::<String>()).ok())
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .find(|value| {
            value
                .get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.ends_with("Application"))
        })
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reformat a published date as `%B %d, %Y`.
fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%b %d, %Y").ok())?;
    Some(date.format("%B %d, %Y").to_string())
}

/// Install estimate bucket for a review count.
pub fn estimate_install_count(reviews: u64) -> String {
    let bucket = match reviews {
        0..=10 => "500 – 1.2K",
        11..=50 => "1.2K – 6K",
        51..=200 => "6K – 24K",
        201..=1_000 => "24K – 120K",
        1_001..=5_000 => "120K – 600K",
        5_001..=20_000 => "600K – 2.4M",
        20_001..=100_000 => "2.4M – 12M",
        _ => "12M+",
    };
    bucket.to_string()
}

/// Short review count display: `950`, `122k`, `1.2M`.
pub fn format_review_count(reviews: u64) -> String {
    if reviews < 1_000 {
        return reviews.to_string();
    }
    // Units are chosen after rounding, so 999_600 reads "1M" rather than "1000k"
    let thousands = (reviews as f64 / 1_000.0).round();
    if thousands < 1_000.0 {
        return format!("{}k", thousands);
    }
    let millions = (reviews as f64 / 100_000.0).round() / 10.0;
    if millions < 1_000.0 {
        return format!("{}M", millions);
    }
    format!("{}B", (reviews as f64 / 100_000_000.0).round() / 10.0)
}
