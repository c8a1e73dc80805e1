use crate::extract::{FieldExtractor, all_texts, first_attr, first_text, text_after_marker};
use crate::record::{Field, Record};
use appscout_scanner::Storefront;
use scraper::Html;

const TITLE_SUFFIX: &str = " - Apps on Google Play";
const INSTALLS_MARKER: &str = r#"<div class="w7Iutd"><div class="wVqUob"><div class="ClM7O">"#;
const RELEASE_DATE_MARKER: &str = r#"dappgame_ratings"]]],[""#;

/// Field extraction for Google Play listing pages.
///
/// Each field walks an ordered chain of sources and keeps the first hit.
pub struct GooglePlayExtractor;

impl FieldExtractor for GooglePlayExtractor {
    fn storefront(&self) -> Storefront {
        Storefront::GooglePlay
    }

    fn extract(&self, content: &str, listing_url: &str) -> Record {
        let document = Html::parse_document(content);

        let rating = first_text(&document, "div.jILTFe");
        let review_count = if rating.is_unknown() {
            Field::Unknown
        } else {
            match first_text(&document, "div.g1rdde") {
                Field::Known(text) if text.contains("Download") || text.contains("Install") => {
                    Field::Unknown
                }
                other => other,
            }
        };

        Record {
            niche: niche(&document),
            app_name: app_name(&document),
            logo_url: first_attr(&document, r#"img.T75of.arM4bb[itemprop="image"]"#, "src")
                .or_else(|| first_attr(&document, r#"img[itemprop="image"]"#, "src")),
            install_count: install_count(&document, content),
            release_date: release_date(content),
            rating,
            review_count,
            app_link: Field::new(listing_url),
            developer: first_text(&document, "div.Vbfug.auoIOc")
                .or_else(|| first_text(&document, "a.Si6A0c.Gwdmqd")),
        }
    }
}

fn app_name(document: &Html) -> Field {
    first_text(document, r#"h1[itemprop="name"]"#)
        .or_else(|| first_text(document, "h1.Fd93Bb"))
        .or_else(|| match first_text(document, "title") {
            Field::Known(title) => Field::new(title.replace(TITLE_SUFFIX, "")),
            Field::Unknown => Field::Unknown,
        })
}

fn install_count(document: &Html, content: &str) -> Field {
    all_texts(document, "div.ClM7O")
        .into_iter()
        .find(|text| text.contains('+'))
        .map(Field::new)
        .unwrap_or_default()
        .or_else(|| {
            let raw = text_after_marker(content, INSTALLS_MARKER, 20);
            Field::from_option(raw.map(|text| text.split('<').next().unwrap_or(text)))
        })
}

fn release_date(content: &str) -> Field {
    Field::from_option(text_after_marker(content, RELEASE_DATE_MARKER, 12).map(|raw| raw.replace('"', "")))
}

fn niche(document: &Html) -> Field {
    first_text(document, r#"a[itemprop="genre"]"#)
        .or_else(|| first_text(document, r#"a[href*="/store/apps/category/"]"#))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_fallback_strips_suffix() {
        let html = "<html><head><title>Fancy Timer - Apps on Google Play</title></head></html>";
        let record = GooglePlayExtractor.extract(html, "https://play.google.com/store/apps/details?id=a.b");
        assert_eq!(record.app_name.as_str(), "Fancy Timer");
    }

    #[test]
    fn test_release_date_marker() {
        let html = r#"<script>["dappgame_ratings"]]],["Feb 11, 2025",1]</script>"#;
        assert_eq!(release_date(html).as_str(), "Feb 11, 2025");
        assert!(release_date("<html></html>").is_unknown());
    }

    #[test]
    fn test_review_count_requires_rating() {
        let html = r#"<div class="g1rdde">1.2K reviews</div>"#;
        let record = GooglePlayExtractor.extract(html, "https://play.google.com/store/apps/details?id=a.b");
        assert!(record.rating.is_unknown());
        assert!(record.review_count.is_unknown());
    }
}
