// Tests for storefront field extraction

use appscout_core::app_store::AppStoreExtractor;
use appscout_core::extract::FieldExtractor;
use appscout_core::google_play::GooglePlayExtractor;

const PLAY_URL: &str = "https://play.google.com/store/apps/details?id=com.example.timer";
const APP_STORE_URL: &str = "https://apps.apple.com/us/app/focus-timer/id1234567890";

const PLAY_PAGE: &str = r#"<html>
<head><title>Focus Timer - Apps on Google Play</title></head>
<body>
  <h1 itemprop="name"><span>Focus Timer</span></h1>
  <div class="Vbfug auoIOc"><a href="/store/apps/dev?id=1"><span>Example Labs</span></a></div>
  <img class="T75of arM4bb" itemprop="image" src="https://play-lh.googleusercontent.com/icon.png">
  <a itemprop="genre" href="/store/apps/category/PRODUCTIVITY">Productivity</a>
  <div class="w7Iutd">
    <div class="wVqUob"><div class="ClM7O"><div class="TT9eCd">4.6<i>star</i></div></div><div class="g1rdde">1.2K reviews</div></div>
    <div class="wVqUob"><div class="ClM7O">50K+</div><div class="g1rdde">Downloads</div></div>
  </div>
  <div class="jILTFe">4.6</div>
  <script>AF_initDataCallback({data:[["dappgame_ratings"]]],["Feb 11, 2025",null]]});</script>
</body>
</html>"#;

const APP_STORE_PAGE: &str = r#"<html>
<head>
<title>&lrm;Focus Timer on the App Store</title>
<script name="schema:software-application" type="application/ld+json">
{
  "@context": "http://schema.org",
  "@type": "SoftwareApplication",
  "name": "Focus Timer",
  "datePublished": "2025-02-11T08:00:00Z",
  "image": "https://is1-ssl.mzstatic.com/image/icon.png",
  "applicationCategory": "Productivity",
  "author": {"@type": "Person", "name": "Example Labs"},
  "aggregateRating": {"@type": "AggregateRating", "ratingValue": 4.66, "reviewCount": 122300}
}
</script>
</head>
<body></body>
</html>"#;

// ============================================================================
// Google Play Extraction Tests
// ============================================================================

#[test]
fn test_google_play_full_page() {
    let record = GooglePlayExtractor.extract(PLAY_PAGE, PLAY_URL);
    assert_eq!(record.app_name.as_str(), "Focus Timer");
    assert_eq!(record.developer.as_str(), "Example Labs");
    assert_eq!(record.logo_url.as_str(), "https://play-lh.googleusercontent.com/icon.png");
    assert_eq!(record.niche.as_str(), "Productivity");
    assert_eq!(record.install_count.as_str(), "50K+");
    assert_eq!(record.rating.as_str(), "4.6");
    assert_eq!(record.review_count.as_str(), "1.2K reviews");
    assert_eq!(record.release_date.as_str(), "Feb 11, 2025");
    assert_eq!(record.app_link.as_str(), PLAY_URL);
}

#[test]
fn test_google_play_name_fallbacks() {
    let html = r#"<html><body><h1 class="Fd93Bb">Second Source</h1></body></html>"#;
    assert_eq!(GooglePlayExtractor.extract(html, PLAY_URL).app_name.as_str(), "Second Source");

    let html = "<html><head><title>Plain Title</title></head></html>";
    assert_eq!(GooglePlayExtractor.extract(html, PLAY_URL).app_name.as_str(), "Plain Title");
}

#[test]
fn test_google_play_install_marker_fallback() {
    let html = r#"<html><body><div class="w7Iutd"><div class="wVqUob"><div class="ClM7O">1M</div></div></div></body></html>"#;
    let record = GooglePlayExtractor.extract(html, PLAY_URL);
    assert_eq!(record.install_count.as_str(), "1M");
}

#[test]
fn test_google_play_developer_fallback() {
    let html = r#"<html><body><a class="Si6A0c Gwdmqd" href="/dev">Fallback Dev</a></body></html>"#;
    assert_eq!(GooglePlayExtractor.extract(html, PLAY_URL).developer.as_str(), "Fallback Dev");
}

#[test]
fn test_google_play_review_count_mentioning_downloads_is_unknown() {
    let html = r#"<html><body><div class="jILTFe">4.1</div><div class="g1rdde">Downloads</div></body></html>"#;
    let record = GooglePlayExtractor.extract(html, PLAY_URL);
    assert_eq!(record.rating.as_str(), "4.1");
    assert!(record.review_count.is_unknown());
}

#[test]
fn test_google_play_empty_page_is_all_unknown() {
    let record = GooglePlayExtractor.extract("<html></html>", PLAY_URL);
    assert!(record.app_name.is_unknown());
    assert!(record.install_count.is_unknown());
    assert!(record.release_date.is_unknown());
    assert!(record.developer.is_unknown());
    assert_eq!(record.app_link.as_str(), PLAY_URL);
}

// ============================================================================
// App Store Extraction Tests
// ============================================================================

#[test]
fn test_app_store_json_ld() {
    let record = AppStoreExtractor.extract(APP_STORE_PAGE, APP_STORE_URL);
    assert_eq!(record.app_name.as_str(), "Focus Timer");
    assert_eq!(record.niche.as_str(), "Productivity");
    assert_eq!(record.developer.as_str(), "Example Labs");
    assert_eq!(record.logo_url.as_str(), "https://is1-ssl.mzstatic.com/image/icon.png");
    assert_eq!(record.release_date.as_str(), "February 11, 2025");
    assert_eq!(record.rating.as_str(), "4.7");
    assert_eq!(record.review_count.as_str(), "122k");
    assert_eq!(record.install_count.as_str(), "12M+");
    assert_eq!(record.identity_key().as_deref(), Some("id1234567890"));
}

#[test]
fn test_app_store_title_fallback() {
    let html = "<html><head><title>Focus Timer on the App Store</title></head></html>";
    let record = AppStoreExtractor.extract(html, APP_STORE_URL);
    assert_eq!(record.app_name.as_str(), "Focus Timer");
    assert!(record.install_count.is_unknown());
    assert!(record.rating.is_unknown());
}
