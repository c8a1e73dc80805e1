//! Listing identity keys.
//!
//! Every storefront exposes listings under a recognisable URL shape. The
//! identity key is the part of that URL that names the app (the package id on
//! Google Play, the numeric `id…` segment on the App Store); everything else
//! (scheme, tracking parameters, locale query, fragments) is decoration and
//! never changes the key.
//!
//! Only the storefront's own hosts carry listings. Loopback hosts are accepted
//! as well so a local mirror or mock server can stand in for the storefront.

use serde::{Deserialize, Serialize};
use url::{Host, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storefront {
    #[default]
    GooglePlay,
    AppStore,
}

const GOOGLE_PLAY_ORIGIN: &str = "https://play.google.com/";
const APP_STORE_ORIGIN: &str = "https://apps.apple.com/";
const GOOGLE_PLAY_DETAILS_PATH: &str = "/store/apps/details";
const GOOGLE_PLAY_HOSTS: [&str; 2] = ["play.google.com", "market.android.com"];
const APP_STORE_HOSTS: [&str; 2] = ["apps.apple.com", "itunes.apple.com"];

impl Storefront {
    pub const ALL: [Storefront; 2] = [Storefront::GooglePlay, Storefront::AppStore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Storefront::GooglePlay => "google_play",
            Storefront::AppStore => "app_store",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "google_play" | "play" | "gplay" => Some(Storefront::GooglePlay),
            "app_store" | "appstore" | "itunes" => Some(Storefront::AppStore),
            _ => None,
        }
    }

    /// Base URL that relative links are resolved against when no page URL is known.
    pub fn origin(&self) -> Url {
        let raw = match self {
            Storefront::GooglePlay => GOOGLE_PLAY_ORIGIN,
            Storefront::AppStore => APP_STORE_ORIGIN,
        };
        Url::parse(raw).expect("storefront origin is a valid URL")
    }

    /// Resolve a raw href into an absolute http(s) URL without its fragment.
    pub fn resolve(&self, raw: &str, base: Option<&Url>) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty()
            || raw.starts_with("javascript:")
            || raw.starts_with("mailto:")
            || raw.starts_with("tel:")
            || raw.starts_with('#')
        {
            return None;
        }

        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => base.join(raw).ok()?,
                None => self.origin().join(raw).ok()?,
            },
            Err(_) => return None,
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        url.set_fragment(None);
        Some(url)
    }

    /// Identity key of a raw URL, or `None` when it is not a listing URL of this storefront.
    pub fn identity_key(&self, raw: &str, base: Option<&Url>) -> Option<String> {
        let url = self.resolve(raw, base)?;
        self.key_of(&url)
    }

    /// Identity key of an already absolute URL.
    pub fn key_of(&self, url: &Url) -> Option<String> {
        if !self.serves(url) {
            return None;
        }
        match self {
            Storefront::GooglePlay => google_play_key(url),
            Storefront::AppStore => app_store_key(url),
        }
    }

    /// Whether `url` points at one of this storefront's hosts (or at loopback).
    pub fn serves(&self, url: &Url) -> bool {
        let hosts: &[&str] = match self {
            Storefront::GooglePlay => &GOOGLE_PLAY_HOSTS,
            Storefront::AppStore => &APP_STORE_HOSTS,
        };
        match url.host() {
            Some(Host::Domain(domain)) => {
                let domain = domain.trim_end_matches('.').to_ascii_lowercase();
                domain == "localhost" || hosts.contains(&domain.as_str())
            }
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        }
    }

    /// The listing URL stripped down to the parts that identify it.
    pub fn canonical_url(&self, raw: &str, base: Option<&Url>) -> Option<Url> {
        let mut url = self.resolve(raw, base)?;
        let key = self.key_of(&url)?;
        match self {
            Storefront::GooglePlay => {
                url.set_path(GOOGLE_PLAY_DETAILS_PATH);
                url.set_query(Some(&format!("id={}", key)));
            }
            Storefront::AppStore => url.set_query(None),
        }
        Some(url)
    }

    /// Find the storefront whose listing pattern matches `raw`, together with its key.
    pub fn detect(raw: &str) -> Option<(Storefront, String)> {
        Self::ALL
            .iter()
            .find_map(|storefront| storefront.identity_key(raw, None).map(|key| (*storefront, key)))
    }
}

impl std::fmt::Display for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn google_play_key(url: &Url) -> Option<String> {
    if url.path().trim_end_matches('/') != GOOGLE_PLAY_DETAILS_PATH {
        return None;
    }
    url.query_pairs()
        .find(|(name, _)| name == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| is_package_id(id))
}

fn is_package_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn app_store_key(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if !segments.contains(&"app") {
        return None;
    }
    let last = segments.last()?;
    let digits = last.strip_prefix("id")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("id{}", digits))
}
