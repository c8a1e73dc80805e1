//! Storefront categories and the seed URLs built from them.

use crate::error::ConfigError;
use appscout_scanner::Storefront;

/// A browsable storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    /// Google Play category id, or the App Store genre id as text.
    pub id: &'static str,
}

const fn category(name: &'static str, id: &'static str) -> Category {
    Category { name, id }
}

pub const GOOGLE_PLAY_CATEGORIES: [Category; 33] = [
    category("Art & Design", "ART_AND_DESIGN"),
    category("Auto & Vehicles", "AUTO_AND_VEHICLES"),
    category("Beauty", "BEAUTY"),
    category("Books & Reference", "BOOKS_AND_REFERENCE"),
    category("Business", "BUSINESS"),
    category("Comics", "COMICS"),
    category("Communication", "COMMUNICATION"),
    category("Dating", "DATING"),
    category("Education", "EDUCATION"),
    category("Entertainment", "ENTERTAINMENT"),
    category("Events", "EVENTS"),
    category("Finance", "FINANCE"),
    category("Food & Drink", "FOOD_AND_DRINK"),
    category("Health & Fitness", "HEALTH_AND_FITNESS"),
    category("House & Home", "HOUSE_AND_HOME"),
    category("Libraries & Demo", "LIBRARIES_AND_DEMO"),
    category("Lifestyle", "LIFESTYLE"),
    category("Maps & Navigation", "MAPS_AND_NAVIGATION"),
    category("Medical", "MEDICAL"),
    category("Music & Audio", "MUSIC_AND_AUDIO"),
    category("News & Magazines", "NEWS_AND_MAGAZINES"),
    category("Parenting", "PARENTING"),
    category("Personalization", "PERSONALIZATION"),
    category("Photography", "PHOTOGRAPHY"),
    category("Productivity", "PRODUCTIVITY"),
    category("Shopping", "SHOPPING"),
    category("Social", "SOCIAL"),
    category("Sports", "SPORTS"),
    category("Tools", "TOOLS"),
    category("Travel & Local", "TRAVEL_AND_LOCAL"),
    category("Video Players & Editors", "VIDEO_PLAYERS"),
    category("Weather", "WEATHER"),
    category("Games", "GAME"),
];

pub const APP_STORE_GENRES: [Category; 23] = [
    category("games", "6014"),
    category("business", "6000"),
    category("weather", "6001"),
    category("utilities", "6002"),
    category("travel", "6003"),
    category("sports", "6004"),
    category("social-networking", "6005"),
    category("reference", "6006"),
    category("productivity", "6007"),
    category("photo-video", "6008"),
    category("news", "6009"),
    category("navigation", "6010"),
    category("music", "6011"),
    category("lifestyle", "6012"),
    category("health-fitness", "6013"),
    category("finance", "6015"),
    category("entertainment", "6016"),
    category("education", "6017"),
    category("books", "6018"),
    category("medical", "6020"),
    category("catalogs", "6022"),
    category("food-drink", "6023"),
    category("shopping", "6024"),
];

pub const APP_STORE_COUNTRIES: [&str; 9] = ["us", "gb", "ca", "fr", "de", "ie", "nl", "no", "ch"];

/// Top-free feeds return at most this many entries.
pub const APP_STORE_FEED_LIMIT: usize = 200;

pub fn categories(storefront: Storefront) -> &'static [Category] {
    match storefront {
        Storefront::GooglePlay => &GOOGLE_PLAY_CATEGORIES,
        Storefront::AppStore => &APP_STORE_GENRES,
    }
}

/// Look a category up by display name or id, ignoring case.
pub fn find_category(storefront: Storefront, query: &str) -> Option<Category> {
    let query = query.trim();
    categories(storefront)
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(query) || c.id.eq_ignore_ascii_case(query))
        .copied()
}

pub fn google_play_category_url(id: &str) -> String {
    format!("https://play.google.com/store/apps/category/{}", id)
}

pub fn app_store_feed_url(country: &str, genre_id: &str, limit: usize) -> String {
    format!(
        "https://itunes.apple.com/{}/rss/topfreeapplications/limit={}/genre={}/json",
        country,
        limit.min(APP_STORE_FEED_LIMIT),
        genre_id
    )
}

/// Seed URLs for the named categories; every category when `names` is empty.
///
/// App Store seeds are one feed per genre and country.
pub fn category_seeds(
    storefront: Storefront,
    names: &[String],
    countries: &[String],
) -> Result<Vec<String>, ConfigError> {
    let selected: Vec<Category> = if names.is_empty() {
        categories(storefront).to_vec()
    } else {
        names
            .iter()
            .map(|name| {
                find_category(storefront, name)
                    .ok_or_else(|| ConfigError::UnknownCategory(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let seeds = match storefront {
        Storefront::GooglePlay => selected
            .iter()
            .map(|c| google_play_category_url(c.id))
            .collect(),
        Storefront::AppStore => {
            let countries: Vec<&str> = if countries.is_empty() {
                APP_STORE_COUNTRIES.to_vec()
            } else {
                countries.iter().map(String::as_str).collect()
            };
            selected
                .iter()
                .flat_map(|c| {
                    countries
                        .iter()
                        .map(move |country| app_store_feed_url(country, c.id, APP_STORE_FEED_LIMIT))
                })
                .collect()
        }
    };
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_category_by_name_or_id() {
        let by_name = find_category(Storefront::GooglePlay, "food & drink").unwrap();
        assert_eq!(by_name.id, "FOOD_AND_DRINK");
        let by_id = find_category(Storefront::AppStore, "6014").unwrap();
        assert_eq!(by_id.name, "games");
        assert!(find_category(Storefront::AppStore, "knitting").is_none());
    }

    #[test]
    fn test_app_store_seeds_per_country() {
        let seeds = category_seeds(
            Storefront::AppStore,
            &["games".to_string()],
            &["us".to_string(), "de".to_string()],
        )
        .unwrap();
        assert_eq!(
            seeds,
            vec![
                "https://itunes.apple.com/us/rss/topfreeapplications/limit=200/genre=6014/json",
                "https://itunes.apple.com/de/rss/topfreeapplications/limit=200/genre=6014/json",
            ]
        );
    }

    #[test]
    fn test_all_google_play_categories() {
        let seeds = category_seeds(Storefront::GooglePlay, &[], &[]).unwrap();
        assert_eq!(seeds.len(), 33);
        assert!(seeds.contains(&"https://play.google.com/store/apps/category/GAME".to_string()));
    }

    #[test]
    fn test_unknown_category_is_error() {
        let err = category_seeds(Storefront::GooglePlay, &["Knitting".to_string()], &[]);
        assert!(matches!(err, Err(ConfigError::UnknownCategory(name)) if name == "Knitting"));
    }
}
