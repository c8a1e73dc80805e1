use crate::config::{FilterConfig, InstallThreshold, RecencyWindow, ThresholdMode, WindowUnit};
use crate::record::{Field, Record};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Why a record did not pass the filter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("release date unknown")]
    UnknownDate,

    #[error("release date '{0}' does not match the date format")]
    UnparseableDate(String),

    #[error("release date {0} is in the future")]
    FutureDate(NaiveDate),

    #[error("released {age} {unit} ago, window is {window}")]
    TooOld {
        age: i64,
        window: u32,
        unit: &'static str,
    },

    #[error("{installs} installs is below the minimum of {threshold}")]
    BelowMinimum { installs: u64, threshold: u64 },

    #[error("{installs} installs is above the maximum of {threshold}")]
    AboveMaximum { installs: u64, threshold: u64 },
}

/// Strict magnitude parse: `5K`, `1.2M`, `3b`, `1,000,000+`.
///
/// Commas, `+` and whitespace are ignored. Returns `None` for anything else.
pub fn parse_magnitude(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && *c != '+' && !c.is_whitespace())
        .collect();
    let last = cleaned.chars().last()?;
    let (number, multiplier) = match last.to_ascii_uppercase() {
        'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Lenient install count parse used on scraped values.
///
/// Ranges such as `500 – 1.2K` count as their lower bound. Anything that
/// cannot be read, including the unknown sentinel, is 0.
pub fn parse_install_count(raw: &str) -> u64 {
    let lower = raw.split(['–', '—']).next().unwrap_or(raw);
    parse_magnitude(lower).unwrap_or(0)
}

/// Whole calendar months from `released` to `today`, ignoring the day.
pub fn months_between(released: NaiveDate, today: NaiveDate) -> i64 {
    (today.year() as i64 - released.year() as i64) * 12 + today.month() as i64
        - released.month() as i64
}

pub fn days_between(released: NaiveDate, today: NaiveDate) -> i64 {
    (today - released).num_days()
}

/// Recency and install-threshold predicate over records.
///
/// Both checks must pass. Each check is skipped when it is not configured.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    recency: Option<RecencyWindow>,
    installs: Option<InstallThreshold>,
    date_format: String,
}

impl ListingFilter {
    /// `default_date_format` applies when the recency window names none.
    pub fn new(config: &FilterConfig, default_date_format: &str) -> Self {
        let date_format = config
            .recency
            .as_ref()
            .and_then(|r| r.date_format.clone())
            .unwrap_or_else(|| default_date_format.to_string());
        Self {
            recency: config.recency.clone(),
            installs: config.installs.clone(),
            date_format,
        }
    }

    /// A filter that accepts every record.
    pub fn accept_all() -> Self {
        Self {
            recency: None,
            installs: None,
            date_format: String::new(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn evaluate(&self, record: &Record, today: NaiveDate) -> Result<(), Rejection> {
        if let Some(window) = &self.recency {
            self.check_recency(window, &record.release_date, today)?;
        }
        if let Some(threshold) = &self.installs {
            check_installs(threshold, &record.install_count)?;
        }
        Ok(())
    }

    fn check_recency(
        &self,
        window: &RecencyWindow,
        release_date: &Field,
        today: NaiveDate,
    ) -> Result<(), Rejection> {
        let raw = release_date.value().ok_or(Rejection::UnknownDate)?;
        let released = NaiveDate::parse_from_str(raw, &self.date_format)
            .map_err(|_| Rejection::UnparseableDate(raw.to_string()))?;

        let (age, unit) = match window.unit {
            WindowUnit::Months => (months_between(released, today), "months"),
            WindowUnit::Days => (days_between(released, today), "days"),
        };
        if age < 0 {
            return Err(Rejection::FutureDate(released));
        }
        if age >= window.amount as i64 {
            return Err(Rejection::TooOld {
                age,
                window: window.amount,
                unit,
            });
        }
        Ok(())
    }
}

fn check_installs(threshold: &InstallThreshold, install_count: &Field) -> Result<(), Rejection> {
    let installs = parse_install_count(install_count.as_str());
    match threshold.mode {
        ThresholdMode::AtLeast if installs < threshold.threshold => Err(Rejection::BelowMinimum {
            installs,
            threshold: threshold.threshold,
        }),
        ThresholdMode::AtMost if installs > threshold.threshold => Err(Rejection::AboveMaximum {
            installs,
            threshold: threshold.threshold,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_magnitude_suffixes() {
        assert_eq!(parse_magnitude("5K"), Some(5_000));
        assert_eq!(parse_magnitude("1.2m"), Some(1_200_000));
        assert_eq!(parse_magnitude("2B"), Some(2_000_000_000));
        assert_eq!(parse_magnitude(" 1,000,000+ "), Some(1_000_000));
        assert_eq!(parse_magnitude("lots"), None);
        assert_eq!(parse_magnitude(""), None);
        assert_eq!(parse_magnitude("-5K"), None);
    }

    #[test]
    fn test_parse_install_count_range_uses_lower_bound() {
        assert_eq!(parse_install_count("24K – 120K"), 24_000);
        assert_eq!(parse_install_count("12M+"), 12_000_000);
    }

    #[test]
    fn test_months_between_ignores_day() {
        assert_eq!(months_between(date(2025, 1, 31), date(2025, 3, 1)), 2);
        assert_eq!(months_between(date(2024, 10, 1), date(2025, 3, 31)), 5);
        assert_eq!(months_between(date(2025, 4, 1), date(2025, 3, 31)), -1);
    }
}
