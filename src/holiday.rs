//! Holiday calendar resolution
//!
//! Maps the user's country to one of Google's public holiday calendars.
//! Country comes from the locale environment (`LC_ALL` > `LC_MESSAGES` >
//! `LANG`); when the locale is ambiguous (`C`, `POSIX`, unset) a network
//! geo-IP lookup is the fallback. Every failure path yields `None`, which
//! downstream means "skip holiday detection", never an error.

use std::time::Duration;

use serde::Deserialize;

/// Country code → Google public holiday calendar id.
const HOLIDAY_CALENDARS: &[(&str, &str)] = &[
    ("US", "en.usa#holiday@group.v.calendar.google.com"),
    ("GB", "en.uk#holiday@group.v.calendar.google.com"),
    ("CA", "en.canadian#holiday@group.v.calendar.google.com"),
    ("AU", "en.australian#holiday@group.v.calendar.google.com"),
    ("DE", "en.german#holiday@group.v.calendar.google.com"),
    ("FR", "en.french#holiday@group.v.calendar.google.com"),
    ("ES", "en.spain#holiday@group.v.calendar.google.com"),
    ("IT", "en.italian#holiday@group.v.calendar.google.com"),
    ("NL", "en.dutch#holiday@group.v.calendar.google.com"),
    ("IN", "en.indian#holiday@group.v.calendar.google.com"),
    ("JP", "en.japanese#holiday@group.v.calendar.google.com"),
    ("BR", "en.brazilian#holiday@group.v.calendar.google.com"),
];

const COUNTRY_LOOKUP_URL: &str = "https://ipapi.co/json/";
const COUNTRY_LOOKUP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct CountryLookup {
    country_code: Option<String>,
}

/// Resolve the holiday calendar id for this machine, or None when no
/// calendar can be determined (holiday detection is then skipped).
pub fn resolve_holiday_calendar_id() -> Option<String> {
    let country = country_from_locale(locale_from_env().as_deref())
        .or_else(|| {
            log::debug!("Locale gives no country, falling back to network lookup");
            country_from_network()
        })?;

    match calendar_id_for_country(&country) {
        Some(id) => {
            log::info!("Holiday calendar for {}: {}", country, id);
            Some(id.to_string())
        }
        None => {
            log::info!("No holiday calendar known for country {}", country);
            None
        }
    }
}

/// First non-empty locale variable, in POSIX precedence order.
fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}

/// Extract an ISO country code from a locale string.
///
/// `en_US.UTF-8` → `US`. The `C`/`POSIX` locales and anything without a
/// territory part are ambiguous and return None.
pub fn country_from_locale(locale: Option<&str>) -> Option<String> {
    let locale = locale?;
    let base = locale.split('.').next().unwrap_or(locale);
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    let territory = base.split('_').nth(1)?;
    if territory.len() == 2 && territory.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(territory.to_uppercase())
    } else {
        None
    }
}

/// Geo-IP country lookup. One attempt, short timeout, None on any failure.
fn country_from_network() -> Option<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(COUNTRY_LOOKUP_TIMEOUT_SECS))
        .build()
        .ok()?;

    let resp = match client.get(COUNTRY_LOOKUP_URL).send() {
        Ok(resp) => resp,
        Err(e) => {
            log::debug!("Country lookup request failed: {}", e);
            return None;
        }
    };
    if !resp.status().is_success() {
        log::debug!("Country lookup returned HTTP {}", resp.status());
        return None;
    }

    let body: CountryLookup = resp.json().ok()?;
    body.country_code
        .filter(|c| !c.is_empty())
        .map(|c| c.to_uppercase())
}

pub fn calendar_id_for_country(country: &str) -> Option<&'static str> {
    HOLIDAY_CALENDARS
        .iter()
        .find(|(code, _)| *code == country)
        .map(|(_, id)| *id)
}
