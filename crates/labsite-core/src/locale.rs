//! Supported locales and preferred-locale resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the cookie that remembers the visitor's locale.
pub const LOCALE_COOKIE: &str = "locale";

/// One year, in seconds.
pub const LOCALE_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// A supported UI language for content pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Zh,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Zh, Locale::Ja];

    pub const DEFAULT: Locale = Locale::En;

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
            Locale::Ja => "ja",
        }
    }

    /// Human-readable name shown in the language switcher.
    pub fn label(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Zh => "中文",
            Locale::Ja => "日本語",
        }
    }

    /// Match a language subtag such as `zh` from `zh-CN`, ignoring case.
    fn from_subtag(subtag: &str) -> Option<Locale> {
        Locale::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(subtag))
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::DEFAULT
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the supported locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLocale(pub String);

impl fmt::Display for UnsupportedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLocale {}

/// Exact, case-sensitive parse. Used for path segments and cookie values.
impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    /// Lowercased primary subtag (`zh` for `zh-CN`)
    pub language: String,
    pub quality: f32,
}

/// Parse an `Accept-Language` header into preferences, highest weight first.
///
/// A missing or unparsable `q=` weight counts as 1.0. The sort is stable, so
/// equal weights keep header order.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    let mut prefs: Vec<LanguagePreference> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let language = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .filter(|q| q.is_finite() && *q != 0.0)
                .unwrap_or(1.0);
            Some(LanguagePreference { language, quality })
        })
        .collect();

    prefs.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    prefs
}

/// Pick the locale the browser prefers, if any supported one is listed.
pub fn browser_locale(accept_language: &str) -> Option<Locale> {
    parse_accept_language(accept_language)
        .iter()
        .find_map(|p| Locale::from_subtag(&p.language))
}

/// Resolve the preferred locale for a request.
///
/// Priority: a valid `locale` cookie, then the `Accept-Language` header,
/// then [`Locale::DEFAULT`]. Never fails.
pub fn resolve_locale(cookie: Option<&str>, accept_language: Option<&str>) -> Locale {
    if let Some(locale) = cookie.and_then(|c| c.parse::<Locale>().ok()) {
        return locale;
    }

    accept_language
        .and_then(browser_locale)
        .unwrap_or(Locale::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("zh".parse::<Locale>().unwrap(), Locale::Zh);
        assert!("ZH".parse::<Locale>().is_err());
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let locale = resolve_locale(Some("zh"), Some("ja,en;q=0.9"));
        assert_eq!(locale, Locale::Zh);
    }

    #[test]
    fn test_invalid_cookie_falls_back_to_header() {
        let locale = resolve_locale(Some("klingon"), Some("ja-JP"));
        assert_eq!(locale, Locale::Ja);
    }

    #[test]
    fn test_no_signals_returns_default() {
        assert_eq!(resolve_locale(None, None), Locale::En);
        assert_eq!(resolve_locale(None, Some("")), Locale::En);
        assert_eq!(resolve_locale(None, Some("fr-FR,de;q=0.5")), Locale::En);
    }

    #[test]
    fn test_header_sorted_by_quality() {
        let locale = resolve_locale(None, Some("en;q=0.3, ja;q=0.8, zh;q=0.5"));
        assert_eq!(locale, Locale::Ja);
    }

    #[test]
    fn test_header_subtag_is_case_insensitive() {
        assert_eq!(resolve_locale(None, Some("ZH-cn")), Locale::Zh);
    }

    #[test]
    fn test_malformed_quality_defaults_to_one() {
        let prefs = parse_accept_language("ja;q=abc, zh;q=0.9");
        assert_eq!(prefs[0].language, "ja");
        assert_eq!(prefs[0].quality, 1.0);
        assert_eq!(resolve_locale(None, Some("ja;q=abc, zh;q=0.9")), Locale::Ja);
    }

    #[test]
    fn test_missing_quality_beats_explicit_lower() {
        let prefs = parse_accept_language("fr;q=0.9, zh");
        assert_eq!(prefs[0].language, "zh");
        assert_eq!(prefs[1].language, "fr");
    }

    #[test]
    fn test_skips_unsupported_until_match() {
        let locale = resolve_locale(None, Some("fr-CA,fr;q=0.9,ja;q=0.8,en;q=0.7"));
        assert_eq!(locale, Locale::Ja);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Locale::Zh.label(), "中文");
        assert_eq!(Locale::Ja.to_string(), "ja");
    }
}
