//! Locale negotiation for the bilingual (es/en) surface.
//!
//! Preference order: explicit `locale` cookie, then the best supported match
//! from `Accept-Language` by q-value, then Spanish.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Locales the platform ships translations for.
pub const SUPPORTED_LOCALES: [Locale; 2] = [Locale::Es, Locale::En];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(CoreError::ParseError(format!(
                "unsupported locale: {other}"
            ))),
        }
    }
}

/// ## Summary
/// Picks the locale for a request.
///
/// A valid cookie value wins outright. Otherwise the `Accept-Language` header
/// is parsed (`en-US,en;q=0.9,es;q=0.8` style), each entry reduced to its
/// base language, and the supported language with the highest q-value is
/// chosen. Anything unrecognized falls through to the default.
#[must_use]
pub fn negotiate(cookie: Option<&str>, accept_language: Option<&str>) -> Locale {
    if let Some(value) = cookie
        && let Ok(locale) = value.parse::<Locale>()
    {
        return locale;
    }

    if let Some(header) = accept_language
        && let Some(locale) = best_header_match(header)
    {
        return locale;
    }

    Locale::default()
}

/// Parses an `Accept-Language` header and returns the supported locale with
/// the highest quality factor, if any entry matches.
fn best_header_match(header: &str) -> Option<Locale> {
    let mut best: Option<(Locale, f32)> = None;

    for entry in header.split(',') {
        let mut parts = entry.trim().split(';');
        let Some(tag) = parts.next() else { continue };

        // Base language: "en" from "en-US".
        let Some(base) = tag.trim().get(..2) else {
            continue;
        };
        let Ok(locale) = base.to_ascii_lowercase().parse::<Locale>() else {
            continue;
        };

        let quality = parts
            .next()
            .map(str::trim)
            .and_then(|q| q.strip_prefix("q="))
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);

        match best {
            Some((_, best_quality)) if best_quality >= quality => {}
            _ => best = Some((locale, quality)),
        }
    }

    best.map(|(locale, _)| locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_wins_over_header() {
        let locale = negotiate(Some("en"), Some("es;q=1.0"));
        assert_eq!(locale, Locale::En);
    }

    #[test]
    fn invalid_cookie_falls_through_to_header() {
        let locale = negotiate(Some("fr"), Some("en-US,en;q=0.9"));
        assert_eq!(locale, Locale::En);
    }

    #[test]
    fn header_quality_ordering_is_respected() {
        let locale = negotiate(None, Some("en;q=0.7,es;q=0.9"));
        assert_eq!(locale, Locale::Es);
    }

    #[test]
    fn regional_variants_reduce_to_base_language() {
        let locale = negotiate(None, Some("en-GB"));
        assert_eq!(locale, Locale::En);
    }

    #[test]
    fn unsupported_languages_fall_back_to_default() {
        let locale = negotiate(None, Some("de-DE,fr;q=0.8"));
        assert_eq!(locale, Locale::Es);
    }

    #[test]
    fn missing_everything_defaults_to_spanish() {
        assert_eq!(negotiate(None, None), Locale::Es);
    }

    #[test]
    fn entry_without_quality_defaults_to_one() {
        let locale = negotiate(None, Some("es;q=0.5,en"));
        assert_eq!(locale, Locale::En);
    }
}
