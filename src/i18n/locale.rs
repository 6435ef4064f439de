//! Locale type: a language plus optional region, e.g. `en` or `nl_BE`.

use std::fmt;

/// A normalized locale tag.
///
/// Tags are stored as `<language>[_<REGION>]`, accepting `-` or `_` as the
/// separator on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
}

impl Locale {
    /// Normalize a tag like `en-us` into `en_US`.
    pub fn new(tag: &str) -> Self {
        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let tag = match parts.next().filter(|r| !r.is_empty()) {
            Some(region) => format!("{}_{}", language, region.to_ascii_uppercase()),
            None => language,
        };
        Self { tag }
    }

    /// The full tag (e.g. "nl_BE").
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The ISO 639-1 language part (e.g. "nl").
    pub fn language(&self) -> &str {
        self.tag.split('_').next().unwrap_or_default()
    }

    /// The region part, if any (e.g. "BE").
    pub fn region(&self) -> Option<&str> {
        self.tag.split_once('_').map(|(_, region)| region)
    }

    /// The client's most preferred locale from an `Accept-Language` header.
    ///
    /// Entries are ranked by q-value, ties keep header order. `*` and
    /// entries with `q=0` are skipped.
    pub fn from_accept_language(header: &str) -> Option<Locale> {
        let mut entries: Vec<(&str, f64)> = Vec::new();
        for part in header.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let mut segments = part.split(';');
            let tag = segments.next().unwrap_or_default().trim();
            let mut q = 1.0_f64;
            for segment in segments {
                if let Some(value) = segment.trim().strip_prefix("q=") {
                    if let Ok(value) = value.parse::<f64>() {
                        q = value;
                    }
                }
            }
            if tag.is_empty() || tag == "*" || q <= 0.0 {
                continue;
            }
            entries.push((tag, q));
        }

        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries.first().map(|(tag, _)| Locale::new(tag))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale::new(tag)
    }
}

/// Where the preferred locale of a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleSetting {
    /// Detect from the client's `Accept-Language` header.
    Auto,
    Fixed(Locale),
}

impl LocaleSetting {
    /// `"auto"` (any case) selects detection; anything else is a fixed tag.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("auto") {
            LocaleSetting::Auto
        } else {
            LocaleSetting::Fixed(Locale::new(value))
        }
    }

    /// Resolve for one request, falling back to `default` when detection
    /// finds nothing.
    pub fn resolve(&self, accept_language: Option<&str>, default: &Locale) -> Locale {
        match self {
            LocaleSetting::Fixed(locale) => locale.clone(),
            LocaleSetting::Auto => accept_language
                .and_then(Locale::from_accept_language)
                .unwrap_or_else(|| default.clone()),
        }
    }
}
