//! Request-scoped view on the translation catalog.

use std::sync::Arc;

use super::{LanguageRegistry, Locale};

/// The shared catalog paired with the locale active for one request.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<LanguageRegistry>,
    locale: Locale,
}

impl Translator {
    pub fn new(catalog: Arc<LanguageRegistry>, locale: Locale) -> Self {
        Self { catalog, locale }
    }

    pub fn is_available(&self, language: &str) -> bool {
        self.catalog.is_available(language)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn catalog(&self) -> &LanguageRegistry {
        &self.catalog
    }

    /// Translate `key` into the active language; untranslated keys come back
    /// unchanged.
    pub fn translate(&self, key: &str) -> String {
        self.catalog
            .message(self.locale.language(), key)
            .unwrap_or(key)
            .to_string()
    }
}
