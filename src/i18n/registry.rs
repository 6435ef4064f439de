//! Language registry: the translation catalog.
//!
//! Holds every language the application has translations for, along with
//! their messages. A registry is built once at startup and shared
//! read-only between requests; the per-request active locale lives in
//! [`Translator`](super::Translator).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "nl")
    pub code: String,

    /// Display name of the language (e.g., "English", "Nederlands")
    pub name: String,

    /// Whether this language can be selected
    pub enabled: bool,

    /// Message key to translated message
    pub messages: HashMap<String, String>,
}

impl LanguageConfig {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into().to_ascii_lowercase(),
            name: name.into(),
            enabled: true,
            messages: HashMap::new(),
        }
    }

    pub fn with_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }
}

/// The translation catalog.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry of enabled languages without messages, named by code.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() {
                registry.add(LanguageConfig::new(code, code));
            }
        }
        registry
    }

    /// Load a catalog from a JSON file shaped `{ "<code>": { "<key>": "<message>" } }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations file {}", path.display()))?;
        let registry = Self::from_json_str(&content)
            .with_context(|| format!("Invalid translations file {}", path.display()))?;

        info!(
            "Loaded {} languages from {}",
            registry.languages.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let catalog: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).context("Catalog must be a JSON object")?;

        let mut registry = Self::new();
        for (code, messages) in catalog {
            let messages: HashMap<String, String> = serde_json::from_value(messages)
                .with_context(|| format!("Messages for '{}' must map strings to strings", code))?;
            let mut config = LanguageConfig::new(&code, &code);
            config.messages = messages;
            registry.add(config);
        }
        Ok(registry)
    }

    /// Add a language, replacing one with the same code.
    pub fn add(&mut self, config: LanguageConfig) {
        match self.languages.iter_mut().find(|l| l.code == config.code) {
            Some(existing) => *existing = config,
            None => self.languages.push(config),
        }
    }

    pub fn with_language(mut self, config: LanguageConfig) -> Self {
        self.add(config);
        self
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Check if translations for a language code exist and are enabled.
    pub fn is_available(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Look up a message for a language.
    pub fn message(&self, code: &str, key: &str) -> Option<&str> {
        self.get_by_code(code)
            .filter(|lang| lang.enabled)
            .and_then(|lang| lang.messages.get(key))
            .map(String::as_str)
    }
}
