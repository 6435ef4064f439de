use anyhow::{Context, Result};

use crate::grid::DEFAULT_ROWS_PER_PAGE;
use crate::language::DEFAULT_LANGUAGE_PATTERN;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub base_url: String,

    // Locale
    pub default_locale: String,
    pub locale: String,

    // Translation catalog
    pub languages: Vec<String>,
    pub language_pattern: String,
    pub translations_file: Option<String>,

    // Grid
    pub rows_per_page: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            port: match std::env::var("PORT") {
                Ok(v) => v.parse().context("PORT must be a port number")?,
                Err(_) => 8080,
            },
            base_url: std::env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_default(),

            // Locale ("auto" detects from the Accept-Language header)
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
            locale: std::env::var("LOCALE").unwrap_or_else(|_| "auto".to_string()),

            // Translation catalog
            languages: std::env::var("LANGUAGES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["en".to_string()]),
            language_pattern: std::env::var("LANGUAGE_PATTERN")
                .unwrap_or_else(|_| DEFAULT_LANGUAGE_PATTERN.to_string()),
            translations_file: std::env::var("TRANSLATIONS_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            // Grid (-1 shows all rows)
            rows_per_page: std::env::var("GRID_ROWS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(i64::from(DEFAULT_ROWS_PER_PAGE)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "PORT",
        "BASE_URL",
        "DEFAULT_LOCALE",
        "LOCALE",
        "LANGUAGES",
        "LANGUAGE_PATTERN",
        "TRANSLATIONS_FILE",
        "GRID_ROWS_PER_PAGE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.locale, "auto");
        assert_eq!(config.languages, vec!["en"]);
        assert_eq!(config.language_pattern, "^[a-z]{2}$");
        assert_eq!(config.translations_file, None);
        assert_eq!(config.rows_per_page, 50);
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        clear_env();
        std::env::set_var("PORT", "3000");
        std::env::set_var("BASE_URL", "/app/");
        std::env::set_var("LANGUAGES", "en, nl,,fr");
        std::env::set_var("GRID_ROWS_PER_PAGE", "-1");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "/app");
        assert_eq!(config.languages, vec!["en", "nl", "fr"]);
        assert_eq!(config.rows_per_page, -1);
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        let result = Config::from_env();
        clear_env();

        assert!(result.unwrap_err().to_string().contains("PORT"));
    }
}
