//! Internationalization (i18n) module: locales and the translation catalog.
//!
//! # Architecture
//!
//! - `locale`: `Locale` values and Accept-Language detection
//! - `registry`: the shared catalog of available languages and their messages
//! - `translator`: the catalog paired with the locale of a single request
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pike::i18n::{LanguageRegistry, Locale, Translator};
//!
//! let catalog = Arc::new(LanguageRegistry::from_json_file("translations.json")?);
//! let translator = Translator::new(catalog, Locale::new("nl_BE"));
//! let segment = translator.translate("news");
//! ```

mod locale;
mod registry;
mod translator;

pub use locale::{Locale, LocaleSetting};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use translator::Translator;
