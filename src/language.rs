//! Language negotiation around routing.
//!
//! Every URL carries its language as the first path segment (`/nl/news`).
//! [`LanguagePlugin`] runs at two points of a request:
//!
//! - `route_startup`, before routing: a request for the bare base URL gets
//!   the negotiated language appended to its URI.
//! - `route_shutdown`, after routing: the `language` parameter the route
//!   extracted is checked against the catalog and committed as the active
//!   locale, and published as a global router parameter for link generation.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::PikeError;
use crate::i18n::{LanguageRegistry, Locale, Translator};

/// Name of the request and router parameter holding the language.
pub const LANGUAGE_PARAM: &str = "language";

/// Any two-letter lower-case code.
pub const DEFAULT_LANGUAGE_PATTERN: &str = "^[a-z]{2}$";

/// The parts of a request the plugin reads and rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    request_uri: String,
    base_url: String,
    params: HashMap<String, String>,
}

impl RequestState {
    /// `base_url` is the path the application is mounted on, without a
    /// trailing slash ("" when mounted at the root).
    pub fn new(request_uri: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            request_uri: request_uri.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            params: HashMap::new(),
        }
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn set_request_uri(&mut self, uri: impl Into<String>) {
        self.request_uri = uri.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URI path below the base URL, without query string.
    pub fn path_info(&self) -> &str {
        let path = self.request_uri.split(['?', '#']).next().unwrap_or_default();
        path.strip_prefix(self.base_url.as_str()).unwrap_or(path)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// Parameters the router adds to every URL it generates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterParams {
    base_url: String,
    global: HashMap<String, String>,
}

impl RouterParams {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            global: HashMap::new(),
        }
    }

    pub fn set_global_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.global.insert(name.into(), value.into());
    }

    pub fn global_param(&self, name: &str) -> Option<&str> {
        self.global.get(name).map(String::as_str)
    }

    /// Build a URL for `path`, prefixed with the published language.
    pub fn assemble(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self.global_param(LANGUAGE_PARAM) {
            Some(language) if path.is_empty() => format!("{}/{}/", self.base_url, language),
            Some(language) => format!("{}/{}/{}", self.base_url, language, path),
            None => format!("{}/{}", self.base_url, path),
        }
    }
}

/// Language state of one request: active and default locale, and the
/// catalog bound to the active locale.
#[derive(Debug, Clone)]
pub struct LanguageContext {
    pub locale: Locale,
    pub default_locale: Locale,
    pub translator: Translator,
    /// Translator for route segments, installed by `route_startup`.
    pub route_translator: Option<Translator>,
}

impl LanguageContext {
    /// `locale` is the preferred locale (configured or detected).
    pub fn new(catalog: Arc<LanguageRegistry>, locale: Locale, default_locale: Locale) -> Self {
        Self {
            translator: Translator::new(catalog, locale.clone()),
            locale,
            default_locale,
            route_translator: None,
        }
    }

    pub fn language(&self) -> &str {
        self.locale.language()
    }

    fn commit(&mut self, locale: Locale) {
        self.translator.set_locale(locale.clone());
        if let Some(route_translator) = self.route_translator.as_mut() {
            route_translator.set_locale(locale.clone());
        }
        self.locale = locale;
    }
}

/// The route segment carrying the language, constrained by a regex.
#[derive(Debug, Clone)]
pub struct LanguageRoute {
    pattern: Regex,
}

impl LanguageRoute {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Match the first path segment; on success it becomes the `language`
    /// request parameter.
    pub fn route(&self, request: &mut RequestState) -> Option<String> {
        let segment = request
            .path_info()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();

        if segment.is_empty() || !self.pattern.is_match(&segment) {
            debug!(segment = %segment, "No language segment in request path");
            return None;
        }

        request.set_param(LANGUAGE_PARAM, segment.clone());
        Some(segment)
    }
}

impl Default for LanguageRoute {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_LANGUAGE_PATTERN).expect("default pattern is valid"),
        }
    }
}

/// Two-phase language negotiation around routing.
#[derive(Debug, Clone, Default)]
pub struct LanguagePlugin {
    route: LanguageRoute,
}

impl LanguagePlugin {
    pub fn new(route: LanguageRoute) -> Self {
        Self { route }
    }

    /// Before routing: give a bare base-URL request a language segment.
    ///
    /// The preferred locale's language is used when the catalog has it,
    /// the default locale's otherwise.
    pub fn route_startup(&self, request: &mut RequestState, ctx: &mut LanguageContext) {
        let uri = request.request_uri().to_string();
        if uri.strip_suffix('/') != Some(request.base_url()) {
            return;
        }

        let mut language = ctx.language().to_string();
        if !ctx.translator.is_available(&language) {
            debug!(
                preferred = %language,
                default = %ctx.default_locale,
                "Preferred language not available, using default"
            );
            let default_locale = ctx.default_locale.clone();
            ctx.commit(default_locale);
            language = ctx.language().to_string();
        }

        request.set_request_uri(format!("{uri}{language}/"));
        request.set_param(LANGUAGE_PARAM, language.clone());
        ctx.route_translator = Some(ctx.translator.clone());

        info!(language = %language, "Added language to bare request URI");
    }

    /// Routing: extract the language segment into the request parameters.
    pub fn route(&self, request: &mut RequestState) -> Option<String> {
        self.route.route(request)
    }

    /// After routing: validate and commit the request's language.
    ///
    /// A missing parameter means the default language. A language that is
    /// neither in the catalog nor the default fails the request.
    pub fn route_shutdown(
        &self,
        request: &RequestState,
        ctx: &mut LanguageContext,
        router: &mut RouterParams,
    ) -> Result<(), PikeError> {
        let default_language = ctx.default_locale.language().to_string();
        let language = request
            .param(LANGUAGE_PARAM)
            .map(str::to_string)
            .unwrap_or_else(|| default_language.clone());

        if !ctx.translator.is_available(&language) && language != default_language {
            warn!(language = %language, "Translation language is not available");
            return Err(PikeError::UnsupportedLanguage(language));
        }

        ctx.commit(Locale::new(&language));
        router.set_global_param(LANGUAGE_PARAM, language.clone());

        debug!(language = %language, "Committed request language");
        Ok(())
    }
}
