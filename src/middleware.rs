//! axum middleware running the language plugin around routing.
//!
//! The middleware has to see the request before the router does, since it
//! may rewrite the URI. Wrap the whole router rather than adding it with
//! `Router::layer`:
//!
//! ```rust,ignore
//! use axum::ServiceExt;
//! use tower::Layer;
//!
//! let app = axum::middleware::from_fn_with_state(state, negotiate_language).layer(router);
//! axum::serve(listener, ServiceExt::<axum::extract::Request>::into_make_service(app)).await?;
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::config::Config;
use crate::i18n::{LanguageRegistry, Locale, LocaleSetting, Translator};
use crate::language::{LanguageContext, LanguagePlugin, LanguageRoute, RequestState, RouterParams};

/// Shared configuration of the middleware.
#[derive(Debug, Clone)]
pub struct LanguageState {
    pub plugin: Arc<LanguagePlugin>,
    pub catalog: Arc<LanguageRegistry>,
    pub base_url: String,
    pub locale: LocaleSetting,
    pub default_locale: Locale,
}

impl LanguageState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let route = LanguageRoute::new(&config.language_pattern)
            .with_context(|| format!("Invalid LANGUAGE_PATTERN '{}'", config.language_pattern))?;

        let catalog = match &config.translations_file {
            Some(path) => LanguageRegistry::from_json_file(path)?,
            None => LanguageRegistry::from_codes(&config.languages),
        };

        Ok(Self {
            plugin: Arc::new(LanguagePlugin::new(route)),
            catalog: Arc::new(catalog),
            base_url: config.base_url.clone(),
            locale: LocaleSetting::parse(&config.locale),
            default_locale: Locale::new(&config.default_locale),
        })
    }
}

/// Language data of the current request, available to handlers as an
/// `Extension<RequestLanguage>`.
#[derive(Debug, Clone)]
pub struct RequestLanguage {
    pub locale: Locale,
    pub translator: Translator,
    /// Set when the request URI was rewritten to include the language.
    pub route_translator: Option<Translator>,
    pub router: RouterParams,
}

impl RequestLanguage {
    pub fn language(&self) -> &str {
        self.locale.language()
    }

    /// URL for `path` in the request's language.
    pub fn url(&self, path: &str) -> String {
        self.router.assemble(path)
    }
}

/// Negotiate the request language, rewrite bare base-URL requests and
/// reject unsupported languages with 404.
pub async fn negotiate_language(
    State(state): State<LanguageState>,
    mut req: Request,
    next: Next,
) -> Response {
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let preferred = state.locale.resolve(accept_language, &state.default_locale);
    let mut ctx = LanguageContext::new(
        state.catalog.clone(),
        preferred,
        state.default_locale.clone(),
    );

    let original_uri = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();
    let mut request = RequestState::new(original_uri.as_str(), state.base_url.as_str());

    state.plugin.route_startup(&mut request, &mut ctx);
    if request.request_uri() != original_uri {
        match request.request_uri().parse::<Uri>() {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => warn!("Failed to rewrite request URI {}: {}", request.request_uri(), e),
        }
    }

    state.plugin.route(&mut request);

    let mut router = RouterParams::new(state.base_url.as_str());
    if let Err(e) = state.plugin.route_shutdown(&request, &mut ctx, &mut router) {
        return e.into_response();
    }

    req.extensions_mut().insert(RequestLanguage {
        locale: ctx.locale,
        translator: ctx.translator,
        route_translator: ctx.route_translator,
        router,
    });

    next.run(req).await
}
