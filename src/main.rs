use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router, ServiceExt};
use serde_json::json;
use tower::Layer;
use tower_http::trace::TraceLayer;
use tracing::info;

use pike::config::Config;
use pike::grid::{ArrayDataSource, ColumnOptions, Grid, GridRequest, GridResponse, SortDirection};
use pike::i18n::LanguageRegistry;
use pike::json::JsObject;
use pike::middleware::{negotiate_language, LanguageState, RequestLanguage};
use pike::PikeError;

struct AppState {
    catalog: Arc<LanguageRegistry>,
    rows_per_page: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pike=info".parse()?)
                .add_directive("pike_demo=info".parse()?),
        )
        .init();

    info!("Starting pike demo server");

    let config = Config::from_env()?;
    let language_state = LanguageState::from_config(&config)?;
    let state = Arc::new(AppState {
        catalog: language_state.catalog.clone(),
        rows_per_page: config.rows_per_page,
    });

    let router = Router::new()
        .route("/:language", get(languages_page))
        .route("/:language/", get(languages_page))
        .route("/:language/data", post(languages_data))
        .route("/:language/:page", get(translated_page))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Language negotiation wraps the router so it can rewrite URIs before routing
    let app = axum::middleware::from_fn_with_state(language_state, negotiate_language).layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

/// The languages grid, labelled in the request's language.
fn languages_grid(state: &AppState, lang: &RequestLanguage) -> Result<Grid, PikeError> {
    let rows: Vec<serde_json::Value> = state
        .catalog
        .list_all()
        .iter()
        .map(|l| {
            json!({
                "code": l.code,
                "name": l.name,
                "enabled": l.enabled,
                "messages": l.messages.len(),
            })
        })
        .collect();

    let mut source = ArrayDataSource::from_values(rows);
    source.set_identifier_column("code");
    source.set_default_sorting("code", SortDirection::Asc);

    let t = |key: &str| lang.translator.translate(key);
    let (code, name, enabled, messages) = (t("Code"), t("Name"), t("Enabled"), t("Messages"));

    let mut grid = Grid::with_data_source(source);
    grid.set_id("languages")
        .set_classes("scroll")
        .set_url(lang.url("data"))
        .set_attribute("caption", t("Languages"));

    grid.add_column(
        "code",
        "code",
        Some(code.as_str()),
        Some("code"),
        ColumnOptions::new().attribute("width", 60),
    )?
    .add_column("name", "name", Some(name.as_str()), Some("name"), ())?
    .add_column("enabled", "enabled", Some(enabled.as_str()), None, ())?
    .add_column(
        "messages",
        "messages",
        Some(messages.as_str()),
        Some("messages"),
        ColumnOptions::new().attribute("align", "right"),
    )?;

    grid.set_rows_per_page(state.rows_per_page)?;
    grid.set_method(
        "filterToolbar",
        JsObject::new().with("stringResult", true).with("searchOnEnter", false),
    );
    grid.set_row_click_event(format!(
        "window.location = '{}?selected=' + rowId;",
        lang.url("")
    ));

    Ok(grid)
}

fn render_page(state: &AppState, lang: &RequestLanguage) -> Result<Html<String>, PikeError> {
    let grid = languages_grid(state, lang)?;
    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="{language}">
<head><title>{title}</title></head>
<body>
{html}
<script>
$(function() {{
{javascript}
}});
</script>
</body>
</html>"#,
        language = lang.language(),
        title = lang.translator.translate("Languages"),
        html = grid.html(),
        javascript = grid.javascript(true)?,
    )))
}

async fn languages_page(
    State(state): State<Arc<AppState>>,
    Extension(lang): Extension<RequestLanguage>,
) -> Result<Html<String>, PikeError> {
    render_page(&state, &lang)
}

async fn languages_data(
    State(state): State<Arc<AppState>>,
    Extension(lang): Extension<RequestLanguage>,
    Form(request): Form<GridRequest>,
) -> Result<Json<GridResponse>, PikeError> {
    let grid = languages_grid(&state, &lang)?;
    let source = grid.data_source().ok_or(PikeError::MissingDataSource)?;
    Ok(Json(source.query(&request)))
}

/// The languages page under its translated path segment (e.g. `/nl/talen`).
async fn translated_page(
    State(state): State<Arc<AppState>>,
    Extension(lang): Extension<RequestLanguage>,
    Path((_, page)): Path<(String, String)>,
) -> Result<Response, PikeError> {
    if page != lang.translator.translate("languages") {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    Ok(render_page(&state, &lang)?.into_response())
}
