//! Integration tests for the pike crate
//!
//! These tests drive the grid builder and the language middleware through
//! their public APIs, the way an application would.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Extension, Router};
use proptest::prelude::*;
use tower::{Layer, ServiceExt};

use pike::grid::{ArrayDataSource, ColumnOptions, Grid, GridRequest, UNLIMITED_ROWS};
use pike::i18n::{LanguageConfig, LanguageRegistry, Locale, LocaleSetting};
use pike::json::{JsObject, JsValue};
use pike::language::{LanguagePlugin, LanguageRoute};
use pike::middleware::{negotiate_language, LanguageState, RequestLanguage};
use pike::PikeError;

// ==================== Test Helpers ====================

fn grid() -> Grid {
    let mut grid = Grid::with_data_source(ArrayDataSource::new(Vec::new()));
    grid.set_id("g1");
    grid
}

fn array<'a>(settings: &'a JsObject, key: &str) -> &'a [JsValue] {
    match settings.get(key) {
        Some(JsValue::Array(items)) => items,
        _ => &[],
    }
}

/// The settings object of the jqGrid constructor call, parsed back as JSON.
fn constructor_settings(script: &str) -> serde_json::Value {
    let start = script.find(".jqGrid(").expect("constructor call") + ".jqGrid(".len();
    let end = start + script[start..].find(");\n").expect("end of constructor call");
    serde_json::from_str(&script[start..end]).expect("settings are valid JSON")
}

fn language_state(locale: LocaleSetting) -> LanguageState {
    let catalog = LanguageRegistry::new()
        .with_language(LanguageConfig::new("en", "English"))
        .with_language(LanguageConfig::new("fr", "Français").with_message("news", "actualites"))
        .with_language(LanguageConfig::new("nl", "Nederlands").with_message("news", "nieuws"));

    LanguageState {
        plugin: Arc::new(LanguagePlugin::new(LanguageRoute::default())),
        catalog: Arc::new(catalog),
        base_url: String::new(),
        locale,
        default_locale: Locale::new("en"),
    }
}

async fn show(uri: Uri, Extension(lang): Extension<RequestLanguage>) -> String {
    format!(
        "{} {} {} {}",
        uri.path(),
        lang.language(),
        lang.url("news"),
        lang.translator.translate("news")
    )
}

async fn send(state: LanguageState, uri: &str, accept_language: Option<&str>) -> (StatusCode, String) {
    let router = Router::new()
        .route("/:language/", get(show))
        .route("/:language/news", get(show))
        .route("/sitemap", get(show));
    let app = axum::middleware::from_fn_with_state(state, negotiate_language).layer(router);

    let mut builder = Request::builder().uri(uri);
    if let Some(value) = accept_language {
        builder = builder.header(ACCEPT_LANGUAGE, value);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

// ==================== Grid Tests ====================

#[test]
fn test_grid_page_for_users() {
    let mut grid = grid();
    grid.set_url("/en/users/data")
        .set_attribute("caption", "Users")
        .set_attribute(
            "onSelectRow",
            JsValue::expr("function(id) { lastsel = id; }"),
        );
    grid.add_column("id", "u.id", Some("#"), Some("u.id"), ColumnOptions::new().attribute("width", 40))
        .unwrap()
        .add_column("name", "u.name", Some("Name"), Some("u.name"), ())
        .unwrap()
        .add_column("actions", "actions", Some("Actions"), None, ())
        .unwrap();

    let script = grid.javascript(false).unwrap();

    assert!(script.contains(r#""onSelectRow":function(id) { lastsel = id; }"#));
    assert!(script.contains(r##""colNames":["#","Name","Actions"]"##));
    assert!(script.contains(r#""url":"/en/users/data""#));
    assert!(script.contains(r#""caption":"Users""#));
}

#[test]
fn test_rendered_settings_are_json() {
    let mut grid = grid();
    grid.add_column("a", "a", Some("A"), Some("a"), ()).unwrap();
    grid.add_column("b", "b", Some("B"), None, ()).unwrap();

    let settings = constructor_settings(&grid.javascript(true).unwrap());

    assert_eq!(settings["datatype"], "json");
    assert_eq!(settings["mtype"], "post");
    assert_eq!(settings["viewrecords"], true);
    assert_eq!(settings["colModel"][0]["name"], "a");
    assert_eq!(settings["colModel"][1]["sortable"], false);
    assert!(settings["colModel"][0].get("data").is_none());
}

#[test]
fn test_sortable_forced_false_without_sort_index() {
    let mut grid = grid();
    grid.add_column(
        "a",
        "a",
        Some("A"),
        None,
        JsObject::new().with("sortable", true).with("width", 100),
    )
    .unwrap();

    let settings = grid.settings().unwrap();
    let model = array(&settings, "colModel")[0].as_object().unwrap();
    assert_eq!(model.get("sortable"), Some(&JsValue::Bool(false)));
    assert_eq!(model.get("width"), Some(&JsValue::from(100)));
}

#[test]
fn test_unlimited_rows_per_page() {
    let mut grid = grid();
    grid.set_rows_per_page(-1).unwrap();

    assert_eq!(grid.rows_per_page(), UNLIMITED_ROWS);
    assert_eq!(
        grid.settings().unwrap().get("rowNum"),
        Some(&JsValue::from(UNLIMITED_ROWS))
    );
}

#[test]
fn test_rows_per_page_before_data_source() {
    let mut grid: Grid = Grid::new();
    assert_eq!(grid.set_rows_per_page(20).err(), Some(PikeError::MissingDataSource));
}

#[test]
fn test_pager_id_follows_id_until_overridden() {
    let mut grid: Grid = Grid::new();
    grid.set_id("g1");
    assert_eq!(grid.pager_id(), "g1-pager");

    grid.set_pager_id("bottom");
    assert_eq!(grid.pager_id(), "bottom");
    assert!(grid.html().ends_with(r#"<div id="bottom"></div>"#));
}

#[test]
fn test_show_columns_reorders_and_hides() {
    let mut grid = grid();
    for name in ["a", "b", "c"] {
        grid.add_column(name, name, Some(name), None, ()).unwrap();
    }
    grid.show_columns(["b", "a"]).unwrap();

    let settings = grid.settings().unwrap();
    let names: Vec<&str> = array(&settings, "colNames")
        .iter()
        .filter_map(JsValue::as_str)
        .collect();
    let hidden: Vec<bool> = array(&settings, "colModel")
        .iter()
        .map(|m| m.as_object().and_then(|o| o.get("hidden")).is_some())
        .collect();

    assert_eq!(names, vec!["b", "a", "c"]);
    assert_eq!(hidden, vec![false, false, true]);
}

#[test]
fn test_width_overrides_autowidth() {
    let mut grid = grid();
    grid.set_attribute("autowidth", true);
    grid.set_attribute("width", "800");

    let settings = constructor_settings(&grid.javascript(false).unwrap());
    assert_eq!(settings["autowidth"], false);
    assert_eq!(settings["width"], "800");
}

#[test]
fn test_grid_answers_its_own_data_request() {
    let rows = vec![
        serde_json::json!({ "id": 1, "name": "Zoe" }),
        serde_json::json!({ "id": 2, "name": "Adam" }),
    ];
    let mut source = ArrayDataSource::from_values(rows);
    source.set_identifier_column("id");
    let mut grid = Grid::with_data_source(source);
    grid.add_column("name", "name", Some("Name"), Some("name"), ())
        .unwrap();
    grid.set_rows_per_page(1).unwrap();

    let request = GridRequest {
        sidx: "name".into(),
        sord: "ASC".into(),
        ..GridRequest::default()
    };
    let response = grid.data_source().unwrap().query(&request);

    assert_eq!(response.total, 2);
    assert_eq!(response.rows.len(), 1);
    assert_eq!(response.rows[0].id, serde_json::json!(2));
    assert_eq!(response.rows[0].cell, vec![serde_json::json!("Adam")]);
}

proptest! {
    #[test]
    fn prop_col_names_match_col_model(
        columns in proptest::collection::vec(
            ("[a-e]{1,2}", proptest::option::of("[A-Z][a-z]{0,6}"), proptest::option::of("[a-z.]{1,6}")),
            0..12,
        )
    ) {
        let mut grid = grid();
        let mut last_sort_index = HashMap::new();
        for (name, label, sort_index) in &columns {
            grid.add_column(name, name.as_str(), label.as_deref(), sort_index.as_deref(), ()).unwrap();
            last_sort_index.insert(name.clone(), sort_index.clone());
        }

        let settings = grid.settings().unwrap();
        let names = array(&settings, "colNames");
        let model = array(&settings, "colModel");

        prop_assert_eq!(names.len(), model.len());
        prop_assert_eq!(model.len(), last_sort_index.len());
        for (label, entry) in names.iter().zip(model) {
            let entry = entry.as_object().unwrap();
            prop_assert_eq!(entry.get("label"), Some(label));

            let name = entry.get("name").and_then(JsValue::as_str).unwrap();
            if last_sort_index[name].is_none() {
                prop_assert_eq!(entry.get("sortable"), Some(&JsValue::Bool(false)));
            }
        }
    }
}

// ==================== Language Middleware Tests ====================

#[tokio::test]
async fn test_bare_url_gets_default_for_unknown_preference() {
    let (status, body) = send(language_state(LocaleSetting::Auto), "/", Some("xx")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/en/ en /en/news news");
}

#[tokio::test]
async fn test_bare_url_gets_detected_language() {
    let (status, body) = send(
        language_state(LocaleSetting::Auto),
        "/",
        Some("fr-FR,fr;q=0.9,en;q=0.5"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/fr/ fr /fr/news actualites");
}

#[tokio::test]
async fn test_bare_url_with_fixed_locale() {
    let state = language_state(LocaleSetting::Fixed(Locale::new("nl")));
    let (status, body) = send(state, "/", Some("fr")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/nl/ nl /nl/news nieuws");
}

#[tokio::test]
async fn test_prefixed_url_commits_language() {
    let (status, body) = send(language_state(LocaleSetting::Auto), "/fr/news", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/fr/news fr /fr/news actualites");
}

#[tokio::test]
async fn test_unsupported_language_is_not_found() {
    let (status, body) = send(language_state(LocaleSetting::Auto), "/xx/news", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not available"));
}

#[tokio::test]
async fn test_route_without_language_uses_default() {
    let (status, body) = send(language_state(LocaleSetting::Auto), "/sitemap", Some("fr")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/sitemap en /en/news news");
}
