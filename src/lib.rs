//! jqGrid configuration building and URL-prefix language negotiation for
//! axum applications.

pub mod config;
pub mod error;
pub mod grid;
pub mod i18n;
pub mod json;
pub mod language;
pub mod middleware;

pub use error::PikeError;
