//! Error type shared by the grid builder and the language plugin.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PikeError {
    /// An operation needs the grid's data source but none was set.
    #[error("No data source defined")]
    MissingDataSource,

    /// The requested language is not in the catalog and is not the default.
    #[error("Translation language is not available: '{0}'")]
    UnsupportedLanguage(String),

    /// A column-level operation named a column that was never added.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),
}

impl PikeError {
    /// HTTP status a request failing with this error should get.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PikeError::UnsupportedLanguage(_) => StatusCode::NOT_FOUND,
            PikeError::MissingDataSource | PikeError::UnknownColumn(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PikeError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
