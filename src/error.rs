use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User not found.")]
    UserNotFound,

    #[error("Country not found.")]
    CountryNotFound,

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("template failure: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::UserNotFound | ApiError::CountryNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Template(_) => {
                error!(error = ?self, "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Server error.").into_response();
            }
        };

        (status, self.to_string()).into_response()
    }
}
