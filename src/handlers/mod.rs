pub mod healthcheck;
pub mod movies;

use axum::{
    http::{header, Method},
    response::IntoResponse,
};

use crate::error::ApiError;

pub use healthcheck::healthcheck;
pub use movies::{create_movie, list_movies, show_movie};

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Fallback for known routes hit with an unsupported method. `allow` lists
/// the methods the route does serve and is sent back in the `Allow` header.
pub async fn method_not_allowed(method: Method, allow: &'static str) -> impl IntoResponse {
    ([(header::ALLOW, allow)], ApiError::method_not_allowed(method.as_str()))
}
