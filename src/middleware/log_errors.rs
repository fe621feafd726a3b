use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ServerErrorDetail;
use crate::jsonlog::properties;
use crate::AppState;

/// Log every 5xx produced downstream, with the request method and URL.
pub async fn log_server_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let url = request.uri().to_string();

    let response = next.run(request).await;

    if let Some(detail) = response.extensions().get::<ServerErrorDetail>() {
        let props = properties([("request_method", method.as_str()), ("request_url", url.as_str())]);
        state.logger.print_error(detail, Some(&props));
    }

    response
}
