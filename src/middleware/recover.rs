use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::error::ApiError;

/// Turn a handler panic into a 500 and close the connection. Used with
/// `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn recover_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let mut response = ApiError::internal_server_error(format!("panic: {}", detail)).into_response();
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerErrorDetail;
    use axum::http::StatusCode;

    #[test]
    fn panic_payload_becomes_logged_detail() {
        let response = recover_panic(Box::new("unsafe sort parameter: rating".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(
            response.extensions().get::<ServerErrorDetail>().unwrap().0,
            "panic: unsafe sort parameter: rating"
        );

        let response = recover_panic(Box::new("static message"));
        assert_eq!(
            response.extensions().get::<ServerErrorDetail>().unwrap().0,
            "panic: static message"
        );
    }
}
