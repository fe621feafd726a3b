use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Top-level shape of every JSON response: `{"movie": {...}}`,
/// `{"movies": [...], "metadata": {...}}`, `{"error": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key`. Fails only if `value` cannot be represented as JSON.
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Result<Self, serde_json::Error> {
        self.0.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Serialize `data` as the response body (newline-terminated), merge any
/// extra headers (every value of a repeated header is kept) and force
/// `Content-Type: application/json`.
pub fn write_json(
    status: StatusCode,
    data: &Envelope,
    headers: Option<&HeaderMap>,
) -> Result<Response, ApiError> {
    let mut body = serde_json::to_vec(data)?;
    body.push(b'\n');

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    if let Some(extra) = headers {
        let target = response.headers_mut();
        for (name, value) in extra.iter() {
            target.append(name.clone(), value.clone());
        }
    }
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(response)
}
