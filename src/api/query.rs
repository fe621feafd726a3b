use std::collections::HashMap;
use thiserror::Error;

use crate::validator::Validator;

/// Parsed URL query string. Repeated keys keep every value; lookups see the first.
#[derive(Debug, Clone, Default)]
pub struct QueryValues(HashMap<String, Vec<String>>);

impl QueryValues {
    pub fn parse(raw: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            values.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        Self(values)
    }

    /// First value for `key`, or "" when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

pub fn read_string(qs: &QueryValues, key: &str, default: &str) -> String {
    match qs.get(key) {
        "" => default.to_string(),
        value => value.to_string(),
    }
}

/// Split a comma-separated value. No trimming, no deduplication.
pub fn read_csv(qs: &QueryValues, key: &str, default: Vec<String>) -> Vec<String> {
    match qs.get(key) {
        "" => default,
        csv => csv.split(',').map(str::to_string).collect(),
    }
}

/// Parse an integer parameter. A bad value records an error on `v` under
/// `key` and yields `default`, so callers can keep collecting errors.
pub fn read_int(qs: &QueryValues, key: &str, default: i64, v: &mut Validator) -> i64 {
    let raw = qs.get(key);
    if raw.is_empty() {
        return default;
    }

    match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            v.add_error(key, "must be an integer value");
            default
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid id parameter")]
    InvalidId,
}

/// Record ids are positive integers.
pub fn read_id_param(raw: &str) -> Result<i64, ParamError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ParamError::InvalidId),
    }
}
