use axum::body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

/// Default cap on request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

/// Why a request body could not be decoded. Every variant except
/// `Internal` is the client's fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("request body contains badly-formed JSON (at character {offset})")]
    Syntax { offset: usize },

    #[error("request body contains badly-formed JSON")]
    UnexpectedEof,

    #[error("request body contains an invalid value for the {field:?} field (at character {offset})")]
    InvalidField { field: String, offset: usize },

    #[error("request body contains incorrect JSON type (at character {offset})")]
    InvalidType { offset: usize },

    #[error("request body contains unknown key {0:?}")]
    UnknownField(String),

    #[error("request body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body must not be empty")]
    Empty,

    #[error("unable to decode request body: {0}")]
    Internal(String),
}

impl DecodeError {
    /// Internal errors are bugs on our side and map to a 5xx.
    pub fn is_internal(&self) -> bool {
        matches!(self, DecodeError::Internal(_))
    }
}

/// Collect at most `max_bytes` of `body` and decode it into `T`.
pub async fn read_json<T: DeserializeOwned>(body: Body, max_bytes: usize) -> Result<T, DecodeError> {
    let bytes = match Limited::new(body, max_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(DecodeError::TooLarge { limit: max_bytes });
        }
        Err(err) => {
            tracing::debug!("request body stream failed: {}", err);
            return Err(DecodeError::UnexpectedEof);
        }
    };

    decode_json(&bytes)
}

/// Decode a complete body into `T`, classifying any failure.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    serde_json::from_slice(body).map_err(|err| classify(body, &err))
}

fn classify(body: &[u8], err: &serde_json::Error) -> DecodeError {
    let offset = byte_offset(body, err.line(), err.column());

    match err.classify() {
        Category::Syntax => DecodeError::Syntax { offset },
        Category::Eof => DecodeError::UnexpectedEof,
        Category::Data => {
            let message = err.to_string();
            if let Some(field) = unknown_field_name(&message) {
                return DecodeError::UnknownField(field);
            }
            match field_path_at(body, offset) {
                Some(field) => DecodeError::InvalidField { field, offset },
                None => DecodeError::InvalidType { offset },
            }
        }
        // Decoding from an in-memory slice never performs I/O.
        Category::Io => DecodeError::Internal(err.to_string()),
    }
}

/// serde_json reports 1-based line/column; turn that into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    if line <= 1 {
        return column.min(body.len());
    }
    let line_start = body
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .nth(line - 2)
        .map(|(i, _)| i + 1)
        .unwrap_or(body.len());
    (line_start + column).min(body.len())
}

// serde: "unknown field `name`, expected one of ..."
fn unknown_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

enum Frame {
    Object(Option<String>),
    Array,
}

/// Dotted path of object keys enclosing `offset`, e.g. `"title"` or
/// `"cast.name"`. None when the offset is not inside any keyed value.
fn field_path_at(body: &[u8], offset: usize) -> Option<String> {
    let end = offset.min(body.len());
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0;

    while i < end {
        match body[i] {
            b'{' => stack.push(Frame::Object(None)),
            b'[' => stack.push(Frame::Array),
            b'}' | b']' => {
                stack.pop();
            }
            b'"' => {
                let start = i + 1;
                i = start;
                while i < body.len() && body[i] != b'"' {
                    if body[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                let text = String::from_utf8_lossy(&body[start..i.min(body.len())]).into_owned();

                let next = body[(i + 1).min(body.len())..]
                    .iter()
                    .find(|b| !b.is_ascii_whitespace());
                if next == Some(&b':') {
                    if let Some(Frame::Object(key)) = stack.last_mut() {
                        *key = Some(text);
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    let keys: Vec<&str> = stack
        .iter()
        .filter_map(|frame| match frame {
            Frame::Object(Some(key)) => Some(key.as_str()),
            _ => None,
        })
        .collect();

    if keys.is_empty() {
        None
    } else {
        Some(keys.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default, deny_unknown_fields)]
    struct Input {
        title: String,
        year: i32,
        genres: Vec<String>,
        cast: Option<Cast>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Cast {
        name: String,
    }

    #[test]
    fn decodes_valid_body() {
        let input: Input = decode_json(br#"{"title": "Moana", "year": 2016, "genres": ["animation"]}"#).unwrap();
        assert_eq!(input.title, "Moana");
        assert_eq!(input.year, 2016);
        assert_eq!(input.genres, vec!["animation".to_string()]);
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let err = decode_json::<Input>(br#"{"title": 123}"#).unwrap_err();
        match &err {
            DecodeError::InvalidField { field, .. } => assert_eq!(field, "title"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("\"title\""));
    }

    #[test]
    fn type_mismatch_inside_array_and_nested_object() {
        let err = decode_json::<Input>(br#"{"title": "x", "genres": ["drama", 7]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { ref field, .. } if field == "genres"));

        let err = decode_json::<Input>(b"{\"title\": \"x\",\n \"cast\": {\"name\": false}}").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { ref field, .. } if field == "cast.name"));
    }

    #[test]
    fn wrong_top_level_type() {
        let err = decode_json::<Input>(b"42").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { .. }));
    }

    #[test]
    fn empty_body() {
        assert_eq!(decode_json::<Input>(b"").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode_json::<Input>(b"  \n").unwrap_err(), DecodeError::Empty);
        assert_eq!(
            DecodeError::Empty.to_string(),
            "request body must not be empty"
        );
    }

    #[test]
    fn truncated_body_is_not_a_syntax_error() {
        let err = decode_json::<Input>(br#"{"title": "Moa"#).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEof);
    }

    #[test]
    fn malformed_body_reports_offset() {
        let err = decode_json::<Input>(br#"{"title": "Moana", }"#).unwrap_err();
        match err {
            DecodeError::Syntax { offset } => assert!(offset > 0 && offset <= 21),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = decode_json::<Input>(br#"{"title": "a"} {"title": "b"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Syntax { .. }));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = decode_json::<Input>(br#"{"title": "Moana", "rating": "PG"}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("rating".into()));
        assert!(!err.is_internal());
    }

    #[test]
    fn offsets_account_for_earlier_lines() {
        let body = b"{\n\"a\": 1,\n\"b\": 2}";
        assert_eq!(byte_offset(body, 1, 1), 1);
        assert_eq!(byte_offset(body, 3, 2), 12);
    }

    #[tokio::test]
    async fn oversized_body_is_its_own_category() {
        let body = Body::from(format!(r#"{{"title": "{}"}}"#, "x".repeat(64)));
        let err = read_json::<Input>(body, 16).await.unwrap_err();
        assert_eq!(err, DecodeError::TooLarge { limit: 16 });
    }

    #[tokio::test]
    async fn read_json_within_limit() {
        let body = Body::from(r#"{"title": "Up"}"#);
        let input: Input = read_json(body, DEFAULT_MAX_BODY_BYTES).await.unwrap();
        assert_eq!(input.title, "Up");
    }
}
