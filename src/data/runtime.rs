use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Running time in minutes. On the wire it is the string `"<n> mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct RuntimeVisitor;

impl<'de> de::Visitor<'de> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string of the form \"<n> mins\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Runtime, E> {
        value
            .strip_suffix(" mins")
            .and_then(|n| n.parse::<i32>().ok())
            .map(Runtime)
            .ok_or_else(|| E::custom("invalid runtime format"))
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Errors raised inside the visitor keep the position of the string.
        deserializer.deserialize_str(RuntimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_unit() {
        assert_eq!(serde_json::to_string(&Runtime(102)).unwrap(), "\"102 mins\"");
    }

    #[test]
    fn parses_only_the_unit_format() {
        assert_eq!(serde_json::from_str::<Runtime>("\"107 mins\"").unwrap(), Runtime(107));
        assert!(serde_json::from_str::<Runtime>("\"107 minutes\"").is_err());
        assert!(serde_json::from_str::<Runtime>("\"abc mins\"").is_err());
        assert!(serde_json::from_str::<Runtime>("107").is_err());
    }

    #[test]
    fn bad_runtime_is_reported_against_its_field() {
        use crate::api::{decode_json, DecodeError};

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Input {
            title: String,
            runtime: Runtime,
        }

        let err = decode_json::<Input>(br#"{"title": "Up", "runtime": "96 minutes"}"#).unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidField { ref field, .. } if field == "runtime"),
            "{:?}",
            err
        );
    }
}
