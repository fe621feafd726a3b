use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Pagination summary attached to list responses. Zero fields are left out
/// of the JSON, so an empty result serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_records_means_empty_metadata() {
        assert_eq!(calculate_metadata(0, 1, 20), Metadata::default());
        assert_eq!(calculate_metadata(0, 7, 3), Metadata::default());
        assert_eq!(serde_json::to_string(&Metadata::default()).unwrap(), "{}");
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(
            calculate_metadata(50, 2, 20),
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 3,
                total_records: 50,
            }
        );
        assert_eq!(calculate_metadata(40, 1, 20).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }

    #[test]
    fn metadata_serializes_snake_case_fields() {
        let json = serde_json::to_value(calculate_metadata(3, 1, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current_page": 1,
                "page_size": 2,
                "first_page": 1,
                "last_page": 2,
                "total_records": 3
            })
        );
    }
}
