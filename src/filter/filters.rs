use crate::validator::{permitted_value, Validator};

use super::types::SortDirection;

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination and sort intent for a list endpoint.
///
/// `sort` may carry a leading `-` for descending order. `sort_safelist` is
/// fixed per endpoint and is the only source of column names that can reach
/// an ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

fn strip_sign(value: &str) -> &str {
    value.strip_prefix('-').unwrap_or(value)
}

/// Every check runs, so one pass reports all problems.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(f.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");

    let permitted: Vec<&str> = f.sort_safelist.iter().map(|s| strip_sign(s)).collect();
    v.check(
        permitted_value(strip_sign(&f.sort), permitted.as_slice()),
        "sort",
        "invalid sort value",
    );
}

impl Filters {
    /// Column name to order by, without the direction sign.
    ///
    /// # Panics
    ///
    /// If `sort` is not in the safelist. Callers must run `validate_filters`
    /// first; reaching this with an unchecked value is a bug, and the result
    /// would otherwise be interpolated into SQL.
    pub fn sort_column(&self) -> &str {
        let column = strip_sign(&self.sort);
        match self
            .sort_safelist
            .iter()
            .find(|safe| **safe == self.sort || strip_sign(safe) == column)
        {
            Some(_) => column,
            None => panic!("unsafe sort parameter: {}", self.sort),
        }
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
