use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use crate::filter::{calculate_metadata, Filters, Metadata, SortDirection};
use crate::validator::{unique, Validator};

use super::runtime::Runtime;
use super::ModelError;

/// Sort expressions accepted by `GET /v1/movies`.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub version: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(movie.title.len() <= 500, "title", "must not be more than 500 bytes long");

    v.check(movie.year != 0, "year", "must be provided");
    v.check((1900..=2100).contains(&movie.year), "year", "must be between 1900 and 2100");

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(movie.runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(!movie.genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(movie.genres.len() <= 10, "genres", "must not contain more than 10 genres");
    v.check(unique(&movie.genres), "genres", "must not contain duplicate values");
}

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    movies: Vec<Movie>,
}

/// In-memory movie table. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MovieModel {
    store: Arc<RwLock<Store>>,
}

impl MovieModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `movie`, assigning its id, creation time and version.
    pub fn insert(&self, mut movie: Movie) -> Movie {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.next_id += 1;
        movie.id = store.next_id;
        movie.created_at = Utc::now();
        movie.version = 1;
        store.movies.push(movie.clone());
        movie
    }

    pub fn get(&self, id: i64) -> Result<Movie, ModelError> {
        if id < 1 {
            return Err(ModelError::RecordNotFound);
        }
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ModelError::RecordNotFound)
    }

    /// Movies whose title contains `title` (case-insensitive, empty matches
    /// all) and which carry every genre in `genres`, ordered and paged by
    /// `filters`. `filters` must already be validated.
    ///
    /// `UnsupportedSortColumn` only occurs when `MOVIE_SORT_SAFELIST` names a
    /// column `column_comparator` does not know; an unchecked sort value
    /// panics in `sort_column` before that.
    pub fn get_all(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), ModelError> {
        let column = filters.sort_column();
        let compare = column_comparator(column)?;
        let direction = filters.sort_direction();

        let needle = title.to_lowercase();
        let mut matched: Vec<Movie> = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            store
                .movies
                .iter()
                .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
                .filter(|m| genres.iter().all(|g| m.genres.contains(g)))
                .cloned()
                .collect()
        };

        matched.sort_by(|a, b| {
            let primary = match direction {
                SortDirection::Asc => compare(a, b),
                SortDirection::Desc => compare(b, a),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let metadata = calculate_metadata(total, filters.page, filters.page_size);

        let page = matched
            .into_iter()
            .skip(filters.offset().max(0) as usize)
            .take(filters.limit().max(0) as usize)
            .collect();

        Ok((page, metadata))
    }
}

type Comparator = fn(&Movie, &Movie) -> Ordering;

fn column_comparator(column: &str) -> Result<Comparator, ModelError> {
    let compare: Comparator = match column {
        "id" => |a: &Movie, b: &Movie| a.id.cmp(&b.id),
        "title" => |a: &Movie, b: &Movie| a.title.cmp(&b.title),
        "year" => |a: &Movie, b: &Movie| a.year.cmp(&b.year),
        "runtime" => |a: &Movie, b: &Movie| a.runtime.cmp(&b.runtime),
        other => return Err(ModelError::UnsupportedSortColumn(other.to_string())),
    };
    Ok(compare)
}
