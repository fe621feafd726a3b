pub mod movies;
pub mod runtime;

use thiserror::Error;

pub use movies::{validate_movie, Movie, MovieModel, MOVIE_SORT_SAFELIST};
pub use runtime::Runtime;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("record not found")]
    RecordNotFound,

    #[error("no ordering defined for column {0:?}")]
    UnsupportedSortColumn(String),
}

/// Every data model the handlers use.
#[derive(Debug, Clone, Default)]
pub struct Models {
    pub movies: MovieModel,
}

impl Models {
    pub fn new() -> Self {
        Self::default()
    }
}
