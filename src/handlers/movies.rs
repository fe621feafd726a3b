use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use chrono::Utc;
use serde::Deserialize;

use crate::api::{read_csv, read_id_param, read_int, read_json, read_string, write_json, QueryValues};
use crate::data::{validate_movie, Movie, Runtime, MOVIE_SORT_SAFELIST};
use crate::error::{envelope, ApiError, ApiResult};
use crate::filter::{validate_filters, Filters};
use crate::validator::Validator;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateMovieInput {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

/// POST /v1/movies
pub async fn create_movie(State(state): State<AppState>, body: Body) -> ApiResult {
    let input: CreateMovieInput = read_json(body, state.config.api.max_request_size_bytes).await?;

    let movie = Movie {
        id: 0,
        created_at: Utc::now(),
        title: input.title,
        year: input.year,
        runtime: input.runtime,
        genres: input.genres,
        version: 0,
    };

    let mut v = Validator::new();
    validate_movie(&mut v, &movie);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let movie = state.models.movies.insert(movie);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&format!("/v1/movies/{}", movie.id))?,
    );

    write_json(StatusCode::CREATED, &envelope("movie", &movie)?, Some(&headers))
}

/// GET /v1/movies/:id
pub async fn show_movie(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = read_id_param(&id).map_err(|_| ApiError::not_found())?;
    let movie = state.models.movies.get(id)?;

    write_json(StatusCode::OK, &envelope("movie", &movie)?, None)
}

/// GET /v1/movies?title=&genres=&page=&page_size=&sort=
pub async fn list_movies(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult {
    let qs = QueryValues::parse(query.as_deref().unwrap_or(""));
    let mut v = Validator::new();

    let title = read_string(&qs, "title", "");
    let genres = read_csv(&qs, "genres", Vec::new());
    let filters = Filters {
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", 20, &mut v),
        sort: read_string(&qs, "sort", "id"),
        sort_safelist: MOVIE_SORT_SAFELIST,
    };

    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let (movies, metadata) = state.models.movies.get_all(&title, &genres, &filters)?;

    let data = envelope("movies", &movies)?.with("metadata", &metadata)?;
    write_json(StatusCode::OK, &data, None)
}
