use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{ApiMessage, ListMoviesQuery, Movie},
    state::AppState,
    validation::unknown_fields,
};

pub const DELETED_MESSAGE: &str = "Movie deleted";

pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = match query.genre_filter() {
        Some(genre) => state.repo.filter_by_genre(genre).await?,
        None => state.repo.list_all().await?,
    };

    Ok(Json(movies))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = state
        .repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(movie))
}

pub async fn create_movie(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let payload = read_body(payload)?;
    let new_movie = state.schema.validate_full(&payload)?;

    let movie = state.repo.create(new_movie).await?;

    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Movie>> {
    let payload = read_body(payload)?;
    let patch = state.schema.validate_partial(&payload)?;

    if patch.is_empty() {
        debug!(movie_id = %id, "patch carries no known fields");
    }

    let movie = state
        .repo
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(movie))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiMessage>> {
    if !state.repo.delete(&id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiMessage::new(DELETED_MESSAGE)))
}

fn read_body(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::malformed_body(rejection.body_text()))?;

    if let Some(object) = payload.as_object() {
        let ignored = unknown_fields(object);
        if !ignored.is_empty() {
            debug!(fields = ?ignored, "ignoring unknown movie fields");
        }
    }

    Ok(payload)
}
