use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::{
    models::Movie,
    validation::{MovieSchema, ValidationIssues},
};

/// Dataset compiled into the binary, used when no seed file is configured.
pub const DEFAULT_SEED: &str = include_str!("../data/movies.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("seed data must be a JSON array of movies")]
    NotAnArray,
    #[error("seed record #{index} has no string id")]
    MissingId { index: usize },
    #[error("seed record '{0}' appears more than once")]
    DuplicateId(String),
    #[error("seed record '{id}' is invalid: {issues}")]
    InvalidRecord { id: String, issues: ValidationIssues },
}

/// Parses and fully validates a seed dataset.
///
/// Every record must carry a unique, non-empty string `id` and pass the
/// same schema a create request would.
pub fn parse_seed(raw: &str, schema: &MovieSchema) -> Result<Vec<Movie>, SeedError> {
    let Value::Array(records) = serde_json::from_str::<Value>(raw)? else {
        return Err(SeedError::NotAnArray);
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut movies = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(SeedError::MissingId { index })?;

        if !seen.insert(id.to_string()) {
            return Err(SeedError::DuplicateId(id.to_string()));
        }

        let movie = schema
            .validate_full(record)
            .map_err(|issues| SeedError::InvalidRecord {
                id: id.to_string(),
                issues,
            })?;
        movies.push(Movie::from_new(id, movie));
    }

    Ok(movies)
}

pub async fn load_seed_file(path: &Path, schema: &MovieSchema) -> Result<Vec<Movie>, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    parse_seed(&raw, schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> MovieSchema {
        MovieSchema::with_max_year(2027)
    }

    #[test]
    fn embedded_dataset_is_valid() {
        let movies = parse_seed(DEFAULT_SEED, &schema()).expect("embedded seed should load");

        assert!(!movies.is_empty());
        assert!(movies.iter().all(|movie| !movie.genre.is_empty()));
    }

    #[test]
    fn missing_rate_defaults_like_a_create() {
        let raw = r#"[{
            "id": "a1", "title": "X", "year": 2000, "director": "D",
            "duration": 100, "poster": "http://x/p.jpg", "genre": ["Drama"]
        }]"#;

        let movies = parse_seed(raw, &schema()).expect("seed should load");
        assert_eq!(movies[0].id, "a1");
        assert_eq!(movies[0].rate, 0.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let record = r#"{
            "id": "a1", "title": "X", "year": 2000, "director": "D",
            "duration": 100, "poster": "http://x/p.jpg", "genre": ["Drama"]
        }"#;
        let raw = format!("[{record}, {record}]");

        let err = parse_seed(&raw, &schema()).expect_err("duplicate id");
        assert!(matches!(err, SeedError::DuplicateId(id) if id == "a1"));
    }

    #[test]
    fn records_without_ids_are_rejected() {
        let raw = r#"[{ "title": "X" }]"#;
        let err = parse_seed(raw, &schema()).expect_err("missing id");
        assert!(matches!(err, SeedError::MissingId { index: 0 }));
    }

    #[test]
    fn invalid_records_name_the_offender() {
        let raw = r#"[{ "id": "bad", "title": "" }]"#;
        let err = parse_seed(raw, &schema()).expect_err("invalid record");
        match err {
            SeedError::InvalidRecord { id, issues } => {
                assert_eq!(id, "bad");
                assert!(issues.issues().iter().any(|issue| issue.references("title")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_array_seed_is_rejected() {
        let err = parse_seed(r#"{ "movies": [] }"#, &schema()).expect_err("object seed");
        assert!(matches!(err, SeedError::NotAnArray));
    }
}
