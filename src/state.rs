use std::sync::Arc;

use crate::{repository::MovieRepository, validation::MovieSchema};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn MovieRepository>,
    pub schema: MovieSchema,
}

impl AppState {
    pub fn new(repo: Arc<dyn MovieRepository>) -> Self {
        Self::with_schema(repo, MovieSchema::current())
    }

    pub fn with_schema(repo: Arc<dyn MovieRepository>, schema: MovieSchema) -> Self {
        Self { repo, schema }
    }
}
