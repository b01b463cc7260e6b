use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Movie, MoviePatch, NewMovie},
};

/// The authoritative movie collection for the lifetime of the process.
///
/// Lookups return `None`/`false` as the not-found signal; the handler layer
/// decides how that surfaces to clients.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<Movie>>;
    async fn filter_by_genre(&self, genre: &str) -> AppResult<Vec<Movie>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Movie>>;
    async fn create(&self, payload: NewMovie) -> AppResult<Movie>;
    async fn update(&self, id: &str, patch: MoviePatch) -> AppResult<Option<Movie>>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Insertion-ordered in-memory store. A single lock serializes mutations.
#[derive(Default)]
pub struct InMemoryMovieRepository {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            movies: RwLock::new(movies),
        }
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn list_all(&self) -> AppResult<Vec<Movie>> {
        Ok(self.movies.read().await.clone())
    }

    async fn filter_by_genre(&self, genre: &str) -> AppResult<Vec<Movie>> {
        let matching = self
            .movies
            .read()
            .await
            .iter()
            .filter(|movie| movie.has_genre(genre))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Movie>> {
        let movie = self
            .movies
            .read()
            .await
            .iter()
            .find(|movie| movie.id == id)
            .cloned();
        Ok(movie)
    }

    async fn create(&self, payload: NewMovie) -> AppResult<Movie> {
        let mut movies = self.movies.write().await;

        let mut id = Uuid::new_v4().to_string();
        while movies.iter().any(|movie| movie.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let movie = Movie::from_new(id, payload);
        movies.push(movie.clone());

        info!(movie_id = %movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    async fn update(&self, id: &str, patch: MoviePatch) -> AppResult<Option<Movie>> {
        let mut movies = self.movies.write().await;
        let Some(movie) = movies.iter_mut().find(|movie| movie.id == id) else {
            return Ok(None);
        };

        movie.apply(patch);

        info!(movie_id = %movie.id, "movie updated");
        Ok(Some(movie.clone()))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut movies = self.movies.write().await;
        let Some(index) = movies.iter().position(|movie| movie.id == id) else {
            return Ok(false);
        };

        movies.remove(index);

        info!(movie_id = %id, "movie deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seeded_movie() -> Movie {
        Movie {
            id: "a1".to_string(),
            title: "X".to_string(),
            year: 2000,
            director: "D".to_string(),
            duration: 100,
            rate: 5.0,
            poster: "http://x/p.jpg".to_string(),
            genre: vec!["Drama".to_string()],
        }
    }

    fn new_movie(title: &str, genre: &[&str]) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: 2010,
            director: "Someone".to_string(),
            duration: 120,
            rate: 0.0,
            poster: "https://img.example.com/poster.jpg".to_string(),
            genre: genre.iter().map(|genre| genre.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_appends() {
        let repo = InMemoryMovieRepository::with_movies(vec![seeded_movie()]);

        let mut ids = HashSet::from(["a1".to_string()]);
        for title in ["first", "second", "third"] {
            let created = repo
                .create(new_movie(title, &["Action"]))
                .await
                .expect("create should succeed");
            assert_eq!(created.title, title);
            assert!(ids.insert(created.id), "ids must not repeat");
        }

        let titles: Vec<String> = repo
            .list_all()
            .await
            .expect("list should succeed")
            .into_iter()
            .map(|movie| movie.title)
            .collect();
        assert_eq!(titles, vec!["X", "first", "second", "third"]);
    }

    #[tokio::test]
    async fn created_movie_can_be_found() {
        let repo = InMemoryMovieRepository::new();
        let created = repo
            .create(new_movie("findable", &["Drama"]))
            .await
            .expect("create should succeed");

        let found = repo
            .find_by_id(&created.id)
            .await
            .expect("find should succeed");
        assert_eq!(found, Some(created));

        let missing = repo.find_by_id("nope").await.expect("find should succeed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn genre_filter_keeps_order_and_ignores_case() {
        let repo = InMemoryMovieRepository::with_movies(vec![seeded_movie()]);
        repo.create(new_movie("comedy", &["Comedy"]))
            .await
            .expect("create should succeed");
        repo.create(new_movie("drama two", &["Romance", "DRAMA"]))
            .await
            .expect("create should succeed");

        let titles: Vec<String> = repo
            .filter_by_genre("drama")
            .await
            .expect("filter should succeed")
            .into_iter()
            .map(|movie| movie.title)
            .collect();
        assert_eq!(titles, vec!["X", "drama two"]);

        let none = repo
            .filter_by_genre("western")
            .await
            .expect("filter should succeed");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let repo = InMemoryMovieRepository::with_movies(vec![seeded_movie()]);

        let updated = repo
            .update(
                "a1",
                MoviePatch {
                    year: Some(2020),
                    ..MoviePatch::default()
                },
            )
            .await
            .expect("update should succeed")
            .expect("movie should exist");

        let mut expected = seeded_movie();
        expected.year = 2020;
        assert_eq!(updated, expected);

        let stored = repo.find_by_id("a1").await.expect("find should succeed");
        assert_eq!(stored, Some(expected));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let repo = InMemoryMovieRepository::with_movies(vec![seeded_movie()]);

        let result = repo
            .update(
                "missing",
                MoviePatch {
                    title: Some("ghost".to_string()),
                    ..MoviePatch::default()
                },
            )
            .await
            .expect("update should succeed");

        assert!(result.is_none());
        assert_eq!(repo.list_all().await.unwrap(), vec![seeded_movie()]);
    }

    #[tokio::test]
    async fn delete_is_not_repeatable() {
        let repo = InMemoryMovieRepository::with_movies(vec![seeded_movie()]);

        assert!(repo.delete("a1").await.expect("delete should succeed"));
        assert!(!repo.delete("a1").await.expect("delete should succeed"));
        assert_eq!(repo.len().await, 0);
    }
}
