//! # Movies API
//!
//! A small REST service keeping a movie catalogue in process memory.
//!
//! - [`validation`] checks payloads against the movie schema (full or partial)
//! - [`repository`] holds the catalogue behind a single lock
//! - [`handlers`] wire the two together behind axum routes built in [`app`]
//! - [`cors`] turns away browsers from origins outside the allow-list
//!
//! The catalogue is seeded at startup from an embedded dataset ([`seed`]) and
//! never written back to disk.

pub mod app;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;
pub mod state;
pub mod validation;

pub use app::{build_router, build_router_with_policy};
pub use error::{AppError, AppResult};
pub use models::{Movie, MoviePatch, NewMovie};
pub use repository::{InMemoryMovieRepository, MovieRepository};
pub use state::AppState;
pub use validation::{Issue, MovieSchema, ValidationIssues};
