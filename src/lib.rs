//! Content-based similar-items ranking service
//!
//! Given a reference media item, scores every eligible candidate in the
//! library by weighted attribute overlap (rating, genres, tags, studios,
//! shared people, release year) and returns the best matches together with
//! the uncapped match count.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
