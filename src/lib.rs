//! gallerycrawl - date-bounded crawler for JavaScript-rendered photo galleries.
//!
//! Library surface used by the CLI binary and the integration tests.

pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
