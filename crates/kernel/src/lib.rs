//! Translator Kernel Library
//!
//! Machine translation with a fingerprint-keyed cache, human-submitted
//! alternatives with ratings, and per-request access logging.
//! The main entry point for running the server is the `translator` binary.

pub mod compact_id;
pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod languages;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use compact_id::CompactId;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
