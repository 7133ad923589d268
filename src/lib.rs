//! Library Ledger
//!
//! A REST JSON server for a small library: a catalogue of books with their
//! available copies, and an append-only ledger of borrows that withdraws
//! copies atomically.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.library.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
