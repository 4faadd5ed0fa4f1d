// src/lib.rs

pub mod artifact;
pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod fact;
pub mod factories;
pub mod governance;
pub mod http;
pub mod knowledge;
pub mod memory;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod session;
pub mod state;
pub mod tracing_core;
pub mod utils;

pub use config::CONFIG;
pub use error::{DomainError, DomainResult};
pub use state::ServerState;
