pub mod analyzer;
pub mod config;
pub mod export;
pub mod health;
pub mod import;
pub mod models;
pub mod session;
pub mod watcher;
