#![warn(clippy::all, missing_docs)]

//! Core domain logic for the StoreTUI client.
//!
//! This crate hosts the data models, configuration handling,
//! and the catalog client used by the terminal UI and any
//! future frontends.

pub mod catalog;
pub mod config;
pub mod models;

pub use catalog::CatalogClient;
pub use config::AppConfig;
pub use models::Game;
