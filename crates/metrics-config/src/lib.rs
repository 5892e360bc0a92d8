//! # Metrics Config
//!
//! Environment variable loading via `dotenvy`, typed `Settings`.

pub mod settings;

pub use settings::Settings;
