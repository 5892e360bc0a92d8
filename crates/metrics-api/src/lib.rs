//! Metrics tracker API server library.
//!
//! Exposes `app`/`routes` for the smoke tests; `main.rs` is the binary entry point.

pub mod app;
pub mod routes;
