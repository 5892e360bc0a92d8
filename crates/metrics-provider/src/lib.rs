//! # Metrics Provider
//!
//! HTTP adapters fetching current player counts from upstream providers
//! (Steam's JSON API, an OSRS page scrape) behind one small trait.

mod client;
mod error;

pub use client::{HttpProviderAdapter, ProviderAdapter};
pub use error::ProviderError;
