//! Avmeta - multi-source AV metadata resolver
//!
//! This library crate exposes the resolution pipeline for integration testing:
//! content sources with session bootstrap, enrichment scrapers, and the
//! managers that orchestrate cache lookup, ordered source fallback, scraper
//! enrichment, and cover persistence.

pub mod config;
pub mod covers;
pub mod extract;
pub mod http;
pub mod scraper;
pub mod source;
