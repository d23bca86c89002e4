//! Shared types for avmeta.
//!
//! Currently this crate only carries the unified [`Error`] type and the
//! [`Result`] alias used by the persistence layer and the resolver crates.

mod error;

pub use error::{Error, Result};
