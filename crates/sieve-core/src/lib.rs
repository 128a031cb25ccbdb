//! Shared types for Sieve.
//!
//! Holds the parsed access-log record, the analytics report shape, the error
//! type, CLI settings and the date/time helpers used for grouping keys.

pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, SieveError};
