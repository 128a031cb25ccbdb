//! Data layer for Sieve.
//!
//! Discovers and reads CloudFront access logs, filters out unwanted
//! requests, segments visitor sessions and aggregates everything into the
//! analytics report written by the `compute` command.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;
pub mod report;
pub mod sessions;

pub use sieve_core as core;
