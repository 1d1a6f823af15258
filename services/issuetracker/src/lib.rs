//! Issue tracker service library crate.
//!
//! # Purpose
//! Exposes the HTTP API surface, validation rules, configuration, and storage
//! implementations for use by the binary and tests.
pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
pub mod validate;
