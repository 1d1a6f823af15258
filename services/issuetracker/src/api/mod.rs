//! Issue tracker HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules together with the body extractor, the
//! response shaping, and the error helpers they share.
pub mod body;
pub mod error;
pub mod issues;
pub mod openapi;
pub mod response;
pub mod system;
pub mod types;
