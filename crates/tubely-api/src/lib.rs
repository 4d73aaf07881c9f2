//! Tubely API library
//!
//! HTTP surface of the ingest service: authentication, upload handlers, the
//! owner gate and per-video locking, and application setup. Exposed as a
//! library so integration tests can build the router.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
