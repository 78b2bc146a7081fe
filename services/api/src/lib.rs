//! Assessment API Library Crate
//!
//! This library contains the HTTP surface of the assessment service: the
//! configuration, the application state, the API handlers and models, and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
