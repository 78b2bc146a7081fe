//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared services
//! every handler needs.

use assessor_core::session::SessionOrchestrator;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SessionOrchestrator>,
}
