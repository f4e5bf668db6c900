//! FlowChat library.
//!
//! This module re-exports the core components for testing and extension.

pub mod app;
pub mod backend;
pub mod config;
pub mod events;
pub mod fallback;
pub mod logging;
pub mod protocol;
pub mod sanitize;
pub mod session;
pub mod state;
pub mod store;
pub mod transcript;
pub mod ui;
pub mod validation;
