//! State management module
//! Immutable per-process state shared by every request handler

pub mod app_state;

pub use app_state::{AppState, SharedState};
