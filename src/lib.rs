//! Proposal Review Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod state;
