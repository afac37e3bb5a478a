//! F1 Dashboard Server Library
//!
//! Exposes server components for integration testing.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod state;
pub mod web_ui;
