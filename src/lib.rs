//! transitboard library
//!
//! Exposes the API client, refreshing cache, refresh controller, data models and
//! UI for use by the binary and integration tests.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod refresh;
pub mod ui;
