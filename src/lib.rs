//! postboard library
//!
//! Exposes the API client, the response and users caches, and the browser
//! state for use by the binary and integration tests.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod logging;
pub mod posts;
pub mod ui;
pub mod users;
