//! HTTP service: upload a CSV, preview the sync and run it.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
