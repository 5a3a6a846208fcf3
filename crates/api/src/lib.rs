//! HTTP API: a stateless wrapper around the settlement functions.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
