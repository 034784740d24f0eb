//! Gazette: a publishing backend with a cached public post API, a
//! session-gated admin surface and in-process performance metrics.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod monitor;
