#![deny(missing_docs)]

//! Core library for the document understanding service.

/// HTTP routing and REST handlers.
pub mod api;
/// Background removal of stale uploads.
pub mod cleanup;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters.
pub mod metrics;
/// Model runtime clients and the process-wide model registry.
pub mod models;
/// Document pipeline: extraction, summarization, and question answering.
pub mod processing;
