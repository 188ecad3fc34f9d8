// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain
pub mod export;
pub mod llm;
pub mod project;
pub mod questions;
pub mod session;
pub mod template;

// Application layer
pub mod api;
pub mod server;

// Background tasks
pub mod tasks;
