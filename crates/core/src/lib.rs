//! Core types and shared functionality for airgrid.
//!
//! This crate provides:
//! - Response-store abstraction with disk, memory, and no-op backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{DiskStore, MemoryStore, NoopStore, ResponseStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
