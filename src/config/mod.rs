//! Configuration management module
//!
//! This module handles loading, saving, and managing application configuration.
//! Configuration is stored in `<data dir>/config.json` with atomic writes
//! to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{AdbSettings, ApiSettings, AppConfig, DetectionSettings, Endpoints, EnumeratorKind};
