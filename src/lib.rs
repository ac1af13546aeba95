//! `AppScout` - Similar installed app detection
//!
//! Enumerates the applications installed on a device, fuzzy-matches their names
//! against a watch list served by a remote service, and reports the device to
//! that service when anything resembles a watched app. The [`controller::Dashboard`]
//! drives one detection pass per session from lifecycle events; every failure
//! along the way degrades to an advisory notice.
//!
//! # Pipeline
//!
//! ```text
//! AppEnumerator → SimilarityMatcher ← RemoteService::fetch_reference_names
//!                        ↓
//!             RemoteService::report (only when something matched)
//! ```

// Module declarations
pub mod api;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod matcher;
pub mod platform;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{AppScoutError, Result};
pub use matcher::{SimilarityMatcher, find_similar};
