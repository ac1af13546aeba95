//! Platform collaborators
//!
//! This module provides the two capabilities the detection pass needs from
//! the platform it runs on.
//!
//! # Overview
//!
//! - **Installed-app enumeration**: [`AppEnumerator`] returns a snapshot of
//!   installed app names. [`HostAppEnumerator`] reads the local machine,
//!   [`AdbAppEnumerator`] reads an attached Android device.
//! - **Similar-app broadcasts**: [`SimilarAppEvents`] delivers out-of-process
//!   "similar app detected" notifications to listeners holding a
//!   [`Subscription`].
//!
//! Enumeration failures are never fatal: [`enumerate_or_empty`] turns them
//! into an empty snapshot so detection simply finds nothing.

pub mod adb;
pub mod bridge;
pub mod host;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

pub use adb::AdbAppEnumerator;
pub use bridge::{SimilarAppEvents, Subscription};
pub use host::HostAppEnumerator;

use crate::config::{AppConfig, EnumeratorKind};
use crate::error::Result;
use std::collections::HashSet;
use tracing::{info, warn};

/// Source of installed application names
pub trait AppEnumerator: Send + Sync {
    /// Snapshot of installed app names at call time
    fn installed_apps(&self) -> Result<Vec<String>>;
}

/// Enumerate installed apps, degrading any failure to an empty list
pub fn enumerate_or_empty(enumerator: &dyn AppEnumerator) -> Vec<String> {
    match enumerator.installed_apps() {
        Ok(apps) => {
            info!("Found {} installed app(s)", apps.len());
            apps
        }
        Err(e) => {
            warn!("Installed-app enumeration failed, continuing with none: {}", e);
            Vec::new()
        }
    }
}

/// Build the enumerator selected in the configuration
pub fn enumerator_for(config: &AppConfig) -> Box<dyn AppEnumerator> {
    match config.enumerator {
        EnumeratorKind::Host => Box::new(HostAppEnumerator::new()),
        EnumeratorKind::Adb => Box::new(AdbAppEnumerator::new(config.adb.serial.clone())),
    }
}

/// Trim names, drop blanks, and drop repeats while keeping first-seen order
pub(crate) fn dedup_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}
