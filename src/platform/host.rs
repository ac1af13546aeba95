//! Installed applications of the local machine
//!
//! Each desktop platform keeps its own inventory: XDG `.desktop` entries on
//! Linux, `.app` bundles on macOS, and the Uninstall registry keys on Windows.
//! Platforms without an inventory report an empty list.

use crate::error::Result;
use crate::platform::{AppEnumerator, dedup_names};

/// Installed applications of the machine this process runs on
#[derive(Debug, Clone, Copy, Default)]
pub struct HostAppEnumerator;

impl HostAppEnumerator {
    /// Create the enumerator
    pub fn new() -> Self {
        Self
    }
}

impl AppEnumerator for HostAppEnumerator {
    fn installed_apps(&self) -> Result<Vec<String>> {
        #[cfg(target_os = "linux")]
        let names = super::linux::installed_app_names()?;

        #[cfg(target_os = "macos")]
        let names = super::macos::installed_app_names()?;

        #[cfg(windows)]
        let names = super::windows::installed_app_names()?;

        #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
        let names: Vec<String> = Vec::new();

        Ok(dedup_names(names))
    }
}
