//! Installed applications from `.app` bundles
//!
//! Scans the system and user Applications folders. The bundle file stem is
//! used as the app name.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Names of the `.app` bundles in the Applications folders
pub fn installed_app_names() -> Result<Vec<String>> {
    let mut dirs = vec![PathBuf::from("/Applications")];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home).join("Applications"));
    }

    Ok(dirs.iter().flat_map(|dir| bundles_in_dir(dir)).collect())
}

fn bundles_in_dir(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "app"))
        .filter_map(|p| p.file_stem()?.to_str().map(str::to_string))
        .collect()
}
