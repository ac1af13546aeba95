//! Installed applications from the Uninstall registry keys
//!
//! Reads the machine-wide, 32-bit and per-user views. Entries without a
//! `DisplayName` and system components are skipped.

use crate::error::{AppScoutError, Result};
use tracing::warn;
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

const UNINSTALL_KEYS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// Display names of installed programs, deduplicated by the caller
///
/// Fails only when none of the Uninstall keys could be opened.
pub fn installed_app_names() -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut opened = 0;

    for hive in [HKEY_LOCAL_MACHINE, HKEY_CURRENT_USER] {
        let root = RegKey::predef(hive);
        for path in UNINSTALL_KEYS {
            let Ok(uninstall) = root.open_subkey(path) else {
                continue;
            };
            opened += 1;

            for subkey_name in uninstall.enum_keys().filter_map(std::result::Result::ok) {
                let Ok(subkey) = uninstall.open_subkey(&subkey_name) else {
                    continue;
                };
                let is_system: u32 = subkey.get_value("SystemComponent").unwrap_or(0);
                if is_system == 1 {
                    continue;
                }
                if let Ok(name) = subkey.get_value::<String, _>("DisplayName") {
                    names.push(name);
                }
            }
        }
    }

    if opened == 0 {
        warn!("No Uninstall registry key could be opened");
        return Err(AppScoutError::PlatformQuery(
            crate::error::StringError::new("no Uninstall registry key is readable"),
        ));
    }

    Ok(names)
}
