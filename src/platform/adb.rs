//! Android package enumeration over adb
//!
//! Runs `adb [-s <serial>] shell pm list packages` and reports the package
//! names, e.g. `org.telegram.messenger`.

use crate::error::{AppScoutError, Result, StringError};
use crate::platform::{AppEnumerator, dedup_names};
use std::process::Command;
use tracing::debug;

/// Installed packages of an Android device reachable through `adb`
#[derive(Debug, Clone, Default)]
pub struct AdbAppEnumerator {
    serial: Option<String>,
}

impl AdbAppEnumerator {
    /// Target the device with `serial`, or the only attached device when `None`
    pub fn new(serial: Option<String>) -> Self {
        Self { serial }
    }

    fn command(&self) -> Command {
        let mut command = Command::new("adb");
        if let Some(serial) = &self.serial {
            command.args(["-s", serial]);
        }
        command.args(["shell", "pm", "list", "packages"]);
        command
    }
}

impl AppEnumerator for AdbAppEnumerator {
    fn installed_apps(&self) -> Result<Vec<String>> {
        let output = self
            .command()
            .output()
            .map_err(|e| AppScoutError::PlatformQuery(Box::new(e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppScoutError::PlatformQuery(StringError::new(format!(
                "adb exited with {}: {}",
                output.status,
                stderr.trim()
            ))));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let packages = parse_package_list(&stdout);
        debug!("adb reported {} package(s)", packages.len());
        Ok(packages)
    }
}

/// Parse `pm list packages` output (`package:<name>` per line)
pub fn parse_package_list(output: &str) -> Vec<String> {
    dedup_names(
        output
            .lines()
            .filter_map(|line| line.trim().strip_prefix("package:"))
            .map(str::to_string),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_list() {
        let output = "package:com.whatsapp\r\npackage:org.telegram.messenger\n\nWARNING: linker\npackage:com.whatsapp\n";
        assert_eq!(
            parse_package_list(output),
            vec!["com.whatsapp", "org.telegram.messenger"]
        );
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_package_list("").is_empty());
    }

    #[test]
    fn test_command_includes_serial() {
        let enumerator = AdbAppEnumerator::new(Some("emulator-5554".to_string()));
        let command = enumerator.command();
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-s", "emulator-5554", "shell", "pm", "list", "packages"]);
    }
}
