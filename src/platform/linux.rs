//! Installed applications from XDG desktop entries
//!
//! Reads the `Name=` key of the `[Desktop Entry]` group of every `.desktop`
//! file in the system, user and flatpak application directories.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directories searched for `.desktop` files
fn application_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".local/share")));
    if let Some(data_home) = data_home {
        dirs.push(data_home.join("applications"));
    }

    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .unwrap_or_else(|_| "/usr/local/share:/usr/share".to_string());
    dirs.extend(
        data_dirs
            .split(':')
            .filter(|d| !d.is_empty())
            .map(|d| PathBuf::from(d).join("applications")),
    );

    dirs.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    dirs
}

/// Names of all visible desktop applications
pub fn installed_app_names() -> Result<Vec<String>> {
    let mut names = Vec::new();
    for dir in application_dirs() {
        names.extend(names_in_dir(&dir));
    }
    Ok(names)
}

fn names_in_dir(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };
    let names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "desktop"))
        .filter_map(|p| fs::read_to_string(p).ok())
        .filter_map(|contents| parse_desktop_entry(&contents))
        .collect();
    debug!("{} application(s) in {}", names.len(), dir.display());
    names
}

/// `Name=` of a desktop entry, or `None` for hidden entries
pub fn parse_desktop_entry(contents: &str) -> Option<String> {
    let mut in_entry = false;
    let mut name = None;

    for line in contents.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry {
            continue;
        }
        if let Some(value) = line.strip_prefix("Name=") {
            name.get_or_insert_with(|| value.trim().to_string());
        } else if line == "NoDisplay=true" || line == "Hidden=true" {
            return None;
        }
    }

    name.filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_desktop_entry() {
        let entry = "[Desktop Entry]\nType=Application\nName=Telegram Desktop\nName[de]=Telegram\nExec=telegram-desktop\n";
        assert_eq!(parse_desktop_entry(entry).as_deref(), Some("Telegram Desktop"));
    }

    #[test]
    fn test_hidden_entry_is_skipped() {
        let entry = "[Desktop Entry]\nName=Helper\nNoDisplay=true\n";
        assert_eq!(parse_desktop_entry(entry), None);
    }

    #[test]
    fn test_name_outside_desktop_entry_group_is_ignored() {
        let entry = "[Desktop Action new-window]\nName=New Window\n[Desktop Entry]\nName=Firefox\n";
        assert_eq!(parse_desktop_entry(entry).as_deref(), Some("Firefox"));
    }

    #[test]
    fn test_names_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.desktop"), "[Desktop Entry]\nName=Signal\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "[Desktop Entry]\nName=Nope\n").unwrap();

        assert_eq!(names_in_dir(dir.path()), vec!["Signal".to_string()]);
    }
}
