//! Configuration data models
//!
//! This module defines the data structures used for application configuration.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote service settings
    pub api: ApiSettings,
    /// Similar-app detection settings
    pub detection: DetectionSettings,
    /// Which installed-app source to query
    pub enumerator: EnumeratorKind,
    /// Android debug bridge settings, used by [`EnumeratorKind::Adb`]
    pub adb: AdbSettings,
}

/// Remote service location and request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is joined onto
    pub base_url: String,
    /// Endpoint paths relative to `base_url`
    pub endpoints: Endpoints,
    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
}

/// Endpoint paths of the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Credential exchange
    pub login: String,
    /// Account creation
    pub register: String,
    /// Watched app-name list
    pub app_names: String,
    /// Detection report
    pub app_detect: String,
}

/// Fuzzy matching and reporting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Maximum score (0.0 exact, 1.0 anything) for a name to count as similar
    pub threshold: f64,
    /// Characters of offset from `location` that cost a full score point
    pub distance: usize,
    /// Expected position of the match inside a reference name
    pub location: usize,
    /// Delay between the "similar apps" notice and the report, in milliseconds
    pub report_delay_ms: u64,
}

/// Installed-app source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumeratorKind {
    /// Applications installed on this machine
    #[default]
    Host,
    /// Packages installed on an Android device reachable over adb
    Adb,
}

/// Android debug bridge settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbSettings {
    /// Device serial passed as `adb -s`; the only attached device when absent
    pub serial: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            endpoints: Endpoints::default(),
            timeout_secs: 10,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "login".to_string(),
            register: "register".to_string(),
            app_names: "appnames".to_string(),
            app_detect: "appdetect".to_string(),
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            distance: 100,
            location: 0,
            report_delay_ms: 2000,
        }
    }
}

impl ApiSettings {
    /// Join an endpoint path onto the base URL with exactly one slash between them
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl AppConfig {
    /// Bring out-of-range values back into range
    pub fn sanitize(&mut self) {
        let threshold = self.detection.threshold;
        self.detection.threshold = if threshold.is_nan() {
            DetectionSettings::default().threshold
        } else {
            threshold.clamp(0.0, 1.0)
        };
    }
}
