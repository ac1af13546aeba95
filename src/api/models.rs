//! Wire formats of the remote service
//!
//! Every JSON response shares one envelope:
//! `{"success": bool, "message": "...", "data": ...}`.

use crate::device::DeviceIdentity;
use crate::session::SessionContext;
use serde::{Deserialize, Deserializer, Serialize};

/// Common response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the service considers the call successful
    #[serde(default)]
    pub success: bool,
    /// Human-readable outcome
    #[serde(default)]
    pub message: Option<String>,
    /// Payload, absent on most failures
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// One entry of the watched app-name list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppNameEntry {
    /// Display name of the watched app
    pub app_name: String,
}

/// Body of a detection report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    /// Opaque per-install identifier
    #[serde(rename = "deviceId")]
    pub device_id: String,
    /// Hardware model
    #[serde(rename = "deviceModel")]
    pub device_model: String,
    /// Human-readable device name
    #[serde(rename = "deviceName")]
    pub device_name: String,
    /// Operating system family
    #[serde(rename = "deviceOs")]
    pub device_os: String,
    /// Id of the logged-in user, `null` when unknown
    pub user_id: Option<String>,
    /// When the app last went to the background, `null` when never
    pub app_closedate: Option<String>,
}

impl DetectionReport {
    /// Assemble the report body from the identity and session
    pub fn new(identity: &DeviceIdentity, session: &SessionContext) -> Self {
        Self {
            device_id: identity.device_id.clone(),
            device_model: identity.device_model.clone(),
            device_name: identity.device_name.clone(),
            device_os: identity.device_os.clone(),
            user_id: session.user_id.clone(),
            app_closedate: session.last_backgrounded_at_string(),
        }
    }
}

/// Body of a login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account phone number
    pub phone_number: String,
    /// Account password
    pub password: String,
}

/// Payload of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    /// Bearer token for later requests
    pub token: String,
    /// Id of the account, when the service returns it
    #[serde(default, alias = "id", deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
}

/// Body of an account-creation request
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Full name of the account holder
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Account phone number
    pub phone_number: String,
    /// Account password
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Bearer token for later requests
    pub token: String,
    /// Id of the account, when known
    pub user_id: Option<String>,
    /// Message to show the user
    pub message: Option<String>,
}

/// Acknowledgement of an accepted detection report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Message from the service, if any
    pub message: Option<String>,
}

/// Accept ids sent either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}
