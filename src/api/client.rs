//! Remote service client
//!
//! [`RemoteService`] is the seam between the dashboard and the backend; the
//! production implementation is [`HttpRemoteService`], a blocking `reqwest`
//! client. Transport failures become [`AppScoutError::Network`], answers the
//! service marks as failed become [`AppScoutError::Api`].

use super::models::{
    Ack, ApiEnvelope, AppNameEntry, DetectionReport, LoginData, LoginOutcome, LoginRequest,
    RegisterRequest,
};
use crate::config::ApiSettings;
use crate::device::DeviceIdentity;
use crate::error::{AppScoutError, Result};
use crate::session::SessionContext;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Operations of the backend used by this application
pub trait RemoteService: Send + Sync {
    /// Fetch the watched app names, lower-cased
    fn fetch_reference_names(&self, token: &str) -> Result<Vec<String>>;

    /// Report that `matched` apps were found on this device
    fn report(
        &self,
        identity: &DeviceIdentity,
        session: &SessionContext,
        matched: &BTreeSet<String>,
    ) -> Result<Ack>;

    /// Exchange credentials for a session token
    fn login(&self, phone_number: &str, password: &str) -> Result<LoginOutcome>;

    /// Create an account, returning the service's message
    fn register(&self, request: &RegisterRequest) -> Result<String>;
}

/// [`RemoteService`] over HTTP
pub struct HttpRemoteService {
    client: Client,
    settings: ApiSettings,
}

impl HttpRemoteService {
    /// Build the HTTP client from the API settings
    ///
    /// A `timeout_secs` of 0 disables the request timeout.
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("AppScout/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                warn!("Failed to create HTTP client: {}", e);
                AppScoutError::Config(Box::new(e))
            })?;

        Ok(Self { client, settings })
    }

    /// The settings this client was built from
    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Send a request and read the whole body
    fn send(&self, request: RequestBuilder, what: &str) -> Result<(u16, String)> {
        let response = request.send().map_err(|e| {
            warn!("{} request failed: {}", what, e);
            AppScoutError::Network(Box::new(e))
        })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            warn!("Failed to read {} response: {}", what, e);
            AppScoutError::Network(Box::new(e))
        })?;

        debug!("{} answered with status {}", what, status);
        Ok((status, body))
    }
}

impl RemoteService for HttpRemoteService {
    fn fetch_reference_names(&self, token: &str) -> Result<Vec<String>> {
        let url = self.settings.url(&self.settings.endpoints.app_names);
        debug!("Fetching reference app names from: {}", url);

        let request = self.client.get(&url).bearer_auth(token);
        let (status, body) = self.send(request, "App-name list")?;
        let envelope = interpret::<Vec<AppNameEntry>>(status, &body)?;

        let names: Vec<String> = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.app_name.to_lowercase())
            .collect();
        info!("Fetched {} reference app name(s)", names.len());
        Ok(names)
    }

    fn report(
        &self,
        identity: &DeviceIdentity,
        session: &SessionContext,
        matched: &BTreeSet<String>,
    ) -> Result<Ack> {
        let url = self.settings.url(&self.settings.endpoints.app_detect);
        info!("Reporting {} similar app(s) to: {}", matched.len(), url);

        let payload = DetectionReport::new(identity, session);
        let request = self
            .client
            .post(&url)
            .bearer_auth(&session.auth_token)
            .json(&payload);
        let (status, body) = self.send(request, "Detection report")?;

        // The report endpoint only counts as accepted on exactly 200
        if status != 200 {
            warn!("Detection report rejected with status {}", status);
            return Err(api_error(status, body_message(&body)));
        }
        Ok(Ack {
            message: body_message(&body),
        })
    }

    fn login(&self, phone_number: &str, password: &str) -> Result<LoginOutcome> {
        let url = self.settings.url(&self.settings.endpoints.login);
        debug!("Logging in at: {}", url);

        let payload = LoginRequest {
            phone_number: phone_number.to_string(),
            password: password.to_string(),
        };
        let (status, body) = self.send(self.client.post(&url).json(&payload), "Login")?;
        let envelope = interpret::<LoginData>(status, &body)?;

        let Some(data) = envelope.data else {
            warn!("Login response carried no token");
            return Err(api_error(status, Some("Invalid credentials".to_string())));
        };
        info!("Logged in");
        Ok(LoginOutcome {
            token: data.token,
            user_id: data.user_id,
            message: envelope.message,
        })
    }

    fn register(&self, request: &RegisterRequest) -> Result<String> {
        let url = self.settings.url(&self.settings.endpoints.register);
        debug!("Registering account at: {}", url);

        let (status, body) = self.send(self.client.post(&url).json(request), "Registration")?;
        let envelope = interpret::<serde_json::Value>(status, &body)?;

        info!("Account registered");
        Ok(envelope
            .message
            .unwrap_or_else(|| "Account created".to_string()))
    }
}

/// Check the status and `success` flag of a JSON envelope response
pub(crate) fn interpret<T: DeserializeOwned>(status: u16, body: &str) -> Result<ApiEnvelope<T>> {
    let is_success_status = (200..300).contains(&status);

    let envelope: ApiEnvelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if is_success_status => {
            warn!("Failed to parse response body: {}", e);
            return Err(AppScoutError::Json(e));
        }
        Err(_) => return Err(api_error(status, None)),
    };

    if !is_success_status || !envelope.success {
        warn!(
            "Service reported failure (status {}): {}",
            status,
            envelope.message.as_deref().unwrap_or("no message")
        );
        return Err(api_error(status, envelope.message));
    }
    Ok(envelope)
}

/// `message` of a JSON envelope body, ignoring bodies of any other shape
fn body_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
}

fn api_error(status: u16, message: Option<String>) -> AppScoutError {
    let message = message.unwrap_or_else(|| {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected response")
            .to_string()
    });
    AppScoutError::Api { status, message }
}
