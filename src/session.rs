//! Session context
//!
//! Loads the stored credential at mount, records when the app leaves the
//! foreground, and clears the credential on logout.

use crate::error::{AppScoutError, Result};
use crate::storage::{KeyValueStore, LAST_CLOSE_DATE_KEY, TOKEN_KEY, USER_ID_KEY};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

/// Credential and timestamps of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Bearer token presented to the remote service
    pub auth_token: String,
    /// Id of the logged-in user; older logins did not store one
    pub user_id: Option<String>,
    /// When the app last went to the background, if ever
    pub last_backgrounded_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Read the session from the store
    ///
    /// Returns [`AppScoutError::AuthMissing`] when no token is stored.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(auth_token) = store
            .get_item(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty())
        else {
            return Err(AppScoutError::AuthMissing);
        };

        let user_id = store.get_item(USER_ID_KEY)?;
        let last_backgrounded_at = store
            .get_item(LAST_CLOSE_DATE_KEY)?
            .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Ignoring unparsable last close date '{}': {}", raw, e);
                    None
                }
            });

        debug!(
            "Session loaded (user id present: {}, last close date present: {})",
            user_id.is_some(),
            last_backgrounded_at.is_some()
        );

        Ok(Self {
            auth_token,
            user_id,
            last_backgrounded_at,
        })
    }

    /// `last_backgrounded_at` in the wire format, or `None`
    pub fn last_backgrounded_at_string(&self) -> Option<String> {
        self.last_backgrounded_at.map(format_timestamp)
    }
}

/// Format a timestamp the way it is stored and reported (`2024-05-01T09:30:00.000Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persist `now` as the last time the app left the foreground
pub fn record_background(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<String> {
    let stamp = format_timestamp(now);
    store.set_item(LAST_CLOSE_DATE_KEY, &stamp)?;
    info!("Last close date saved: {}", stamp);
    Ok(stamp)
}

/// Persist the credential returned by a login
pub fn store_login(store: &dyn KeyValueStore, token: &str, user_id: Option<&str>) -> Result<()> {
    store.set_item(TOKEN_KEY, token)?;
    match user_id {
        Some(user_id) => store.set_item(USER_ID_KEY, user_id)?,
        None => store.remove_item(USER_ID_KEY)?,
    }
    info!("Login stored");
    Ok(())
}

/// Forget the stored token
pub fn logout(store: &dyn KeyValueStore) -> Result<()> {
    store.remove_item(TOKEN_KEY)?;
    info!("Logged out");
    Ok(())
}
