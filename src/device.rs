//! Device identity
//!
//! The detection report identifies the device by an opaque id, a human name,
//! a model and an OS family. On a desktop host the id is a UUID generated on
//! first use and kept in the key-value store, so it stays stable per install.

use crate::error::Result;
use crate::storage::{DEVICE_ID_KEY, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Identity fields sent with a detection report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Opaque per-install identifier
    pub device_id: String,
    /// Human-readable device name
    pub device_name: String,
    /// Hardware model
    pub device_model: String,
    /// Operating system family
    pub device_os: String,
}

/// Source of the device identity
pub trait DeviceInfoProvider: Send + Sync {
    /// Read the identity of this device
    fn identity(&self) -> Result<DeviceIdentity>;
}

/// Identity of the machine this process runs on
pub struct HostDeviceInfo {
    store: Arc<dyn KeyValueStore>,
}

impl HostDeviceInfo {
    /// Create a provider that keeps the generated device id in `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn device_id(&self) -> Result<String> {
        if let Some(id) = self.store.get_item(DEVICE_ID_KEY)? {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.store.set_item(DEVICE_ID_KEY, &id)?;
        info!("Generated new device id {}", id);
        Ok(id)
    }
}

impl DeviceInfoProvider for HostDeviceInfo {
    fn identity(&self) -> Result<DeviceIdentity> {
        let identity = DeviceIdentity {
            device_id: self.device_id()?,
            device_name: host_name(),
            device_model: std::env::consts::ARCH.to_string(),
            device_os: std::env::consts::OS.to_string(),
        };
        debug!("Device identity: {:?}", identity);
        Ok(identity)
    }
}

/// Best-effort host name
fn host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
