//! Session capability set.
//!
//! W3C only standardizes a handful of capability names; everything Appium
//! adds must travel with the `appium:` vendor prefix or strict servers reject
//! the whole request with `invalid argument`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Vendor prefix for non-standard capabilities.
pub const APPIUM_PREFIX: &str = "appium:";

/// Capabilities describing the target platform, device and app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
	/// Target mobile OS (e.g. `Android`).
	pub platform_name: String,
	/// OS version on the device (e.g. `13.0`).
	pub platform_version: String,
	/// Device or emulator identifier.
	pub device_name: String,
	/// Server-side driver backend (e.g. `UiAutomator2`).
	pub automation_name: String,
	/// Local path to the package launched at session start.
	pub app: String,
}

impl Capabilities {
	/// Renders the capability map as sent on the wire.
	///
	/// `platformName` is a W3C standard key and stays bare; the rest are
	/// vendor-prefixed.
	pub fn to_w3c(&self) -> Map<String, Value> {
		let mut map = Map::new();
		map.insert("platformName".into(), Value::String(self.platform_name.clone()));
		let prefixed = [
			("platformVersion", &self.platform_version),
			("deviceName", &self.device_name),
			("automationName", &self.automation_name),
			("app", &self.app),
		];
		for (key, value) in prefixed {
			map.insert(format!("{APPIUM_PREFIX}{key}"), Value::String(value.clone()));
		}
		map
	}
}

/// Body of `POST /session`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSessionRequest {
	pub capabilities: CapabilitiesRequest,
}

/// W3C capability matching block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesRequest {
	pub always_match: Map<String, Value>,
	pub first_match: Vec<Map<String, Value>>,
}

impl From<&Capabilities> for NewSessionRequest {
	fn from(caps: &Capabilities) -> Self {
		Self {
			capabilities: CapabilitiesRequest {
				always_match: caps.to_w3c(),
				first_match: vec![Map::new()],
			},
		}
	}
}
