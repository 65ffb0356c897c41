//! App-management commands.
//!
//! Current Appium drivers expose app management as `mobile:` extension
//! scripts run through the W3C execute endpoint. Older servers only know the
//! dedicated `/appium/device/*` routes, so each command also knows its legacy
//! path and body.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Body of `POST /session/{id}/execute/sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteScript {
	pub script: String,
	pub args: Vec<Value>,
}

/// What an app command acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTarget<'a> {
	/// Installed package identifier.
	Package(&'a str),
	/// Local package file path.
	Path(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobileCommand {
	RemoveApp,
	InstallApp,
	ActivateApp,
	TerminateApp,
}

impl MobileCommand {
	pub const ALL: [MobileCommand; 4] = [
		Self::RemoveApp,
		Self::InstallApp,
		Self::ActivateApp,
		Self::TerminateApp,
	];

	/// Looks up a command by its `mobile:` script name.
	pub fn from_script(script: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|cmd| cmd.script() == script)
	}

	/// Looks up a command by the last segment of its legacy route.
	pub fn from_legacy_segment(segment: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|cmd| cmd.name() == segment)
	}

	/// Snake-case name used in logs and errors.
	pub fn name(self) -> &'static str {
		match self {
			Self::RemoveApp => "remove_app",
			Self::InstallApp => "install_app",
			Self::ActivateApp => "activate_app",
			Self::TerminateApp => "terminate_app",
		}
	}

	pub fn script(self) -> &'static str {
		match self {
			Self::RemoveApp => "mobile: removeApp",
			Self::InstallApp => "mobile: installApp",
			Self::ActivateApp => "mobile: activateApp",
			Self::TerminateApp => "mobile: terminateApp",
		}
	}

	/// Session-relative legacy route.
	pub fn legacy_path(self) -> &'static str {
		match self {
			Self::RemoveApp => "appium/device/remove_app",
			Self::InstallApp => "appium/device/install_app",
			Self::ActivateApp => "appium/device/activate_app",
			Self::TerminateApp => "appium/device/terminate_app",
		}
	}

	/// Builds the execute-script body.
	///
	/// Package ids are sent as both `appId` (Android) and `bundleId` (iOS);
	/// drivers ignore the one they do not use.
	pub fn execute_body(self, target: AppTarget<'_>) -> ExecuteScript {
		let arg = match target {
			AppTarget::Package(id) => json!({ "appId": id, "bundleId": id }),
			AppTarget::Path(path) => json!({ "app": path, "appPath": path }),
		};
		ExecuteScript {
			script: self.script().to_string(),
			args: vec![arg],
		}
	}

	/// Builds the legacy route body.
	pub fn legacy_body(self, target: AppTarget<'_>) -> Value {
		match target {
			AppTarget::Package(id) => json!({ "appId": id }),
			AppTarget::Path(path) => json!({ "appPath": path }),
		}
	}
}
