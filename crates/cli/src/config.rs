//! Fixed run configuration.
//!
//! Every value is a constant except the base directory, which is the
//! directory holding the running executable. Both packages are expected to
//! sit next to it.

use std::path::{Path, PathBuf};

use wd::Capabilities;

use crate::error::{Result, SmokeError};

pub const ENDPOINT: &str = "http://localhost:4723";
pub const PRIMARY_APP: &str = "TheApp-v1.10.0.apk";
pub const SECONDARY_APP: &str = "ApiDemos.apk";
pub const APP_ID: &str = "io.appium.android.apis";

pub const PLATFORM_NAME: &str = "Android";
pub const PLATFORM_VERSION: &str = "13.0";
pub const DEVICE_NAME: &str = "Android Emulator";
pub const AUTOMATION_NAME: &str = "UiAutomator2";

/// Resolved settings for one smoke run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeConfig {
	pub endpoint: String,
	/// App launched at session start.
	pub primary_app: PathBuf,
	/// Package installed during the run.
	pub secondary_app: PathBuf,
	pub app_id: String,
}

impl SmokeConfig {
	/// Builds the configuration for packages located in `base_dir`.
	pub fn for_base_dir(base_dir: &Path) -> Self {
		Self {
			endpoint: ENDPOINT.to_string(),
			primary_app: base_dir.join(PRIMARY_APP),
			secondary_app: base_dir.join(SECONDARY_APP),
			app_id: APP_ID.to_string(),
		}
	}

	/// Builds the configuration relative to the running executable.
	pub fn from_current_exe() -> Result<Self> {
		Ok(Self::for_base_dir(&base_dir()?))
	}

	/// Points the run at another server, keeping everything else.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	pub fn capabilities(&self) -> Capabilities {
		Capabilities {
			platform_name: PLATFORM_NAME.to_string(),
			platform_version: PLATFORM_VERSION.to_string(),
			device_name: DEVICE_NAME.to_string(),
			automation_name: AUTOMATION_NAME.to_string(),
			app: self.primary_app.to_string_lossy().into_owned(),
		}
	}
}

/// Absolute directory of the running executable.
fn base_dir() -> Result<PathBuf> {
	let exe = std::env::current_exe()
		.map_err(|e| SmokeError::Config(format!("cannot locate executable: {e}")))?;
	let exe = exe.canonicalize().unwrap_or(exe);
	exe.parent()
		.map(Path::to_path_buf)
		.ok_or_else(|| SmokeError::Config(format!("executable has no parent directory: {}", exe.display())))
}
