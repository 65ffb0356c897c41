//! Error types for the WebDriver client.

use std::path::PathBuf;

use thiserror::Error;
use wd_protocol::error_codes;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving an automation server.
#[derive(Debug, Error)]
pub enum Error {
	/// Server could not be reached.
	#[error("Failed to connect to automation server at {endpoint}: {message}")]
	Connection { endpoint: String, message: String },

	/// Server refused to create a session (bad capabilities, unknown app path, ...).
	#[error("Session not created: {0}")]
	Configuration(String),

	/// Local package file is missing or not a regular file.
	#[error("Package file not found: {}", path.display())]
	FileNotFound { path: PathBuf },

	/// Server rejected the package during install.
	#[error("Package rejected: {path}: {message}")]
	Package { path: String, message: String },

	/// An in-session command was rejected by the server.
	#[error("{command} failed ({error}): {message}")]
	AutomationCommand {
		/// Command name (e.g. `activate_app`).
		command: &'static str,
		/// W3C error code (e.g. `invalid session id`).
		error: String,
		/// Server-provided message.
		message: String,
	},

	/// Server reply did not match the protocol.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// Any other HTTP-level failure.
	#[error("Transport error: {0}")]
	Transport(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if the server was unreachable.
	pub fn is_connection(&self) -> bool {
		matches!(self, Error::Connection { .. })
	}

	/// Returns true if the server reported the session as gone.
	pub fn is_invalid_session(&self) -> bool {
		matches!(self, Error::AutomationCommand { error, .. } if error == error_codes::INVALID_SESSION_ID)
	}

	/// Returns true if the server does not implement the command.
	pub fn is_unknown_method(&self) -> bool {
		matches!(
			self,
			Error::AutomationCommand { error, .. }
				if error == error_codes::UNKNOWN_METHOD || error == error_codes::UNKNOWN_COMMAND
		)
	}

	/// Returns the W3C error code for server-side command failures.
	pub fn error_code(&self) -> Option<&str> {
		match self {
			Error::AutomationCommand { error, .. } => Some(error),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn command_error(code: &str) -> Error {
		Error::AutomationCommand {
			command: "activate_app",
			error: code.to_string(),
			message: "boom".to_string(),
		}
	}

	#[test]
	fn invalid_session_predicate() {
		assert!(command_error("invalid session id").is_invalid_session());
		assert!(!command_error("unknown error").is_invalid_session());
		assert!(!Error::Configuration("x".into()).is_invalid_session());
	}

	#[test]
	fn unknown_method_accepts_both_codes() {
		assert!(command_error("unknown method").is_unknown_method());
		assert!(command_error("unknown command").is_unknown_method());
		assert!(!command_error("invalid argument").is_unknown_method());
	}

	#[test]
	fn display_includes_command_and_code() {
		let msg = command_error("invalid session id").to_string();
		assert_eq!(msg, "activate_app failed (invalid session id): boom");
	}

	#[test]
	fn file_not_found_displays_path() {
		let err = Error::FileNotFound {
			path: PathBuf::from("/nowhere/ApiDemos.apk"),
		};
		assert_eq!(err.to_string(), "Package file not found: /nowhere/ApiDemos.apk");
	}
}
