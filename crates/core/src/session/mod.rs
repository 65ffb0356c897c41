//! Active automation session and app-management commands.
//!
//! # Command dispatch
//!
//! 1. The command is sent as a `mobile:` script to `execute/sync`
//! 2. If the server answers `unknown method`/`unknown command`, it is resent
//!    once to the legacy `appium/device/*` route
//! 3. Failures are mapped onto [`Error`] variants per command
//!
//! # Release
//!
//! [`Session::close`] consumes the handle. [`Session::run`] wraps a body so
//! the close happens on every exit path.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wd_protocol::{AppTarget, ErrorValue, MobileCommand, error_codes};

use crate::error::{Error, Result};
use crate::transport::{Method, Transport};

/// Exclusive handle to one server-side session.
pub struct Session {
	id: String,
	capabilities: Map<String, Value>,
	transport: Arc<dyn Transport>,
}

impl Session {
	pub(crate) fn new(id: String, capabilities: Map<String, Value>, transport: Arc<dyn Transport>) -> Self {
		Self {
			id,
			capabilities,
			transport,
		}
	}

	/// Server-assigned session id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Capabilities the server actually granted.
	pub fn capabilities(&self) -> &Map<String, Value> {
		&self.capabilities
	}

	/// Uninstalls `app_id`.
	///
	/// Returns `true` if the server reports that something was removed. An
	/// absent package is not an error.
	pub async fn remove_app(&self, app_id: &str) -> Result<bool> {
		let value = self.app_command(MobileCommand::RemoveApp, AppTarget::Package(app_id)).await?;
		Ok(value.as_bool().unwrap_or(false))
	}

	/// Installs the package file at `path`.
	///
	/// The path is checked locally first; a missing file fails with
	/// [`Error::FileNotFound`] without contacting the server.
	pub async fn install_app(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let absolute = std::path::absolute(path).map_err(|_| Error::FileNotFound {
			path: path.to_path_buf(),
		})?;
		match tokio::fs::metadata(&absolute).await {
			Ok(meta) if meta.is_file() => {}
			_ => return Err(Error::FileNotFound { path: absolute }),
		}

		let path_str = absolute.to_string_lossy();
		self.app_command(MobileCommand::InstallApp, AppTarget::Path(&path_str)).await?;
		Ok(())
	}

	/// Brings `app_id` to the foreground.
	pub async fn activate_app(&self, app_id: &str) -> Result<()> {
		self.app_command(MobileCommand::ActivateApp, AppTarget::Package(app_id)).await?;
		Ok(())
	}

	/// Stops `app_id`. Returns `true` if a running process was stopped.
	pub async fn terminate_app(&self, app_id: &str) -> Result<bool> {
		let value = self.app_command(MobileCommand::TerminateApp, AppTarget::Package(app_id)).await?;
		Ok(value.as_bool().unwrap_or(false))
	}

	/// Deletes the server-side session.
	pub async fn close(self) -> Result<()> {
		debug!(target: "wd", session = %self.id, "closing session");
		let reply = self
			.transport
			.send(Method::Delete, &format!("session/{}", self.id), None)
			.await?;
		reply.into_result().map_err(|err| command_error("delete_session", err))?;
		info!(target: "wd", session = %self.id, "session closed");
		Ok(())
	}

	/// Runs `body` against this session, then closes it whatever the outcome.
	///
	/// The body's error wins over a close error; the latter is logged.
	pub async fn run<T, F>(self, body: F) -> Result<T>
	where
		F: AsyncFnOnce(&Session) -> Result<T>,
	{
		let outcome = body(&self).await;
		let session_id = self.id.clone();
		let closed = self.close().await;

		match (outcome, closed) {
			(Ok(value), Ok(())) => Ok(value),
			(Ok(_), Err(close_err)) => Err(close_err),
			(Err(err), Ok(())) => Err(err),
			(Err(err), Err(close_err)) => {
				warn!(target: "wd", session = %session_id, error = %close_err, "session close failed after command error");
				Err(err)
			}
		}
	}

	async fn app_command(&self, command: MobileCommand, target: AppTarget<'_>) -> Result<Value> {
		debug!(target: "wd", session = %self.id, command = command.name(), ?target, "app command");

		let body = serde_json::to_value(command.execute_body(target))?;
		let reply = self
			.transport
			.send(Method::Post, &format!("session/{}/execute/sync", self.id), Some(body))
			.await?;

		let err = match reply.into_result() {
			Ok(envelope) => return Ok(envelope.value),
			Err(err) if is_unknown_method(&err) => err,
			Err(err) => return Err(classify(command, target, err)),
		};

		debug!(
			target: "wd",
			command = command.name(),
			reason = %err.message,
			"mobile: script unsupported; using legacy route"
		);
		let reply = self
			.transport
			.send(
				Method::Post,
				&format!("session/{}/{}", self.id, command.legacy_path()),
				Some(command.legacy_body(target)),
			)
			.await?;
		reply
			.into_result()
			.map(|envelope| envelope.value)
			.map_err(|err| classify(command, target, err))
	}
}

fn is_unknown_method(err: &ErrorValue) -> bool {
	err.error == error_codes::UNKNOWN_METHOD || err.error == error_codes::UNKNOWN_COMMAND
}

fn command_error(command: &'static str, err: ErrorValue) -> Error {
	Error::AutomationCommand {
		command,
		error: err.error,
		message: err.message,
	}
}

/// Install failures are package problems unless the session itself is gone.
fn classify(command: MobileCommand, target: AppTarget<'_>, err: ErrorValue) -> Error {
	match (command, target) {
		(MobileCommand::InstallApp, AppTarget::Path(path)) if err.error != error_codes::INVALID_SESSION_ID => {
			Error::Package {
				path: path.to_string(),
				message: err.message,
			}
		}
		_ => command_error(command.name(), err),
	}
}

#[cfg(test)]
mod tests;
