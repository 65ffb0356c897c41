//! Session creation.

use std::sync::Arc;

use tracing::{debug, info};
use wd_protocol::{Capabilities, NewSessionRequest};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::{HttpTransport, Method, Transport};

/// Handle to an automation server that can open sessions.
pub struct Remote {
	transport: Arc<dyn Transport>,
}

impl Remote {
	/// Targets the server at `endpoint` over HTTP.
	///
	/// Nothing is sent until [`Remote::new_session`].
	pub fn connect(endpoint: &str) -> Result<Self> {
		Ok(Self::with_transport(Arc::new(HttpTransport::new(endpoint)?)))
	}

	pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub fn endpoint(&self) -> &str {
		self.transport.endpoint()
	}

	/// Opens a session with `caps`.
	///
	/// # Errors
	///
	/// - [`Error::Connection`] if the server is unreachable
	/// - [`Error::Configuration`] if the server refuses the capability set
	/// - [`Error::Protocol`] if the reply carries no session id
	pub async fn new_session(&self, caps: &Capabilities) -> Result<Session> {
		let body = serde_json::to_value(NewSessionRequest::from(caps))?;
		debug!(target: "wd", endpoint = self.endpoint(), app = %caps.app, "opening session");

		let reply = self.transport.send(Method::Post, "session", Some(body)).await?;
		let envelope = reply
			.into_result()
			.map_err(|err| Error::Configuration(format!("{}: {}", err.error, err.message)))?;
		let created = envelope
			.into_new_session()
			.ok_or_else(|| Error::Protocol("new session reply has no sessionId".to_string()))?;

		info!(target: "wd", session = %created.session_id, "session opened");
		Ok(Session::new(created.session_id, created.capabilities, Arc::clone(&self.transport)))
	}
}
