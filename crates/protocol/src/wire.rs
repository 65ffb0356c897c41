//! Reply envelopes.
//!
//! Every W3C reply wraps its payload in `{"value": ...}`. Failures carry an
//! [`ErrorValue`] in the same slot together with a non-2xx status. Some older
//! servers also put `sessionId` at the top level of the new-session reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard W3C error codes the client branches on.
pub mod error_codes {
	pub const INVALID_SESSION_ID: &str = "invalid session id";
	pub const SESSION_NOT_CREATED: &str = "session not created";
	pub const INVALID_ARGUMENT: &str = "invalid argument";
	pub const UNKNOWN_METHOD: &str = "unknown method";
	pub const UNKNOWN_COMMAND: &str = "unknown command";
	pub const UNKNOWN_ERROR: &str = "unknown error";
}

/// Top-level reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
	#[serde(default)]
	pub value: Value,
	/// Legacy (JSONWP) servers report the session id here.
	#[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// `value` of a successful `POST /session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionValue {
	pub session_id: String,
	#[serde(default)]
	pub capabilities: Map<String, Value>,
}

/// `value` of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
	pub error: String,
	#[serde(default)]
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stacktrace: Option<String>,
}

impl ErrorValue {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
			stacktrace: None,
		}
	}

	/// Tries to read an error payload out of a reply body.
	pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
		serde_json::from_value(envelope.value.clone()).ok()
	}
}

impl Envelope {
	/// Extracts the new-session payload, accepting the legacy top-level id.
	pub fn into_new_session(self) -> Option<NewSessionValue> {
		if let Ok(value) = serde_json::from_value::<NewSessionValue>(self.value.clone()) {
			return Some(value);
		}
		let session_id = self.session_id?;
		let capabilities = match self.value {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		Some(NewSessionValue {
			session_id,
			capabilities,
		})
	}
}
