//! HTTP transport to the automation server.
//!
//! [`Transport`] is the seam between session logic and the network: the
//! default [`HttpTransport`] speaks JSON over `reqwest`, tests substitute
//! scripted implementations.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::trace;
use url::Url;
use wd_protocol::{Envelope, ErrorValue, error_codes};

use crate::error::{Error, Result};

/// HTTP verbs used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Delete,
}

/// Raw server reply.
#[derive(Debug, Clone)]
pub struct Reply {
	pub status: u16,
	pub envelope: Envelope,
}

impl Reply {
	pub fn ok(value: Value) -> Self {
		Self {
			status: 200,
			envelope: Envelope {
				value,
				session_id: None,
			},
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Splits the reply into its value or its error payload.
	///
	/// A failed reply without a readable payload is reported as `unknown error`
	/// carrying the HTTP status.
	pub fn into_result(self) -> std::result::Result<Envelope, ErrorValue> {
		if self.is_success() {
			return Ok(self.envelope);
		}
		Err(ErrorValue::from_envelope(&self.envelope).unwrap_or_else(|| {
			ErrorValue::new(
				error_codes::UNKNOWN_ERROR,
				format!("HTTP {} with body {}", self.status, self.envelope.value),
			)
		}))
	}
}

/// Sends protocol requests to the server.
pub trait Transport: Send + Sync {
	/// Base URL requests are resolved against.
	fn endpoint(&self) -> &str;

	/// Sends one request; `path` is relative to the endpoint.
	fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<Value>,
	) -> Pin<Box<dyn Future<Output = Result<Reply>> + Send + '_>>;
}

/// `reqwest`-backed transport.
///
/// No request timeout is configured; a hung server blocks the caller.
pub struct HttpTransport {
	client: reqwest::Client,
	base: Url,
	endpoint: String,
}

impl HttpTransport {
	/// Creates a transport for `endpoint` (e.g. `http://localhost:4723`).
	pub fn new(endpoint: &str) -> Result<Self> {
		let base = normalize_base(endpoint)?;
		let client = reqwest::Client::builder()
			.build()
			.map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;
		Ok(Self {
			client,
			base,
			endpoint: endpoint.to_string(),
		})
	}

	fn url(&self, path: &str) -> Result<Url> {
		self.base
			.join(path.trim_start_matches('/'))
			.map_err(|e| Error::Protocol(format!("Invalid request path '{}': {}", path, e)))
	}

	async fn send_inner(&self, method: Method, path: &str, body: Option<Value>) -> Result<Reply> {
		let url = self.url(path)?;
		trace!(target: "wd", ?method, %url, "request");

		let request = match method {
			Method::Get => self.client.get(url),
			Method::Post => self.client.post(url).json(&body.unwrap_or_else(|| Value::Object(Default::default()))),
			Method::Delete => self.client.delete(url),
		};

		let response = request.send().await.map_err(|e| self.classify(e))?;
		let status = response.status().as_u16();
		let text = response.text().await.map_err(|e| self.classify(e))?;
		trace!(target: "wd", status, body = %text, "response");

		let envelope = parse_envelope(status, &text)?;
		Ok(Reply { status, envelope })
	}

	fn classify(&self, err: reqwest::Error) -> Error {
		if err.is_connect() {
			Error::Connection {
				endpoint: self.endpoint.clone(),
				message: err.to_string(),
			}
		} else {
			Error::Transport(err.to_string())
		}
	}
}

impl Transport for HttpTransport {
	fn endpoint(&self) -> &str {
		&self.endpoint
	}

	fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<Value>,
	) -> Pin<Box<dyn Future<Output = Result<Reply>> + Send + '_>> {
		let path = path.to_string();
		Box::pin(async move { self.send_inner(method, &path, body).await })
	}
}

/// Parses an endpoint, forcing a trailing slash so relative joins append.
fn normalize_base(endpoint: &str) -> Result<Url> {
	let mut url = Url::parse(endpoint)
		.map_err(|e| Error::Configuration(format!("Invalid server endpoint '{}': {}", endpoint, e)))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(Error::Configuration(format!(
			"Unsupported endpoint scheme '{}' in '{}'",
			url.scheme(),
			endpoint
		)));
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	Ok(url)
}

/// Empty bodies are accepted on success (some servers reply to DELETE that way).
fn parse_envelope(status: u16, text: &str) -> Result<Envelope> {
	if text.trim().is_empty() {
		return Ok(Envelope::default());
	}
	match serde_json::from_str::<Envelope>(text) {
		Ok(envelope) => Ok(envelope),
		Err(_) if !(200..300).contains(&status) => Ok(Envelope {
			value: Value::String(text.to_string()),
			session_id: None,
		}),
		Err(e) => Err(Error::Protocol(format!("Malformed reply (HTTP {}): {}", status, e))),
	}
}
