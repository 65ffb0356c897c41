//! In-process fake Appium server for tests.
//!
//! Enabled by the `testing` feature. The server binds `127.0.0.1:0`, keeps a
//! set of installed packages, and records every request in arrival order so
//! tests can assert on call sequences.
//!
//! ```ignore
//! let server = FakeServer::start(FakeServerOptions::default()).await;
//! let remote = Remote::connect(&server.endpoint())?;
//! // ...
//! assert_eq!(server.calls(), ["new_session", "remove_app", "delete_session"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wd_protocol::{ErrorValue, MobileCommand, error_codes};

/// Behavior switches for [`FakeServer`].
#[derive(Debug, Clone)]
pub struct FakeServerOptions {
	/// Packages present on the fake device at start.
	pub installed: Vec<String>,
	/// Package id registered by any successful install.
	pub install_registers: String,
	/// Answer `mobile:` scripts with `unknown method` to force legacy routes.
	pub legacy_only: bool,
	/// Reject `POST /session` with this W3C error code.
	pub reject_sessions: Option<String>,
	/// Fail this command with `unknown error`.
	pub fail_on: Option<MobileCommand>,
}

impl Default for FakeServerOptions {
	fn default() -> Self {
		Self {
			installed: Vec::new(),
			install_registers: "io.appium.android.apis".to_string(),
			legacy_only: false,
			reject_sessions: None,
			fail_on: None,
		}
	}
}

/// One request observed by the fake server.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	/// `new_session`, `delete_session`, or a command name such as `install_app`.
	pub name: String,
	pub session: Option<String>,
	pub legacy: bool,
	pub body: Value,
}

#[derive(Default)]
struct Device {
	installed: HashSet<String>,
	running: HashSet<String>,
}

struct FakeState {
	options: FakeServerOptions,
	calls: Mutex<Vec<RecordedCall>>,
	sessions: Mutex<HashMap<String, bool>>,
	device: Mutex<Device>,
	next_session: Mutex<u64>,
}

impl FakeState {
	fn record(&self, name: &str, session: Option<&str>, legacy: bool, body: Value) {
		self.calls.lock().push(RecordedCall {
			name: name.to_string(),
			session: session.map(str::to_string),
			legacy,
			body,
		});
	}

	fn session_open(&self, id: &str) -> bool {
		self.sessions.lock().get(id).copied().unwrap_or(false)
	}
}

/// Running fake server; aborted on drop.
pub struct FakeServer {
	addr: SocketAddr,
	state: Arc<FakeState>,
	task: JoinHandle<()>,
}

impl FakeServer {
	/// Binds an ephemeral port and starts serving.
	///
	/// # Panics
	///
	/// Panics if the listener cannot be bound.
	pub async fn start(options: FakeServerOptions) -> Self {
		let device = Device {
			installed: options.installed.iter().cloned().collect(),
			running: HashSet::new(),
		};
		let state = Arc::new(FakeState {
			options,
			calls: Mutex::new(Vec::new()),
			sessions: Mutex::new(HashMap::new()),
			device: Mutex::new(device),
			next_session: Mutex::new(1),
		});

		let router = Router::new()
			.route("/session", post(new_session))
			.route("/session/{id}", delete(delete_session))
			.route("/session/{id}/execute/sync", post(execute_script))
			.route("/session/{id}/appium/device/{command}", post(legacy_command))
			.with_state(Arc::clone(&state));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
			.await
			.expect("bind fake server");
		let addr = listener.local_addr().expect("fake server address");
		let task = tokio::spawn(async move {
			let _ = axum::serve(listener, router).await;
		});

		Self { addr, state, task }
	}

	/// `http://127.0.0.1:<port>`.
	pub fn endpoint(&self) -> String {
		format!("http://{}", self.addr)
	}

	/// All requests in arrival order.
	pub fn recorded(&self) -> Vec<RecordedCall> {
		self.state.calls.lock().clone()
	}

	/// Names of all requests in arrival order.
	pub fn calls(&self) -> Vec<String> {
		self.recorded().into_iter().map(|call| call.name).collect()
	}

	/// Number of `DELETE /session/{id}` requests seen.
	pub fn close_count(&self) -> usize {
		self.recorded().iter().filter(|call| call.name == "delete_session").count()
	}

	/// Drops every session server-side, as an idle timeout would.
	pub fn expire_sessions(&self) {
		for open in self.state.sessions.lock().values_mut() {
			*open = false;
		}
	}

	pub fn is_installed(&self, app_id: &str) -> bool {
		self.state.device.lock().installed.contains(app_id)
	}

	pub fn is_running(&self, app_id: &str) -> bool {
		self.state.device.lock().running.contains(app_id)
	}
}

impl Drop for FakeServer {
	fn drop(&mut self) {
		self.task.abort();
	}
}

/// Returns an endpoint nothing listens on.
pub async fn unreachable_endpoint() -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
		.await
		.expect("bind probe listener");
	let addr = listener.local_addr().expect("probe address");
	drop(listener);
	format!("http://{}", addr)
}

fn w3c_error(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
	let value = ErrorValue::new(error, message);
	(status, Json(json!({ "value": value }))).into_response()
}

fn w3c_value(value: Value) -> Response {
	(StatusCode::OK, Json(json!({ "value": value }))).into_response()
}

async fn new_session(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
	state.record("new_session", None, false, body.clone());

	if let Some(code) = &state.options.reject_sessions {
		return w3c_error(StatusCode::BAD_REQUEST, code, "capabilities rejected");
	}

	let id = {
		let mut next = state.next_session.lock();
		let id = format!("fake-session-{}", *next);
		*next += 1;
		id
	};
	state.sessions.lock().insert(id.clone(), true);

	let granted = body["capabilities"]["alwaysMatch"].clone();
	w3c_value(json!({ "sessionId": id, "capabilities": granted }))
}

async fn delete_session(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
	state.record("delete_session", Some(&id), false, Value::Null);
	if !state.session_open(&id) {
		return w3c_error(StatusCode::NOT_FOUND, error_codes::INVALID_SESSION_ID, "no such session");
	}
	state.sessions.lock().insert(id, false);
	w3c_value(Value::Null)
}

async fn execute_script(
	State(state): State<Arc<FakeState>>,
	Path(id): Path<String>,
	Json(body): Json<Value>,
) -> Response {
	let script = body["script"].as_str().unwrap_or_default();
	let Some(command) = MobileCommand::from_script(script) else {
		state.record(script, Some(&id), false, body.clone());
		return w3c_error(StatusCode::NOT_FOUND, error_codes::UNKNOWN_METHOD, format!("unsupported script '{script}'"));
	};
	state.record(command.name(), Some(&id), false, body.clone());

	if state.options.legacy_only {
		return w3c_error(
			StatusCode::NOT_FOUND,
			error_codes::UNKNOWN_METHOD,
			format!("'{script}' is not supported by this driver"),
		);
	}

	let args = &body["args"][0];
	let target = match command {
		MobileCommand::InstallApp => args["appPath"].as_str(),
		_ => args["appId"].as_str(),
	};
	apply(&state, &id, command, target.unwrap_or_default())
}

async fn legacy_command(
	State(state): State<Arc<FakeState>>,
	Path((id, segment)): Path<(String, String)>,
	Json(body): Json<Value>,
) -> Response {
	let Some(command) = MobileCommand::from_legacy_segment(&segment) else {
		return w3c_error(StatusCode::NOT_FOUND, error_codes::UNKNOWN_COMMAND, format!("unknown route '{segment}'"));
	};
	state.record(command.name(), Some(&id), true, body.clone());

	let target = match command {
		MobileCommand::InstallApp => body["appPath"].as_str(),
		_ => body["appId"].as_str(),
	};
	apply(&state, &id, command, target.unwrap_or_default())
}

/// Applies `command` to the fake device.
fn apply(state: &FakeState, session: &str, command: MobileCommand, target: &str) -> Response {
	if !state.session_open(session) {
		return w3c_error(StatusCode::NOT_FOUND, error_codes::INVALID_SESSION_ID, "no such session");
	}
	if state.options.fail_on == Some(command) {
		return w3c_error(
			StatusCode::INTERNAL_SERVER_ERROR,
			error_codes::UNKNOWN_ERROR,
			format!("{} failed on the device", command.name()),
		);
	}

	let mut device = state.device.lock();
	match command {
		MobileCommand::RemoveApp => {
			device.running.remove(target);
			w3c_value(Value::Bool(device.installed.remove(target)))
		}
		MobileCommand::InstallApp => {
			if !FsPath::new(target).is_file() {
				return w3c_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					error_codes::UNKNOWN_ERROR,
					format!("'{target}' does not exist or is not accessible"),
				);
			}
			device.installed.insert(state.options.install_registers.clone());
			w3c_value(Value::Null)
		}
		MobileCommand::ActivateApp => {
			if !device.installed.contains(target) {
				return w3c_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					error_codes::UNKNOWN_ERROR,
					format!("'{target}' is not installed"),
				);
			}
			device.running.insert(target.to_string());
			w3c_value(Value::Null)
		}
		MobileCommand::TerminateApp => {
			if !device.installed.contains(target) {
				return w3c_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					error_codes::UNKNOWN_ERROR,
					format!("'{target}' is not installed"),
				);
			}
			w3c_value(Value::Bool(device.running.remove(target)))
		}
	}
}
