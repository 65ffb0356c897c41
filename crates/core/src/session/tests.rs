use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::json;
use wd_protocol::Envelope;

use super::*;
use crate::transport::Reply;

type Sent = (Method, String, Option<Value>);

/// Replays canned replies and records every request.
struct ScriptedTransport {
	replies: Mutex<VecDeque<Reply>>,
	sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
	fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
		Arc::new(Self {
			replies: Mutex::new(replies.into_iter().collect()),
			sent: Mutex::new(Vec::new()),
		})
	}

	fn sent(&self) -> Vec<Sent> {
		self.sent.lock().unwrap().clone()
	}

	fn paths(&self) -> Vec<String> {
		self.sent().into_iter().map(|(_, path, _)| path).collect()
	}
}

impl Transport for ScriptedTransport {
	fn endpoint(&self) -> &str {
		"http://scripted"
	}

	fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<Value>,
	) -> Pin<Box<dyn Future<Output = Result<Reply>> + Send + '_>> {
		self.sent.lock().unwrap().push((method, path.to_string(), body));
		let reply = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| Reply::ok(Value::Null));
		Box::pin(async move { Ok(reply) })
	}
}

fn failure(status: u16, error: &str, message: &str) -> Reply {
	Reply {
		status,
		envelope: Envelope {
			value: json!({ "error": error, "message": message }),
			session_id: None,
		},
	}
}

fn session(transport: Arc<ScriptedTransport>) -> Session {
	Session::new("s-1".to_string(), Map::new(), transport)
}

#[tokio::test]
async fn remove_app_sends_mobile_script() {
	let transport = ScriptedTransport::with_replies([Reply::ok(json!(true))]);
	let removed = session(transport.clone()).remove_app("io.appium.android.apis").await.unwrap();

	assert!(removed);
	let sent = transport.sent();
	assert_eq!(sent.len(), 1);
	let (method, path, body) = &sent[0];
	assert_eq!(*method, Method::Post);
	assert_eq!(path, "session/s-1/execute/sync");
	let body = body.as_ref().unwrap();
	assert_eq!(body["script"], "mobile: removeApp");
	assert_eq!(body["args"][0]["appId"], "io.appium.android.apis");
}

#[tokio::test]
async fn remove_absent_app_is_not_an_error() {
	let transport = ScriptedTransport::with_replies([Reply::ok(json!(false))]);
	let removed = session(transport).remove_app("io.appium.android.apis").await.unwrap();
	assert!(!removed);
}

#[tokio::test]
async fn unknown_method_falls_back_to_legacy_route() {
	let transport = ScriptedTransport::with_replies([
		failure(404, "unknown method", "mobile: activateApp is not supported"),
		Reply::ok(Value::Null),
	]);
	session(transport.clone()).activate_app("pkg").await.unwrap();

	let sent = transport.sent();
	assert_eq!(transport.paths(), ["session/s-1/execute/sync", "session/s-1/appium/device/activate_app"]);
	assert_eq!(sent[1].2, Some(json!({ "appId": "pkg" })));
}

#[tokio::test]
async fn legacy_route_failure_is_reported() {
	let transport = ScriptedTransport::with_replies([
		failure(404, "unknown command", "no such script"),
		failure(500, "unknown error", "app not installed"),
	]);
	let err = session(transport).terminate_app("pkg").await.unwrap_err();
	match err {
		Error::AutomationCommand { command, error, message } => {
			assert_eq!(command, "terminate_app");
			assert_eq!(error, "unknown error");
			assert_eq!(message, "app not installed");
		}
		other => panic!("Expected AutomationCommand, got {other:?}"),
	}
}

#[tokio::test]
async fn invalid_session_fails_every_package_command() {
	for command in ["remove", "activate", "terminate"] {
		let transport = ScriptedTransport::with_replies([failure(404, "invalid session id", "gone")]);
		let session = session(transport);
		let result = match command {
			"remove" => session.remove_app("pkg").await.map(|_| ()),
			"activate" => session.activate_app("pkg").await,
			_ => session.terminate_app("pkg").await.map(|_| ()),
		};
		let err = result.unwrap_err();
		assert!(err.is_invalid_session(), "{command}: {err:?}");
	}
}

#[tokio::test]
async fn install_on_invalid_session_is_command_error() {
	let package = tempfile::NamedTempFile::new().unwrap();
	let transport = ScriptedTransport::with_replies([failure(404, "invalid session id", "gone")]);
	let err = session(transport).install_app(package.path()).await.unwrap_err();
	assert!(err.is_invalid_session(), "{err:?}");
}

#[tokio::test]
async fn install_missing_file_sends_nothing() {
	let transport = ScriptedTransport::with_replies([]);
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("ApiDemos.apk");

	let err = session(transport.clone()).install_app(&missing).await.unwrap_err();
	assert!(matches!(err, Error::FileNotFound { ref path } if path == &missing), "{err:?}");
	assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn install_directory_is_file_not_found() {
	let transport = ScriptedTransport::with_replies([]);
	let dir = tempfile::tempdir().unwrap();
	let err = session(transport).install_app(dir.path()).await.unwrap_err();
	assert!(matches!(err, Error::FileNotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn install_sends_absolute_path() {
	let package = tempfile::NamedTempFile::new().unwrap();
	let transport = ScriptedTransport::with_replies([Reply::ok(Value::Null)]);
	session(transport.clone()).install_app(package.path()).await.unwrap();

	let (_, _, body) = &transport.sent()[0];
	let body = body.as_ref().unwrap();
	assert_eq!(body["script"], "mobile: installApp");
	let sent_path = body["args"][0]["appPath"].as_str().unwrap();
	assert!(Path::new(sent_path).is_absolute());
}

#[tokio::test]
async fn rejected_install_is_package_error() {
	let package = tempfile::NamedTempFile::new().unwrap();
	let transport = ScriptedTransport::with_replies([failure(500, "unknown error", "INSTALL_PARSE_FAILED_NOT_APK")]);
	let err = session(transport).install_app(package.path()).await.unwrap_err();
	match err {
		Error::Package { message, .. } => assert_eq!(message, "INSTALL_PARSE_FAILED_NOT_APK"),
		other => panic!("Expected Package, got {other:?}"),
	}
}

#[tokio::test]
async fn close_deletes_session() {
	let transport = ScriptedTransport::with_replies([]);
	session(transport.clone()).close().await.unwrap();
	let sent = transport.sent();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].0, Method::Delete);
	assert_eq!(sent[0].1, "session/s-1");
}

#[tokio::test]
async fn run_closes_after_success() {
	let transport = ScriptedTransport::with_replies([]);
	let value = session(transport.clone())
		.run(async |s: &Session| -> Result<i32> {
			s.activate_app("pkg").await?;
			Ok(7)
		})
		.await
		.unwrap();

	assert_eq!(value, 7);
	assert_eq!(transport.paths(), ["session/s-1/execute/sync", "session/s-1"]);
}

#[tokio::test]
async fn run_closes_after_first_call_fails() {
	let transport = ScriptedTransport::with_replies([failure(500, "unknown error", "boom")]);
	let err = session(transport.clone())
		.run(async |s: &Session| -> Result<()> {
			s.remove_app("pkg").await?;
			s.activate_app("pkg").await?;
			Ok(())
		})
		.await
		.unwrap_err();

	assert_eq!(err.error_code(), Some("unknown error"));
	assert_eq!(transport.paths(), ["session/s-1/execute/sync", "session/s-1"]);
	let deletes = transport.sent().iter().filter(|(m, _, _)| *m == Method::Delete).count();
	assert_eq!(deletes, 1);
}

#[tokio::test]
async fn body_error_wins_over_close_error() {
	let transport = ScriptedTransport::with_replies([
		failure(500, "unknown error", "activate failed"),
		failure(404, "invalid session id", "already gone"),
	]);
	let err = session(transport)
		.run(async |s: &Session| s.activate_app("pkg").await)
		.await
		.unwrap_err();

	match err {
		Error::AutomationCommand { command, message, .. } => {
			assert_eq!(command, "activate_app");
			assert_eq!(message, "activate failed");
		}
		other => panic!("Expected AutomationCommand, got {other:?}"),
	}
}

#[tokio::test]
async fn close_error_surfaces_when_body_succeeds() {
	let transport = ScriptedTransport::with_replies([
		Reply::ok(Value::Null),
		failure(404, "invalid session id", "already gone"),
	]);
	let err = session(transport)
		.run(async |s: &Session| s.activate_app("pkg").await)
		.await
		.unwrap_err();

	match err {
		Error::AutomationCommand { command, .. } => assert_eq!(command, "delete_session"),
		other => panic!("Expected AutomationCommand, got {other:?}"),
	}
}
