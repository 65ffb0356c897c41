//! The app lifecycle smoke run.

use tracing::{debug, info};
use wd::{Remote, Session};

use crate::config::SmokeConfig;
use crate::error::Result;

/// Opens a session, cycles the test package through
/// remove → install → activate → terminate, and always closes the session.
///
/// The first failing step ends the run; no step is retried.
pub async fn run_smoke(config: &SmokeConfig) -> Result<()> {
	let remote = Remote::connect(&config.endpoint)?;
	let session = remote.new_session(&config.capabilities()).await?;
	info!(target: "smoke", session = session.id(), endpoint = %config.endpoint, "session opened");

	session
		.run(async |s: &Session| -> wd::Result<()> {
			let removed = s.remove_app(&config.app_id).await?;
			debug!(target: "smoke", app_id = %config.app_id, removed, "removed app");

			s.install_app(&config.secondary_app).await?;
			debug!(target: "smoke", path = %config.secondary_app.display(), "installed app");

			s.activate_app(&config.app_id).await?;
			debug!(target: "smoke", app_id = %config.app_id, "activated app");

			let stopped = s.terminate_app(&config.app_id).await?;
			debug!(target: "smoke", app_id = %config.app_id, stopped, "terminated app");
			Ok(())
		})
		.await?;

	info!(target: "smoke", "smoke run complete");
	Ok(())
}
