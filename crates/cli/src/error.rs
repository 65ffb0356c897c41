use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmokeError>;

#[derive(Debug, Error)]
pub enum SmokeError {
	#[error("configuration failed: {0}")]
	Config(String),

	#[error(transparent)]
	Client(#[from] wd::Error),
}

impl SmokeError {
	/// Short category label for the failure line on stderr.
	pub fn kind(&self) -> &'static str {
		match self {
			SmokeError::Config(_) => "config",
			SmokeError::Client(err) => match err {
				wd::Error::Connection { .. } => "connection",
				wd::Error::Configuration(_) => "configuration",
				wd::Error::FileNotFound { .. } => "file-not-found",
				wd::Error::Package { .. } => "package",
				wd::Error::AutomationCommand { .. } => "command",
				wd::Error::Protocol(_) | wd::Error::Transport(_) | wd::Error::Json(_) => "internal",
			},
		}
	}
}
