use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Maps `-v` count to a default filter; `RUST_LOG` overrides it.
pub fn filter_for(verbosity: u8) -> &'static str {
	// 0 = errors only
	// 1 (-v) = run progress, client warnings
	// 2 (-vv) = debug for everything; 3+ adds request/response bodies
	match verbosity {
		0 => "error",
		1 => "warn,smoke=info",
		2 => "debug",
		_ => "trace",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
