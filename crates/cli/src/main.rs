use clap::Parser;
use wd_cli::{SmokeConfig, SmokeError, cli::Cli, logging, run_smoke};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = run().await {
		handle_error(&err);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), SmokeError> {
	let config = SmokeConfig::from_current_exe()?;
	run_smoke(&config).await
}

fn handle_error(err: &SmokeError) {
	tracing::error!(target: "smoke", kind = err.kind(), "{err}");
	eprintln!("error[{}]: {}", err.kind(), err);
}
