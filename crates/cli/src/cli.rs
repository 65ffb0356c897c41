use clap::Parser;

use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "wd-smoke")]
#[command(about = "Remove, install, launch and stop an Android app through a local Appium server")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v progress, -vv debug, -vvv wire traffic)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}
