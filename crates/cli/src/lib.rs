//! App lifecycle smoke run against a local Appium server.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod smoke;
pub mod styles;

pub use config::SmokeConfig;
pub use error::{Result, SmokeError};
pub use smoke::run_smoke;
