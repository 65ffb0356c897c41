//! wd - Rust client for Appium-compatible WebDriver servers
//!
//! Opens sessions against an automation server and drives app lifecycle
//! commands on the device behind it.
//!
//! - **Remote**: session creation from a [`Capabilities`] set
//! - **Session**: remove/install/activate/terminate app, close, scoped run
//! - **Transport**: JSON over HTTP, swappable for tests
//!
//! # Example
//!
//! ```ignore
//! use wd::{Capabilities, Remote};
//!
//! let remote = Remote::connect("http://localhost:4723")?;
//! let session = remote.new_session(&caps).await?;
//! session
//!     .run(async |s| {
//!         s.activate_app("io.appium.android.apis").await?;
//!         s.terminate_app("io.appium.android.apis").await?;
//!         Ok(())
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod remote;
pub mod session;
#[cfg(feature = "testing")]
pub mod testing;
pub mod transport;

pub use error::{Error, Result};
pub use remote::Remote;
pub use session::Session;
pub use transport::{HttpTransport, Method, Reply, Transport};
pub use wd_protocol::{Capabilities, MobileCommand};
