//! Wire types for the W3C WebDriver protocol with Appium extensions.
//!
//! These are plain serde types with no I/O. The client in `wd-rs` builds
//! request bodies from them and parses server replies into them.
//!
//! # Main Types
//!
//! - [`Capabilities`] - Session capability set with Appium vendor prefixing
//! - [`NewSessionRequest`] - `POST /session` body
//! - [`Envelope`] / [`NewSessionValue`] / [`ErrorValue`] - Reply shapes
//! - [`MobileCommand`] - `mobile:` extension scripts and their legacy endpoints

pub mod capabilities;
pub mod mobile;
pub mod wire;

pub use capabilities::{APPIUM_PREFIX, Capabilities, NewSessionRequest};
pub use mobile::{AppTarget, ExecuteScript, MobileCommand};
pub use wire::{Envelope, ErrorValue, NewSessionValue, error_codes};
