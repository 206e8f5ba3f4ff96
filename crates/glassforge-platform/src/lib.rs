//! # GlassForge Platform
//!
//! Host abstraction layer for the GlassForge engine.
//!
//! The engine never talks to a display, keyboard or file loader directly.
//! It is driven by a host and calls back into it through the [`Host`]
//! trait:
//! - **Host**: Display, status line, debug overlay and image-load requests
//! - **Input**: Key codes, input events and the controls state
//! - **Timer**: Fixed-rate tick scheduling
//! - **Headless**: A recording host for tests and tooling

pub mod headless;
pub mod host;
pub mod input;
pub mod timer;

pub use headless::HeadlessHost;
pub use host::{DebugMark, Host, ImageRequest, LoadTicket, Pipeline};
pub use input::{Buttons, Controls, InputEvent, KeyCode};
pub use timer::FixedRateTimer;

use thiserror::Error;

/// Platform errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Invalid tick rate: {0}")]
    InvalidTickRate(u32),

    #[error("No pending request for {0}")]
    UnknownRequest(String),

    #[error("Image load failed for {name}: {reason}")]
    LoadFailed { name: String, reason: String },
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
