//! Host seam
//!
//! What the engine needs from whoever runs it. Frames go out through
//! [`FrameSink`]; everything else through [`Host`].

use std::fmt;

use glassforge_core::Rgb;
use glassforge_render::FrameSink;

/// Independent image-load pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    /// Sprite images, requested once at startup
    Sprites,
    /// Level terrain rasters, requested on every level change
    Terrain,
}

/// Identifies one image-load request
///
/// Tickets increase monotonically, so the engine can tell a completion for
/// its newest request from a late one for an older request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

impl LoadTicket {
    /// The ticket following this one
    pub fn next(self) -> Self {
        LoadTicket(self.0 + 1)
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket {}", self.0)
    }
}

/// An asynchronous image load the host should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub pipeline: Pipeline,
    /// Sprite name or terrain image path
    pub name: String,
    /// Image path to load
    pub path: String,
    pub ticket: LoadTicket,
}

/// Debug overlay content of one host cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMark {
    /// Number of collision-grid occupants, shown as a glyph
    pub count: usize,
    /// Border and glyph color
    pub color: Rgb,
}

/// The environment driving the engine
pub trait Host: FrameSink {
    /// Size the host display grid
    fn set_grid_size(&mut self, width: u32, height: u32);

    /// Show a line of status text
    fn set_status_text(&mut self, text: &str);

    /// Mark or clear one cell of the debug overlay
    fn set_debug_cell(&mut self, x: u32, y: u32, mark: Option<DebugMark>);

    /// Start loading an image; the result is handed back to the engine
    /// together with the request's ticket
    fn request_image(&mut self, request: ImageRequest);
}
