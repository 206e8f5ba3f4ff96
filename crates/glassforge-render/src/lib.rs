//! # GlassForge Render
//!
//! Software rendering for the GlassForge engine.
//!
//! ## Features
//! - RGB pixel surface with manual source-over alpha compositing
//! - Clipped, mirrorable sub-rectangle blits
//! - Horizontal sprite strips and frame stepping
//! - Flush to any [`FrameSink`] (normally the host display)

pub mod animation;
pub mod image;
pub mod sprite;
pub mod surface;

pub use animation::Animator;
pub use image::Image;
pub use sprite::Sprite;
pub use surface::{Blit, FrameSink, PixelSurface};

use thiserror::Error;

/// Render errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Image data has {actual} bytes, expected {expected} for {width}x{height}x{channels}")]
    DataSize {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid sprite layout: {0}")]
    InvalidSprite(String),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
