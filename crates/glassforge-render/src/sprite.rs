//! Sprites
//!
//! A sprite is an image optionally split into a horizontal strip of
//! equally sized animation frames.

use glassforge_core::Rect;

use crate::image::Image;
use crate::{RenderError, RenderResult};

/// Loaded sprite image with frame layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    image: Image,
    frames: u32,
    frame_width: u32,
    frame_height: u32,
}

impl Sprite {
    /// Create a single-frame sprite covering the whole image
    pub fn single(image: Image) -> Self {
        let (frame_width, frame_height) = (image.width(), image.height());
        Self {
            image,
            frames: 1,
            frame_width,
            frame_height,
        }
    }

    /// Create a sprite from an image and an optional strip layout
    ///
    /// `width` defaults to the image width divided by the frame count, and
    /// the frame height is always the image height.
    pub fn new(image: Image, frames: Option<u32>, width: Option<u32>) -> RenderResult<Self> {
        let frames = frames.unwrap_or(1);
        if frames == 0 {
            return Err(RenderError::InvalidSprite("frame count must be positive".into()));
        }
        let frame_width = width.unwrap_or(image.width() / frames);
        let strip_width = frame_width.checked_mul(frames);
        if frame_width == 0 || strip_width.is_none_or(|strip| strip > image.width()) {
            return Err(RenderError::InvalidSprite(format!(
                "{} frames of width {} do not fit an image {} pixels wide",
                frames,
                frame_width,
                image.width()
            )));
        }
        let frame_height = image.height();
        Ok(Self {
            image,
            frames,
            frame_width,
            frame_height,
        })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Check if the sprite has more than one frame
    pub fn is_animated(&self) -> bool {
        self.frames > 1
    }

    /// Width of a single frame
    pub fn width(&self) -> u32 {
        self.frame_width
    }

    /// Height of a single frame
    pub fn height(&self) -> u32 {
        self.frame_height
    }

    /// Source rectangle of a frame; indices wrap around the strip
    pub fn frame_rect(&self, index: u32) -> Rect {
        let index = index % self.frames;
        Rect::from_xywh(
            (index * self.frame_width) as i32,
            0,
            self.frame_width as i32,
            self.frame_height as i32,
        )
    }
}
