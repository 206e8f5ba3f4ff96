//! Raster images
//!
//! Interleaved 8-bit channels, row-major. Three channels is RGB, four is
//! RGBA. Images with fewer channels can be constructed but are refused by
//! the blitter.

use glassforge_core::{Rect, Rgba};

use crate::{RenderError, RenderResult};

/// Raster image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Image {
    /// Create an image from raw interleaved data
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(RenderError::DataSize {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Create an RGBA image from raw data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        Self::new(width, height, 4, data)
    }

    /// Create an RGBA image filled with one color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let data = color.to_array().repeat(width as usize * height as usize);
        Self { width, height, channels: 4, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Full image rectangle
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (x as usize + y as usize * self.width as usize) * self.channels as usize
    }

    /// Channels of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let offset = self.offset(x, y);
        &self.data[offset..offset + self.channels as usize]
    }

    /// Mutable channels of one pixel
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let offset = self.offset(x, y);
        let channels = self.channels as usize;
        &mut self.data[offset..offset + channels]
    }

    /// Iterate over pixels in raster order (`index = x + y * width`)
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.channels.max(1) as usize)
    }

    /// Iterate mutably over pixels in raster order
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(self.channels.max(1) as usize)
    }

    /// Convert to four channels
    ///
    /// RGB pixels become opaque. Images with fewer than 3 channels are
    /// returned unchanged.
    pub fn into_rgba(self) -> Image {
        if self.channels != 3 {
            return self;
        }
        let data = self
            .data
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect();
        Image {
            width: self.width,
            height: self.height,
            channels: 4,
            data,
        }
    }
}
