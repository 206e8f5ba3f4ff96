//! Pixel Surface
//!
//! Fixed-size RGB back buffer. Everything the engine shows goes through
//! here: terrain and sprites are composited with [`PixelSurface::image_blit`],
//! overlays with [`PixelSurface::draw_pixel`], and the finished frame is
//! pushed to the host once per tick with [`PixelSurface::flush`].

use glassforge_core::math::IVec2;
use glassforge_core::{Rect, Rgb};

use crate::image::Image;

/// Destination of a flushed frame
pub trait FrameSink {
    /// Show one pixel of the finished frame
    fn present(&mut self, x: u32, y: u32, color: Rgb);

    /// Called once after every pixel of a frame was presented
    fn end_frame(&mut self) {}
}

/// Parameters of a single blit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    /// Screen position of the source rectangle's top-left corner
    pub screen: IVec2,
    /// Source sub-rectangle, the whole image when `None`
    pub source: Option<Rect>,
    /// Mirror horizontally within the copied span
    pub invert_x: bool,
    /// Mirror vertically within the copied span
    pub invert_y: bool,
    /// Opacity multiplier in `[0, 1]`
    pub opacity: f32,
}

impl Blit {
    /// Blit the whole image at a screen position
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            screen: IVec2::new(x, y),
            source: None,
            invert_x: false,
            invert_y: false,
            opacity: 1.0,
        }
    }

    /// Restrict the blit to a source sub-rectangle
    pub fn source(mut self, rect: Rect) -> Self {
        self.source = Some(rect);
        self
    }

    /// Set mirroring
    pub fn mirrored(mut self, invert_x: bool, invert_y: bool) -> Self {
        self.invert_x = invert_x;
        self.invert_y = invert_y;
        self
    }

    /// Set the opacity multiplier
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// RGB back buffer with software alpha compositing
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    background: Rgb,
    pixels: Vec<Rgb>,
}

impl PixelSurface {
    /// Create a surface cleared to the background color
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    /// Write a pixel directly. The caller guarantees `x < width` and `y < height`.
    pub fn set_pixel(&mut self, color: Rgb, x: u32, y: u32) {
        let index = x as usize + y as usize * self.width as usize;
        self.pixels[index] = color;
    }

    /// Read a pixel directly. The caller guarantees `x < width` and `y < height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[x as usize + y as usize * self.width as usize]
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Composite a color over the pixel at `(x, y)`
    ///
    /// `color` holds 3 (opaque) or 4 (straight alpha) channels. Positions
    /// outside the surface and colors with fewer than 3 channels are
    /// logged and ignored.
    pub fn draw_pixel(&mut self, color: &[u8], x: i32, y: i32, opacity: f32) {
        if !self.in_bounds(x, y) {
            log::warn!("draw_pixel: pixel out of range: ({}, {})", x, y);
            return;
        }
        if color.len() < 3 {
            log::error!("draw_pixel: color needs at least 3 channels, got {}", color.len());
            return;
        }

        let alpha = match color.get(3) {
            Some(&a) => (a as f32 * opacity.clamp(0.0, 1.0)) / 255.0,
            None => 1.0,
        };
        let inverse = 1.0 - alpha;
        let dst = self.get_pixel(x as u32, y as u32);
        let blend = |src: u8, dst: u8| -> u8 {
            (src as f32 * alpha + dst as f32 * inverse).round().clamp(0.0, 255.0) as u8
        };

        let blended = Rgb::new(blend(color[0], dst.r), blend(color[1], dst.g), blend(color[2], dst.b));
        self.set_pixel(blended, x as u32, y as u32);
    }

    /// Copy a source sub-rectangle of `image` to the screen
    ///
    /// The source rectangle is clipped to the image, the destination to the
    /// surface. Mirroring reverses pixel order within the copied span, so a
    /// mirrored blit covers the same screen rectangle as an unmirrored one.
    pub fn image_blit(&mut self, image: &Image, blit: &Blit) {
        if image.channels() < 3 {
            log::error!(
                "image_blit: image needs at least 3 channels, got {}",
                image.channels()
            );
            return;
        }

        let source = blit.source.unwrap_or_else(|| image.bounds());
        let span = source.intersection(&image.bounds());
        if span.is_empty() {
            return;
        }

        // Screen placement is anchored on the requested source corner, so
        // clipping the source at its far edges never shifts the picture.
        let anchor = blit.screen + (span.origin() - source.origin());
        let (span_width, span_height) = (span.width(), span.height());

        for v in 0..span_height {
            let dest_y = anchor.y + if blit.invert_y { span_height - 1 - v } else { v };
            if dest_y < 0 || dest_y >= self.height as i32 {
                continue;
            }
            for u in 0..span_width {
                let dest_x = anchor.x + if blit.invert_x { span_width - 1 - u } else { u };
                if dest_x < 0 || dest_x >= self.width as i32 {
                    continue;
                }
                let pixel = image.pixel((span.left + u) as u32, (span.top + v) as u32);
                self.draw_pixel(pixel, dest_x, dest_y, blit.opacity);
            }
        }
    }

    /// Reset every pixel to the background color
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    /// Push the whole buffer to `sink`, then clear it
    pub fn flush(&mut self, sink: &mut dyn FrameSink) {
        for y in 0..self.height {
            for x in 0..self.width {
                sink.present(x, y, self.get_pixel(x, y));
            }
        }
        sink.end_frame();
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassforge_core::Rgba;

    struct Recorder(Vec<(u32, u32, Rgb)>);

    impl FrameSink for Recorder {
        fn present(&mut self, x: u32, y: u32, color: Rgb) {
            self.0.push((x, y, color));
        }
    }

    fn striped_sprite() -> Image {
        // 4x4 opaque image, column c has red = 10 * (c + 1)
        let mut data = Vec::new();
        for _y in 0..4 {
            for x in 0..4u8 {
                data.extend_from_slice(&[10 * (x + 1), 0, 0, 255]);
            }
        }
        Image::from_rgba(4, 4, data).unwrap()
    }

    #[test]
    fn test_set_get_pixel() {
        let mut surface = PixelSurface::new(4, 4, Rgb::BLACK);
        surface.set_pixel(Rgb::new(1, 2, 3), 3, 2);
        assert_eq!(surface.get_pixel(3, 2), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_draw_pixel_opaque_without_alpha_channel() {
        let mut surface = PixelSurface::new(2, 2, Rgb::new(100, 100, 100));
        surface.draw_pixel(&[200, 0, 50], 0, 0, 0.25);
        assert_eq!(surface.get_pixel(0, 0), Rgb::new(200, 0, 50));
    }

    #[test]
    fn test_draw_pixel_blends_alpha() {
        let mut surface = PixelSurface::new(2, 2, Rgb::new(0, 0, 200));
        surface.draw_pixel(&[255, 255, 0, 51], 1, 1, 1.0);
        // alpha = 0.2
        assert_eq!(surface.get_pixel(1, 1), Rgb::new(51, 51, 160));
    }

    #[test]
    fn test_draw_pixel_applies_opacity() {
        let mut surface = PixelSurface::new(1, 1, Rgb::BLACK);
        surface.draw_pixel(&[200, 200, 200, 255], 0, 0, 0.5);
        assert_eq!(surface.get_pixel(0, 0), Rgb::new(100, 100, 100));
    }

    #[test]
    fn test_draw_pixel_out_of_range_is_noop() {
        let mut surface = PixelSurface::new(2, 2, Rgb::BLACK);
        surface.draw_pixel(&[255, 255, 255], -1, 0, 1.0);
        surface.draw_pixel(&[255, 255, 255], 0, 2, 1.0);
        assert!((0..2).all(|y| (0..2).all(|x| surface.get_pixel(x, y) == Rgb::BLACK)));
    }

    #[test]
    fn test_draw_pixel_rejects_short_colors() {
        let mut surface = PixelSurface::new(1, 1, Rgb::BLACK);
        surface.draw_pixel(&[255, 255], 0, 0, 1.0);
        assert_eq!(surface.get_pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_blit_clips_left_edge() {
        let mut surface = PixelSurface::new(8, 8, Rgb::BLACK);
        surface.image_blit(&striped_sprite(), &Blit::at(-2, 0));

        // Only the two rightmost columns land on screen, at x = 0 and 1
        assert_eq!(surface.get_pixel(0, 0), Rgb::new(30, 0, 0));
        assert_eq!(surface.get_pixel(1, 3), Rgb::new(40, 0, 0));
        for y in 0..8 {
            for x in 2..8 {
                assert_eq!(surface.get_pixel(x, y), Rgb::BLACK);
            }
        }
    }

    #[test]
    fn test_blit_mirrors_within_span() {
        let mut surface = PixelSurface::new(4, 4, Rgb::BLACK);
        surface.image_blit(&striped_sprite(), &Blit::at(0, 0).mirrored(true, false));
        assert_eq!(surface.get_pixel(0, 0), Rgb::new(40, 0, 0));
        assert_eq!(surface.get_pixel(3, 0), Rgb::new(10, 0, 0));
    }

    #[test]
    fn test_blit_sub_rectangle_for_frame_strip() {
        // Two 2x1 frames side by side: frame 0 red, frame 1 green
        let data = vec![
            255, 0, 0, 255, 255, 0, 0, 255, //
            0, 255, 0, 255, 0, 255, 0, 255,
        ];
        let strip = Image::from_rgba(4, 1, data).unwrap();
        let mut surface = PixelSurface::new(4, 1, Rgb::BLACK);
        surface.image_blit(&strip, &Blit::at(1, 0).source(Rect::from_xywh(2, 0, 2, 1)));
        assert_eq!(surface.get_pixel(0, 0), Rgb::BLACK);
        assert_eq!(surface.get_pixel(1, 0), Rgb::new(0, 255, 0));
        assert_eq!(surface.get_pixel(2, 0), Rgb::new(0, 255, 0));
        assert_eq!(surface.get_pixel(3, 0), Rgb::BLACK);
    }

    #[test]
    fn test_blit_transparent_pixels_keep_background() {
        let image = Image::filled(2, 2, Rgba::new(255, 255, 255, 0));
        let mut surface = PixelSurface::new(2, 2, Rgb::new(5, 5, 5));
        surface.image_blit(&image, &Blit::at(0, 0));
        assert_eq!(surface.get_pixel(1, 1), Rgb::new(5, 5, 5));
    }

    #[test]
    fn test_blit_rejects_two_channel_images() {
        let image = Image::new(1, 1, 2, vec![255, 255]).unwrap();
        let mut surface = PixelSurface::new(1, 1, Rgb::BLACK);
        surface.image_blit(&image, &Blit::at(0, 0));
        assert_eq!(surface.get_pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_flush_presents_then_clears() {
        let mut surface = PixelSurface::new(2, 1, Rgb::new(9, 9, 9));
        surface.set_pixel(Rgb::WHITE, 1, 0);
        let mut recorder = Recorder(Vec::new());
        surface.flush(&mut recorder);

        assert_eq!(recorder.0, vec![(0, 0, Rgb::new(9, 9, 9)), (1, 0, Rgb::WHITE)]);
        assert_eq!(surface.get_pixel(1, 0), Rgb::new(9, 9, 9));
    }
}
