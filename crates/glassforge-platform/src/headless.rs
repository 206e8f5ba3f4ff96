//! Headless host
//!
//! A [`Host`] without a display. It keeps the last complete frame, every
//! status line, the debug overlay and the outstanding image requests so
//! tests and tools can inspect what the engine did.

use glassforge_core::Rgb;
use glassforge_render::FrameSink;

use crate::host::{DebugMark, Host, ImageRequest, Pipeline};

/// Recording host
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    width: u32,
    height: u32,
    back: Vec<Rgb>,
    frame: Vec<Rgb>,
    frames: u64,
    status: Vec<String>,
    debug: Vec<Option<DebugMark>>,
    requests: Vec<ImageRequest>,
}

impl HeadlessHost {
    /// Create a host with a `width x height` grid
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            back: vec![Rgb::BLACK; cells],
            frame: vec![Rgb::BLACK; cells],
            frames: 0,
            status: Vec::new(),
            debug: vec![None; cells],
            requests: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x as usize + y as usize * self.width as usize)
    }

    /// Pixel of the last complete frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.index(x, y).map(|index| self.frame[index])
    }

    /// Last complete frame, row-major
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }

    /// Number of complete frames presented
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Every status line shown, oldest first
    pub fn status_lines(&self) -> &[String] {
        &self.status
    }

    /// Most recent status line
    pub fn last_status(&self) -> Option<&str> {
        self.status.last().map(String::as_str)
    }

    /// Debug overlay content of a cell
    pub fn debug_cell(&self, x: u32, y: u32) -> Option<DebugMark> {
        self.index(x, y).and_then(|index| self.debug[index])
    }

    /// Number of marked overlay cells
    pub fn marked_cells(&self) -> usize {
        self.debug.iter().filter(|mark| mark.is_some()).count()
    }

    /// Outstanding image requests
    pub fn pending_requests(&self) -> &[ImageRequest] {
        &self.requests
    }

    /// Remove and return the outstanding requests of one pipeline
    pub fn take_requests(&mut self, pipeline: Pipeline) -> Vec<ImageRequest> {
        let (taken, kept) = std::mem::take(&mut self.requests)
            .into_iter()
            .partition(|request| request.pipeline == pipeline);
        self.requests = kept;
        taken
    }

    /// Remove and return every outstanding request
    pub fn take_all_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl FrameSink for HeadlessHost {
    fn present(&mut self, x: u32, y: u32, color: Rgb) {
        if let Some(index) = self.index(x, y) {
            self.back[index] = color;
        }
    }

    fn end_frame(&mut self) {
        self.frame.copy_from_slice(&self.back);
        self.frames += 1;
    }
}

impl Host for HeadlessHost {
    fn set_grid_size(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Headless grid resized to {}x{}", width, height);
        *self = Self {
            status: std::mem::take(&mut self.status),
            requests: std::mem::take(&mut self.requests),
            frames: self.frames,
            ..Self::new(width, height)
        };
    }

    fn set_status_text(&mut self, text: &str) {
        log::info!("Status: {}", text);
        self.status.push(text.to_string());
    }

    fn set_debug_cell(&mut self, x: u32, y: u32, mark: Option<DebugMark>) {
        if let Some(index) = self.index(x, y) {
            self.debug[index] = mark;
        }
    }

    fn request_image(&mut self, request: ImageRequest) {
        log::debug!("Image requested: {:?} {} ({})", request.pipeline, request.name, request.ticket);
        self.requests.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LoadTicket;

    fn request(pipeline: Pipeline, name: &str, ticket: u64) -> ImageRequest {
        ImageRequest {
            pipeline,
            name: name.into(),
            path: format!("{}.png", name),
            ticket: LoadTicket(ticket),
        }
    }

    #[test]
    fn test_frame_visible_after_end_frame() {
        let mut host = HeadlessHost::new(2, 2);
        host.present(1, 1, Rgb::WHITE);
        assert_eq!(host.pixel(1, 1), Some(Rgb::BLACK));
        host.end_frame();
        assert_eq!(host.pixel(1, 1), Some(Rgb::WHITE));
        assert_eq!(host.frames_presented(), 1);
        assert_eq!(host.pixel(2, 0), None);
    }

    #[test]
    fn test_status_lines_recorded() {
        let mut host = HeadlessHost::new(1, 1);
        host.set_status_text("one");
        host.set_status_text("two");
        assert_eq!(host.status_lines().len(), 2);
        assert_eq!(host.last_status(), Some("two"));
    }

    #[test]
    fn test_debug_cells() {
        let mut host = HeadlessHost::new(3, 3);
        let mark = DebugMark { count: 2, color: Rgb::WHITE };
        host.set_debug_cell(1, 2, Some(mark));
        assert_eq!(host.debug_cell(1, 2), Some(mark));
        assert_eq!(host.marked_cells(), 1);
        host.set_debug_cell(1, 2, None);
        assert_eq!(host.marked_cells(), 0);
    }

    #[test]
    fn test_take_requests_by_pipeline() {
        let mut host = HeadlessHost::new(1, 1);
        host.request_image(request(Pipeline::Sprites, "a", 0));
        host.request_image(request(Pipeline::Terrain, "level", 1));
        host.request_image(request(Pipeline::Sprites, "b", 2));

        let sprites = host.take_requests(Pipeline::Sprites);
        assert_eq!(sprites.len(), 2);
        assert_eq!(host.pending_requests().len(), 1);
        assert_eq!(host.take_all_requests()[0].name, "level");
        assert!(host.pending_requests().is_empty());
    }

    #[test]
    fn test_resize_keeps_history() {
        let mut host = HeadlessHost::new(1, 1);
        host.set_status_text("kept");
        host.set_grid_size(4, 3);
        assert_eq!((host.width(), host.height()), (4, 3));
        assert_eq!(host.frame().len(), 12);
        assert_eq!(host.last_status(), Some("kept"));
    }
}
