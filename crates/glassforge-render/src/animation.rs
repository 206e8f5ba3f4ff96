//! Frame Animation
//!
//! Steps through a sprite strip once per draw call. `frame_speed` is the
//! number of extra draws each frame is held for, so higher is slower.

/// Per-object animation cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Animator {
    /// Current frame in the strip
    pub frame_index: u32,
    /// Draws since the frame last changed
    pub frame_step: u32,
    /// Draws each frame is held for beyond the first
    pub frame_speed: u32,
}

impl Animator {
    pub fn new(frame_speed: u32) -> Self {
        Self {
            frame_speed,
            ..Self::default()
        }
    }

    /// Frame to draw for a strip of `frames` frames
    pub fn current(&self, frames: u32) -> u32 {
        if frames == 0 { 0 } else { self.frame_index % frames }
    }

    /// Count one draw and move to the next frame when the hold expires
    pub fn advance(&mut self, frames: u32) {
        if frames <= 1 {
            return;
        }
        self.frame_step += 1;
        if self.frame_step > self.frame_speed {
            self.frame_step = 0;
            self.frame_index = (self.frame_index + 1) % frames;
        }
    }

    /// Return to the first frame
    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.frame_step = 0;
    }
}
