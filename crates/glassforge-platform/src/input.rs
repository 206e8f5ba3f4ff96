//! Input Handling
//!
//! Host input events and the controls state objects read while ticking.

use bitflags::bitflags;
use glam::IVec2;

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Arrow keys
    Left,
    Right,
    Up,
    Down,

    // Letters used for movement
    W,
    A,
    S,
    D,

    // Special keys
    Space,
    Enter,
    Escape,

    // Debug keys
    F1,
    F2,
    F3,

    /// Any other key, by host key code
    Other(u32),
}

/// Input event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Keyboard key pressed
    KeyDown(KeyCode),
    /// Keyboard key released
    KeyUp(KeyCode),
    /// Pointer pressed, in screen coordinates
    Touch { x: i32, y: i32 },
    /// Pointer entered a screen cell
    Enter { x: i32, y: i32 },
    /// Host is shutting down
    Shutdown,
}

bitflags! {
    /// Logical buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const LEFT = 0b00001;
        const RIGHT = 0b00010;
        const UP = 0b00100;
        const DOWN = 0b01000;
        const ACTION = 0b10000;
    }
}

impl Buttons {
    /// Logical button bound to a key
    pub fn for_key(key: KeyCode) -> Option<Buttons> {
        match key {
            KeyCode::Left | KeyCode::A => Some(Buttons::LEFT),
            KeyCode::Right | KeyCode::D => Some(Buttons::RIGHT),
            KeyCode::Up | KeyCode::W => Some(Buttons::UP),
            KeyCode::Down | KeyCode::S => Some(Buttons::DOWN),
            KeyCode::Space => Some(Buttons::ACTION),
            _ => None,
        }
    }
}

/// Controls state shared with objects during a tick
#[derive(Debug, Clone, Default)]
pub struct Controls {
    held: Buttons,
    pressed: Buttons,
    mouse: IVec2,
    /// Gameplay suspended; rendering continues
    pub paused: bool,
}

impl Controls {
    /// Create an idle controls state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a button is held
    pub fn is_held(&self, button: Buttons) -> bool {
        self.held.contains(button)
    }

    /// Check if a button went down since the last tick
    pub fn is_just_pressed(&self, button: Buttons) -> bool {
        self.pressed.contains(button)
    }

    /// Held buttons
    pub fn held(&self) -> Buttons {
        self.held
    }

    /// Last pointer position in screen coordinates
    pub fn mouse(&self) -> IVec2 {
        self.mouse
    }

    /// Horizontal intent: -1, 0 or 1
    pub fn horizontal(&self) -> i32 {
        self.is_held(Buttons::RIGHT) as i32 - self.is_held(Buttons::LEFT) as i32
    }

    /// Handle an input event
    pub fn handle_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                if let Some(button) = Buttons::for_key(key) {
                    if !self.held.contains(button) {
                        self.pressed |= button;
                    }
                    self.held |= button;
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(button) = Buttons::for_key(key) {
                    self.held -= button;
                }
            }
            InputEvent::Enter { x, y } | InputEvent::Touch { x, y } => {
                self.mouse = IVec2::new(x, y);
            }
            InputEvent::Shutdown => {}
        }
    }

    /// Clear per-tick state (call at the end of each tick)
    pub fn end_tick(&mut self) {
        self.pressed = Buttons::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_and_wasd_share_buttons() {
        assert_eq!(Buttons::for_key(KeyCode::Left), Some(Buttons::LEFT));
        assert_eq!(Buttons::for_key(KeyCode::A), Some(Buttons::LEFT));
        assert_eq!(Buttons::for_key(KeyCode::W), Some(Buttons::UP));
        assert_eq!(Buttons::for_key(KeyCode::Space), Some(Buttons::ACTION));
        assert_eq!(Buttons::for_key(KeyCode::F1), None);
    }

    #[test]
    fn test_key_hold_and_release() {
        let mut controls = Controls::new();
        controls.handle_event(&InputEvent::KeyDown(KeyCode::Right));
        assert!(controls.is_held(Buttons::RIGHT));
        assert!(controls.is_just_pressed(Buttons::RIGHT));
        assert_eq!(controls.horizontal(), 1);

        controls.end_tick();
        assert!(controls.is_held(Buttons::RIGHT));
        assert!(!controls.is_just_pressed(Buttons::RIGHT));

        controls.handle_event(&InputEvent::KeyUp(KeyCode::Right));
        assert!(!controls.is_held(Buttons::RIGHT));
        assert_eq!(controls.horizontal(), 0);
    }

    #[test]
    fn test_repeat_key_down_is_not_a_new_press() {
        let mut controls = Controls::new();
        controls.handle_event(&InputEvent::KeyDown(KeyCode::Space));
        controls.end_tick();
        controls.handle_event(&InputEvent::KeyDown(KeyCode::Space));
        assert!(!controls.is_just_pressed(Buttons::ACTION));
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut controls = Controls::new();
        controls.handle_event(&InputEvent::KeyDown(KeyCode::A));
        controls.handle_event(&InputEvent::KeyDown(KeyCode::D));
        assert_eq!(controls.horizontal(), 0);
    }

    #[test]
    fn test_pointer_position() {
        let mut controls = Controls::new();
        controls.handle_event(&InputEvent::Enter { x: 4, y: 7 });
        assert_eq!(controls.mouse(), IVec2::new(4, 7));
    }
}
