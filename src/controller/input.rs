/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec2;

use super::joystick::TouchControls;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer-locked mouse movement in pixels
    MouseMove { dx: f32, dy: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    PointerLockChanged { locked: bool },
}

/// Snapshot of the visitor's intent for one frame.
///
/// Joystick components are clamped to [-1, 1] on write; drag gestures can
/// overshoot before normalization and are never trusted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    move_stick: Vec2,
    look_stick: Vec2,
}

fn clamp_stick(v: Vec2) -> Vec2 {
    if !v.is_finite() {
        return Vec2::ZERO;
    }
    v.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key flags only; both sticks centred.
    pub fn from_keys(forward: bool, backward: bool, left: bool, right: bool, sprint: bool) -> Self {
        Self { forward, backward, left, right, sprint, ..Self::default() }
    }

    pub fn with_move_stick(mut self, v: Vec2) -> Self {
        self.set_move_stick(v);
        self
    }

    pub fn with_look_stick(mut self, v: Vec2) -> Self {
        self.set_look_stick(v);
        self
    }

    pub fn set_move_stick(&mut self, v: Vec2) {
        self.move_stick = clamp_stick(v);
    }

    pub fn set_look_stick(&mut self, v: Vec2) {
        self.look_stick = clamp_stick(v);
    }

    /// Move joystick; +x is screen right, +y is screen down (backward).
    pub fn move_stick(&self) -> Vec2 {
        self.move_stick
    }

    /// Look joystick; +x turns right, +y looks down.
    pub fn look_stick(&self) -> Vec2 {
        self.look_stick
    }

    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
            && self.move_stick == Vec2::ZERO
            && self.look_stick == Vec2::ZERO
    }
}

/// Canonical form of a `KeyboardEvent.key` name. Single characters are
/// lowercased so Shift or Caps Lock never make the release miss the press.
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Raw capture state written by event listeners; last value wins.
pub struct InputCapture {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    pub touch: TouchControls,
}

impl InputCapture {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            look_delta: (0.0, 0.0),
            pointer_locked: false,
            touch: TouchControls::default(),
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(normalize_key(key));
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&normalize_key(key));
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&normalize_key(key))
    }

    /// Drop held keys and re-centre both joysticks.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.touch.release_all();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    /// Combine keys and joysticks into this frame's `InputState`.
    pub fn sample(&self, processor: &InputProcessor) -> InputState {
        let mut state = InputState::from_keys(
            processor.is_moving_forward(self),
            processor.is_moving_backward(self),
            processor.is_moving_left(self),
            processor.is_moving_right(self),
            processor.is_sprinting(self),
        );
        state.set_move_stick(self.touch.move_stick.vector());
        state.set_look_stick(self.touch.look_stick.vector());
        state
    }
}

impl Default for InputCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration; any key in a list triggers the action.
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub sprint: Vec<String>,
    pub escape: String,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: keys(&["ArrowUp", "w"]),
            backward: keys(&["ArrowDown", "s"]),
            left: keys(&["ArrowLeft", "a"]),
            right: keys(&["ArrowRight", "d"]),
            sprint: keys(&["Shift"]),
            escape: "Escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    fn any_pressed(input: &InputCapture, keys: &[String]) -> bool {
        keys.iter().any(|k| input.is_key_pressed(k))
    }

    pub fn is_moving_forward(&self, input: &InputCapture) -> bool {
        Self::any_pressed(input, &self.bindings.forward)
    }

    pub fn is_moving_backward(&self, input: &InputCapture) -> bool {
        Self::any_pressed(input, &self.bindings.backward)
    }

    pub fn is_moving_left(&self, input: &InputCapture) -> bool {
        Self::any_pressed(input, &self.bindings.left)
    }

    pub fn is_moving_right(&self, input: &InputCapture) -> bool {
        Self::any_pressed(input, &self.bindings.right)
    }

    pub fn is_sprinting(&self, input: &InputCapture) -> bool {
        Self::any_pressed(input, &self.bindings.sprint)
    }

    /// Keys whose browser default (scrolling) should be suppressed.
    pub fn is_navigation_key(&self, key: &str) -> bool {
        let key = normalize_key(key);
        let b = &self.bindings;
        [&b.forward, &b.backward, &b.left, &b.right, &b.sprint]
            .iter()
            .any(|list| list.iter().any(|k| *k == key))
    }

    pub fn is_escape(&self, key: &str) -> bool {
        key == self.bindings.escape
    }
}

/// Which control surface the visitor gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    /// Keyboard plus pointer-locked mouse look.
    Desktop,
    /// On-screen MOVE and LOOK joysticks.
    Touch,
}

impl ControlScheme {
    pub fn detect(user_agent: &str, viewport_width: f32, breakpoint: f32) -> Self {
        let mobile_agent = ["iPhone", "iPad", "iPod", "Android"]
            .iter()
            .any(|needle| user_agent.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()));
        if mobile_agent || viewport_width < breakpoint {
            ControlScheme::Touch
        } else {
            ControlScheme::Desktop
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = normalize_key(&e.key());
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove { dx: e.movement_x() as f32, dy: e.movement_y() as f32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticks_are_clamped() {
        let mut state = InputState::new();
        state.set_move_stick(Vec2::new(3.0, -7.5));
        assert_eq!(state.move_stick(), Vec2::new(1.0, -1.0));
        state.set_look_stick(Vec2::new(f32::NAN, 0.5));
        assert_eq!(state.look_stick(), Vec2::ZERO);
        state.set_look_stick(Vec2::new(-0.25, 0.5));
        assert_eq!(state.look_stick(), Vec2::new(-0.25, 0.5));
    }

    #[test]
    fn test_arrow_and_letter_keys_map_to_same_action() {
        let processor = InputProcessor::default();
        let mut capture = InputCapture::new();
        capture.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        assert!(capture.sample(&processor).forward);
        capture.process_event(&InputEvent::KeyUp("ArrowUp".into()));
        capture.process_event(&InputEvent::KeyDown("W".into()));
        assert!(capture.sample(&processor).forward);
        capture.process_event(&InputEvent::KeyDown("Shift".into()));
        capture.process_event(&InputEvent::KeyDown("d".into()));
        let state = capture.sample(&processor);
        assert!(state.sprint && state.right && !state.left && !state.backward);
    }

    #[test]
    fn test_shift_release_order_does_not_stick_keys() {
        let processor = InputProcessor::default();
        let mut capture = InputCapture::new();
        capture.process_event(&InputEvent::KeyDown("Shift".into()));
        capture.process_event(&InputEvent::KeyDown("W".into()));
        capture.process_event(&InputEvent::KeyUp("Shift".into()));
        capture.process_event(&InputEvent::KeyUp("w".into()));
        assert!(capture.sample(&processor).is_idle());
        assert!(capture.pressed_keys.is_empty());

        capture.process_event(&InputEvent::KeyDown("a".into()));
        capture.process_event(&InputEvent::KeyDown("Shift".into()));
        capture.process_event(&InputEvent::KeyUp("A".into()));
        let state = capture.sample(&processor);
        assert!(!state.left && state.sprint);
    }

    #[test]
    fn test_key_names_are_normalized() {
        assert_eq!(normalize_key("W"), "w");
        assert_eq!(normalize_key("d"), "d");
        assert_eq!(normalize_key("Shift"), "Shift");
        assert_eq!(normalize_key("ArrowUp"), "ArrowUp");
        assert!(InputProcessor::default().is_navigation_key("S"));
    }

    #[test]
    fn test_focus_loss_clears_keys() {
        let processor = InputProcessor::default();
        let mut capture = InputCapture::new();
        capture.process_event(&InputEvent::KeyDown("a".into()));
        capture.process_event(&InputEvent::FocusLost);
        assert!(capture.sample(&processor).is_idle());
    }

    #[test]
    fn test_mouse_look_only_accumulates_when_locked() {
        let mut capture = InputCapture::new();
        capture.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        assert_eq!(capture.consume_look(), (0.0, 0.0));
        capture.process_event(&InputEvent::PointerLockChanged { locked: true });
        capture.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        capture.process_event(&InputEvent::MouseMove { dx: 2.0, dy: -3.0 });
        assert_eq!(capture.consume_look(), (7.0, -2.0));
        assert_eq!(capture.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn test_control_scheme_detection() {
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0";
        let phone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(ControlScheme::detect(desktop, 1280.0, 800.0), ControlScheme::Desktop);
        assert_eq!(ControlScheme::detect(desktop, 640.0, 800.0), ControlScheme::Touch);
        assert_eq!(ControlScheme::detect(phone, 1280.0, 800.0), ControlScheme::Touch);
        assert_eq!(ControlScheme::detect("Linux; android 14", 1024.0, 800.0), ControlScheme::Touch);
    }

    #[test]
    fn test_navigation_keys() {
        let processor = InputProcessor::default();
        assert!(processor.is_navigation_key("ArrowLeft"));
        assert!(processor.is_navigation_key("Shift"));
        assert!(!processor.is_navigation_key("e"));
        assert!(processor.is_escape("Escape"));
    }
}
