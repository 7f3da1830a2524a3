//! On-screen joysticks for touch devices.
//!
//! Each stick tracks at most one pointer. The stick head follows the pointer
//! up to `MAX_TRAVEL` pixels from the base centre and the reported vector is
//! the head offset divided by that travel, so +x is screen right and +y is
//! screen down. Releasing (or cancelling) the pointer re-centres it.

use glam::Vec2;

/// Pixels the stick head may travel from the centre.
pub const MAX_TRAVEL: f32 = 50.0;
/// Radius of the base; presses outside it are not captured.
pub const BASE_RADIUS: f32 = 60.0;
/// Gap between a base and the viewport edges.
pub const EDGE_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualJoystick {
    center: Vec2,
    knob: Vec2,
    pointer: Option<i32>,
}

impl VirtualJoystick {
    pub fn new(center: Vec2) -> Self {
        Self { center, knob: Vec2::ZERO, pointer: None }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Head offset from the centre in pixels.
    pub fn knob_offset(&self) -> Vec2 {
        self.knob
    }

    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }

    /// Capture `pointer_id` if it lands on the base. Returns true when captured.
    pub fn press(&mut self, pointer_id: i32, pos: Vec2) -> bool {
        if self.pointer.is_some() || pos.distance(self.center) > BASE_RADIUS {
            return false;
        }
        self.pointer = Some(pointer_id);
        self.track(pos);
        true
    }

    /// Follow a captured pointer. Returns true if the pointer belongs to this stick.
    pub fn drag(&mut self, pointer_id: i32, pos: Vec2) -> bool {
        if self.pointer != Some(pointer_id) {
            return false;
        }
        self.track(pos);
        true
    }

    /// Release a captured pointer and re-centre.
    pub fn release(&mut self, pointer_id: i32) -> bool {
        if self.pointer != Some(pointer_id) {
            return false;
        }
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.pointer = None;
        self.knob = Vec2::ZERO;
    }

    fn track(&mut self, pos: Vec2) {
        let offset = pos - self.center;
        self.knob = if offset.is_finite() { offset.clamp_length_max(MAX_TRAVEL) } else { Vec2::ZERO };
    }

    /// Normalized output in [-1, 1] on each axis.
    pub fn vector(&self) -> Vec2 {
        (self.knob / MAX_TRAVEL).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
    }
}

/// The MOVE stick (bottom left) and LOOK stick (bottom right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchControls {
    pub move_stick: VirtualJoystick,
    pub look_stick: VirtualJoystick,
}

impl TouchControls {
    pub fn new(viewport: Vec2) -> Self {
        let mut controls = Self {
            move_stick: VirtualJoystick::new(Vec2::ZERO),
            look_stick: VirtualJoystick::new(Vec2::ZERO),
        };
        controls.layout(viewport);
        controls
    }

    /// Re-anchor both bases after a resize.
    pub fn layout(&mut self, viewport: Vec2) {
        let inset = EDGE_MARGIN + BASE_RADIUS;
        self.move_stick.set_center(Vec2::new(inset, viewport.y - inset));
        self.look_stick.set_center(Vec2::new(viewport.x - inset, viewport.y - inset));
    }

    /// Route a pointer press to whichever stick it lands on.
    pub fn press(&mut self, pointer_id: i32, pos: Vec2) -> bool {
        self.move_stick.press(pointer_id, pos) || self.look_stick.press(pointer_id, pos)
    }

    pub fn drag(&mut self, pointer_id: i32, pos: Vec2) -> bool {
        self.move_stick.drag(pointer_id, pos) || self.look_stick.drag(pointer_id, pos)
    }

    pub fn release(&mut self, pointer_id: i32) -> bool {
        // both sticks must see the release; never short-circuit
        let moved = self.move_stick.release(pointer_id);
        let looked = self.look_stick.release(pointer_id);
        moved || looked
    }

    pub fn release_all(&mut self) {
        self.move_stick.reset();
        self.look_stick.reset();
    }
}

impl Default for TouchControls {
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_beyond_travel_is_clamped() {
        let mut stick = VirtualJoystick::new(Vec2::new(100.0, 100.0));
        assert!(stick.press(1, Vec2::new(110.0, 100.0)));
        assert!((stick.vector() - Vec2::new(0.2, 0.0)).length() < 1e-6);

        assert!(stick.drag(1, Vec2::new(400.0, 100.0)));
        assert!((stick.vector() - Vec2::new(1.0, 0.0)).length() < 1e-6);

        // diagonal overshoot stays on the unit circle
        assert!(stick.drag(1, Vec2::new(300.0, 300.0)));
        let v = stick.vector();
        assert!(v.length() <= 1.0 + 1e-5);
        assert!(v.x > 0.0 && v.y > 0.0);
    }

    #[test]
    fn test_release_recenters() {
        let mut stick = VirtualJoystick::new(Vec2::new(100.0, 100.0));
        stick.press(3, Vec2::new(100.0, 70.0));
        assert!(stick.vector().y < 0.0);
        assert!(!stick.release(4));
        assert!(stick.release(3));
        assert_eq!(stick.vector(), Vec2::ZERO);
        assert!(!stick.is_active());
    }

    #[test]
    fn test_other_pointers_are_ignored() {
        let mut stick = VirtualJoystick::new(Vec2::new(100.0, 100.0));
        assert!(!stick.press(1, Vec2::new(300.0, 300.0)));
        assert!(stick.press(1, Vec2::new(100.0, 100.0)));
        assert!(!stick.press(2, Vec2::new(100.0, 100.0)));
        assert!(!stick.drag(2, Vec2::new(140.0, 100.0)));
        assert_eq!(stick.vector(), Vec2::ZERO);
    }

    #[test]
    fn test_two_sticks_track_independent_pointers() {
        let mut touch = TouchControls::new(Vec2::new(1000.0, 500.0));
        let left = touch.move_stick.center();
        let right = touch.look_stick.center();
        assert_eq!(left, Vec2::new(110.0, 390.0));
        assert_eq!(right, Vec2::new(890.0, 390.0));

        assert!(touch.press(10, left));
        assert!(touch.press(11, right));
        assert!(touch.drag(10, left + Vec2::new(0.0, -50.0)));
        assert!(touch.drag(11, right + Vec2::new(25.0, 0.0)));
        assert!((touch.move_stick.vector() - Vec2::new(0.0, -1.0)).length() < 1e-6);
        assert!((touch.look_stick.vector() - Vec2::new(0.5, 0.0)).length() < 1e-6);

        assert!(touch.release(10));
        assert_eq!(touch.move_stick.vector(), Vec2::ZERO);
        assert!(touch.look_stick.is_active());

        // a tap in the middle of the screen is left for the UI
        assert!(!touch.press(12, Vec2::new(500.0, 250.0)));
    }
}
