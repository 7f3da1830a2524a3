use glam::{Vec2, Vec3};

use crate::config::PlayerConfig;
use crate::model::{Hall, PlayerPose};

use super::input::InputState;

/// Tuning for first-person walking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionSettings {
    pub radius: f32,
    pub speed: f32,
    pub sprint_multiplier: f32,
    pub look_speed: f32,
    pub mouse_sensitivity: f32,
    pub max_pitch: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            speed: 10.0,
            sprint_multiplier: 2.0,
            look_speed: 2.0,
            mouse_sensitivity: 0.002,
            max_pitch: 1.5,
        }
    }
}

impl From<&PlayerConfig> for LocomotionSettings {
    fn from(p: &PlayerConfig) -> Self {
        Self {
            radius: p.radius,
            speed: p.speed,
            sprint_multiplier: p.sprint_multiplier,
            look_speed: p.look_speed,
            mouse_sensitivity: p.mouse_sensitivity,
            max_pitch: p.max_pitch,
        }
    }
}

/// Walks the viewpoint through the hall: look input, then a yaw-relative
/// step resolved one axis at a time against the obstacle table.
pub struct LocomotionController {
    settings: LocomotionSettings,
}

impl LocomotionController {
    pub fn new(settings: LocomotionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LocomotionSettings {
        &self.settings
    }

    /// Advance one frame. The returned pose is never inside a blocked region
    /// as long as the incoming one wasn't.
    pub fn update(&self, pose: PlayerPose, input: &InputState, dt: f32, hall: &Hall) -> PlayerPose {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut pose = self.apply_look_stick(pose, input.look_stick(), dt);
        let step = self.displacement(&pose, input, dt);
        pose.position = self.resolve(pose.position, step, hall);
        pose
    }

    /// Turn by the look joystick; +x turns right, +y looks down.
    pub fn apply_look_stick(&self, mut pose: PlayerPose, look: Vec2, dt: f32) -> PlayerPose {
        if look == Vec2::ZERO {
            return pose;
        }
        let turn = look * self.settings.look_speed * dt;
        pose.yaw -= turn.x;
        pose.pitch = self.clamp_pitch(pose.pitch - turn.y);
        pose
    }

    /// Apply pointer-locked mouse movement in pixels.
    pub fn apply_mouse_look(&self, mut pose: PlayerPose, dx: f32, dy: f32) -> PlayerPose {
        if dx == 0.0 && dy == 0.0 {
            return pose;
        }
        pose.yaw -= dx * self.settings.mouse_sensitivity;
        pose.pitch = self.clamp_pitch(pose.pitch - dy * self.settings.mouse_sensitivity);
        pose
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        let max = self.settings.max_pitch;
        pitch.clamp(-max, max)
    }

    /// Ground-plane (x, z) step for this frame, already rotated into world space.
    pub fn displacement(&self, pose: &PlayerPose, input: &InputState, dt: f32) -> Vec2 {
        let stick = input.move_stick();
        let front = f32::from(u8::from(input.backward)) - f32::from(u8::from(input.forward)) + stick.y;
        let side = f32::from(u8::from(input.left)) - f32::from(u8::from(input.right)) - stick.x;

        let mut speed = self.settings.speed * dt;
        if input.sprint {
            speed *= self.settings.sprint_multiplier;
        }

        let local = Vec2::new(-side, front).normalize_or_zero() * speed;
        pose.rotate_by_yaw(local)
    }

    /// Commit the X part of `step`, then the Z part, each only if the
    /// resulting position is free. Lets the player slide along walls.
    pub fn resolve(&self, position: Vec3, step: Vec2, hall: &Hall) -> Vec3 {
        let radius = self.settings.radius;
        let mut pos = position;

        if step.x != 0.0 {
            let candidate = Vec3::new(pos.x + step.x, pos.y, pos.z);
            if !hall.is_blocked(candidate, radius) {
                pos = candidate;
            }
        }

        if step.y != 0.0 {
            let candidate = Vec3::new(pos.x, pos.y, pos.z + step.y);
            if !hall.is_blocked(candidate, radius) {
                pos = candidate;
            }
        }

        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HallConfig;
    use crate::model::{HallBounds, Obstacle};
    use std::f32::consts::{FRAC_PI_2, SQRT_2};

    const DT: f32 = 1.0 / 60.0;

    fn open_hall(obstacles: Vec<Obstacle>) -> Hall {
        Hall::new(HallBounds { min_x: -50.0, max_x: 50.0, min_z: -50.0, max_z: 50.0 }, obstacles, vec![])
    }

    fn controller() -> LocomotionController {
        LocomotionController::new(LocomotionSettings::default())
    }

    fn origin() -> PlayerPose {
        PlayerPose::new(Vec3::ZERO, 0.0, 0.0)
    }

    fn forward() -> InputState {
        InputState::from_keys(true, false, false, false, false)
    }

    #[test]
    fn test_idle_input_changes_nothing() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let pose = PlayerPose::new(Vec3::new(1.0, 1.7, -2.0), 0.3, 1.1);
        let mut next = pose;
        for _ in 0..100 {
            next = ctl.update(next, &InputState::default(), DT, &hall);
        }
        assert_eq!(next, pose);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let input = InputState::from_keys(true, true, true, true, false);
        assert_eq!(ctl.update(origin(), &input, DT, &hall), origin());
    }

    #[test]
    fn test_one_second_forward_moves_ten_units() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let mut pose = origin();
        for _ in 0..60 {
            pose = ctl.update(pose, &forward(), DT, &hall);
        }
        assert!((pose.position.z + 10.0).abs() < 1e-3, "z = {}", pose.position.z);
        assert!(pose.position.x.abs() < 1e-6);
        assert_eq!(pose.position.y, 0.0);
    }

    #[test]
    fn test_forward_stops_at_obstacle_boundary() {
        let ctl = controller();
        // face at z = -5, inflated by the radius to -4.5
        let hall = open_hall(vec![Obstacle::new(0.0, -6.0, 4.0, 2.0)]);
        let mut pose = origin();
        for _ in 0..60 {
            pose = ctl.update(pose, &forward(), DT, &hall);
            assert!(!hall.is_blocked(pose.position, 0.5));
        }
        let step = 10.0 * DT;
        assert!(pose.position.z >= -4.5 - 1e-5, "z = {}", pose.position.z);
        assert!(pose.position.z <= -4.5 + step + 1e-5, "z = {}", pose.position.z);
    }

    #[test]
    fn test_diagonal_into_wall_slides() {
        let ctl = controller();
        // long wall along Z whose inflated face sits at x = 1.0
        let hall = open_hall(vec![Obstacle::new(2.0, 0.0, 1.0, 80.0)]);
        let input = InputState::from_keys(true, false, false, true, false);
        let mut pose = origin();
        let frames = 120;
        for _ in 0..frames {
            pose = ctl.update(pose, &input, DT, &hall);
        }
        let per_axis = 10.0 * DT / SQRT_2;
        assert!(pose.position.x <= 1.0 && pose.position.x > 1.0 - per_axis - 1e-5);
        assert!((pose.position.z + per_axis * frames as f32).abs() < 1e-2, "z = {}", pose.position.z);
    }

    #[test]
    fn test_diagonal_into_boundary_keeps_other_axis() {
        let ctl = controller();
        let hall = Hall::new(HallBounds { min_x: -50.0, max_x: 50.0, min_z: -1.0, max_z: 50.0 }, vec![], vec![]);
        let input = InputState::from_keys(true, false, true, false, false);
        let mut pose = origin();
        for _ in 0..60 {
            let next = ctl.update(pose, &input, DT, &hall);
            assert!(next.position.x < pose.position.x, "x must keep decreasing");
            pose = next;
        }
        assert!(pose.position.z >= -1.0);
    }

    #[test]
    fn test_pitch_is_clamped_under_sustained_look() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let up = InputState::default().with_look_stick(Vec2::new(0.0, -1.0));
        let mut pose = origin();
        for _ in 0..1000 {
            pose = ctl.update(pose, &up, DT, &hall);
            assert!(pose.pitch.abs() <= 1.5);
        }
        assert_eq!(pose.pitch, 1.5);

        let down = InputState::default().with_look_stick(Vec2::new(0.3, 1.0));
        for _ in 0..1000 {
            pose = ctl.update(pose, &down, DT, &hall);
            assert!(pose.pitch.abs() <= 1.5);
        }
        assert_eq!(pose.pitch, -1.5);
        assert!(pose.yaw < 0.0, "positive x turns right");
        assert_eq!(pose.position, Vec3::ZERO);
    }

    #[test]
    fn test_mouse_look_clamps_pitch() {
        let ctl = controller();
        let pose = ctl.apply_mouse_look(origin(), 100.0, -10_000.0);
        assert_eq!(pose.pitch, 1.5);
        assert!((pose.yaw + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_does_not_affect_ground_speed() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let level = ctl.update(origin(), &forward(), DT, &hall);
        let tilted = ctl.update(PlayerPose::new(Vec3::ZERO, 1.4, 0.0), &forward(), DT, &hall);
        assert!((level.position - tilted.position).length() < 1e-6);
    }

    #[test]
    fn test_movement_follows_yaw() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let pose = ctl.update(PlayerPose::new(Vec3::ZERO, 0.0, FRAC_PI_2), &forward(), 1.0, &hall);
        assert!((pose.position - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_sprint_multiplies_speed() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        let input = InputState::from_keys(false, true, false, false, true);
        let pose = ctl.update(origin(), &input, 0.5, &hall);
        assert!((pose.position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_keyboard_and_stick_never_exceed_unit_speed() {
        let ctl = controller();
        let input = InputState::from_keys(true, false, false, true, false)
            .with_move_stick(Vec2::new(1.0, -1.0));
        let step = ctl.displacement(&origin(), &input, 1.0);
        assert!((step.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bad_delta_is_ignored() {
        let ctl = controller();
        let hall = open_hall(vec![]);
        assert_eq!(ctl.update(origin(), &forward(), f32::NAN, &hall), origin());
        assert_eq!(ctl.update(origin(), &forward(), -1.0, &hall), origin());
    }

    #[test]
    fn test_wandering_never_enters_blocked_region() {
        let config = HallConfig::load_default().expect("default layout");
        let hall = config.hall();
        let ctl = LocomotionController::new(LocomotionSettings::from(&config.player));
        let mut pose = config.spawn_pose();
        let mut seed = 12345u32;
        for frame in 0..6000 {
            if frame % 30 == 0 {
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            }
            let input = InputState::from_keys(
                seed & 1 != 0,
                seed & 2 != 0 && seed & 1 == 0,
                seed & 4 != 0,
                seed & 8 != 0,
                seed & 16 != 0,
            )
            .with_look_stick(Vec2::new(((seed >> 8) & 3) as f32 - 1.5, 0.0));
            pose = ctl.update(pose, &input, DT, &hall);
            assert!(!hall.is_blocked(pose.position, config.player.radius), "blocked at frame {frame}: {pose:?}");
        }
    }
}
