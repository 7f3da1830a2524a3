//! Hall layout and tuning, loaded from RON.
//!
//! The default layout is compiled in from `assets/hall.ron`; `from_ron_str`
//! accepts any other layout with the same shape.

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{Exhibit, Hall, HallBounds, Obstacle, ParticleConfig, PlayerPose};

const DEFAULT_LAYOUT: &str = include_str!("../assets/hall.ron");

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    pub radius: f32,
    pub eye_height: f32,
    /// Units per second.
    pub speed: f32,
    pub sprint_multiplier: f32,
    /// Radians per second at full look-joystick deflection.
    pub look_speed: f32,
    /// Radians per pixel of pointer-locked mouse movement.
    pub mouse_sensitivity: f32,
    pub max_pitch: f32,
    /// Ground-plane (x, z) start position.
    pub spawn: (f32, f32),
    pub spawn_yaw: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KioskConfig {
    pub x: f32,
    pub z: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub video_src: String,
    pub skip_seconds: f64,
    pub volume_step: f64,
    pub initial_volume: f64,
    pub interaction_radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    /// Viewports narrower than this get touch controls.
    pub mobile_breakpoint: f32,
    pub enter_delay_secs: f32,
    pub exhibit_view_distance: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HallConfig {
    pub bounds: HallBounds,
    pub player: PlayerConfig,
    pub obstacles: Vec<Obstacle>,
    pub exhibits: Vec<Exhibit>,
    pub kiosk: KioskConfig,
    pub particles: ParticleConfig,
    pub ui: UiConfig,
}

impl HallConfig {
    /// The layout shipped with the crate.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_ron_str(DEFAULT_LAYOUT)
    }

    pub fn from_ron_str(src: &str) -> Result<Self, ConfigError> {
        let config: HallConfig = ron::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let b = &self.bounds;
        if !(b.min_x < b.max_x && b.min_z < b.max_z) {
            return invalid(format!("bounds are empty: {b:?}"));
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            if !(o.w > 0.0 && o.d > 0.0) {
                return invalid(format!("obstacle {i} has non-positive size {}x{}", o.w, o.d));
            }
        }

        let p = &self.player;
        if !(p.radius > 0.0) {
            return invalid(format!("player radius must be positive, got {}", p.radius));
        }
        if !(p.speed >= 0.0 && p.look_speed >= 0.0 && p.mouse_sensitivity >= 0.0) {
            return invalid("player speeds must not be negative".to_string());
        }
        if !(p.sprint_multiplier >= 1.0) {
            return invalid(format!("sprint multiplier must be at least 1, got {}", p.sprint_multiplier));
        }
        if !(p.max_pitch > 0.0 && p.max_pitch < std::f32::consts::FRAC_PI_2) {
            return invalid(format!("max pitch must lie in (0, pi/2), got {}", p.max_pitch));
        }
        if self.hall().is_blocked(self.spawn_pose().position, p.radius) {
            return invalid(format!("spawn point {:?} is blocked", p.spawn));
        }

        let k = &self.kiosk;
        if !(0.0..=1.0).contains(&k.initial_volume) {
            return invalid(format!("initial volume must lie in [0, 1], got {}", k.initial_volume));
        }
        if !(k.volume_step > 0.0 && k.skip_seconds > 0.0) {
            return invalid("kiosk volume step and skip must be positive".to_string());
        }

        let pc = &self.particles;
        if !(pc.ceiling >= 0.0 && pc.min_speed >= 0.0 && pc.min_speed <= pc.max_speed) {
            return invalid(format!("particle ceiling/speeds are inconsistent: {pc:?}"));
        }
        Ok(())
    }

    pub fn hall(&self) -> Hall {
        Hall::new(self.bounds, self.obstacles.clone(), self.exhibits.clone())
    }

    pub fn spawn_pose(&self) -> PlayerPose {
        let (x, z) = self.player.spawn;
        PlayerPose::new(Vec3::new(x, self.player.eye_height, z), 0.0, self.player.spawn_yaw)
    }

    pub fn kiosk_position(&self) -> Vec3 {
        Vec3::new(self.kiosk.x, 0.0, self.kiosk.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_parses_and_validates() {
        let config = HallConfig::load_default().expect("default layout");
        assert!(!config.obstacles.is_empty());
        assert!(config.obstacles.len() < 20);
        assert_eq!(config.exhibits.len(), 6);
        assert!(!config.hall().is_blocked(config.spawn_pose().position, config.player.radius));
        assert!((config.kiosk.initial_volume - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_spawn_is_rejected() {
        let mut config = HallConfig::load_default().expect("default layout");
        let o = config.obstacles[0];
        config.player.spawn = (o.x, o.z);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_pitch_limit_is_rejected() {
        let mut config = HallConfig::load_default().expect("default layout");
        config.player.max_pitch = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_ron_reports_parse_error() {
        let err = HallConfig::from_ron_str("HallConfig(bounds: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
