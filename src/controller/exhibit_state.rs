use crate::config::HallConfig;
use crate::model::{Exhibit, Hall, ParticleField, PlayerPose};

use super::entry_gate::EntryGate;
use super::input::{ControlScheme, InputState};
use super::kiosk::{KioskController, MediaResource};
use super::locomotion::{LocomotionController, LocomotionSettings};

/// Half-angle of the cone in which an exhibit counts as "looked at".
const EXHIBIT_VIEW_HALF_ANGLE: f32 = 0.45;

/// Things the overlay asks the simulation to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Enter,
    TogglePlay,
    Skip(f64),
    Restart,
    AdjustVolume(f64),
}

/// Everything one visit owns, independent of platform and renderer.
pub struct ExhibitState<M> {
    pub config: HallConfig,
    pub hall: Hall,
    pub pose: PlayerPose,
    pub locomotion: LocomotionController,
    pub kiosk: KioskController<M>,
    pub particles: ParticleField,
    pub gate: EntryGate,
    pub scheme: ControlScheme,
}

impl<M: MediaResource> ExhibitState<M> {
    pub fn new(config: HallConfig, media: M, scheme: ControlScheme) -> Self {
        let hall = config.hall();
        let pose = config.spawn_pose();
        let locomotion = LocomotionController::new(LocomotionSettings::from(&config.player));
        let kiosk = KioskController::new(media, config.kiosk.initial_volume);
        let particles = ParticleField::new(&config.particles, config.bounds);
        let gate = EntryGate::new(config.ui.enter_delay_secs);
        tracing::info!(
            obstacles = hall.obstacles().len(),
            exhibits = hall.exhibits().len(),
            particles = particles.len(),
            ?scheme,
            "exhibit hall ready"
        );
        Self { config, hall, pose, locomotion, kiosk, particles, gate, scheme }
    }

    /// One frame. Walking only happens once the visitor has entered.
    pub fn step(&mut self, input: &InputState, mouse_look: (f32, f32), dt: f32) {
        self.gate.tick(dt);
        self.particles.update(dt);
        if !self.gate.is_open() {
            return;
        }
        let pose = self.locomotion.apply_mouse_look(self.pose, mouse_look.0, mouse_look.1);
        self.pose = self.locomotion.update(pose, input, dt, &self.hall);
    }

    pub fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Enter => {
                self.gate.enter();
            }
            _ if !self.gate.is_open() => {
                tracing::debug!(?action, "ignored before entry");
            }
            UiAction::TogglePlay => {
                self.kiosk.toggle_play();
            }
            UiAction::Skip(seconds) => self.kiosk.skip(seconds),
            UiAction::Restart => self.kiosk.restart(),
            UiAction::AdjustVolume(delta) => {
                self.kiosk.adjust_volume(delta);
            }
        }
    }

    pub fn near_kiosk(&self) -> bool {
        let p = self.pose.position;
        let k = self.config.kiosk_position();
        let dx = p.x - k.x;
        let dz = p.z - k.z;
        (dx * dx + dz * dz).sqrt() <= self.config.kiosk.interaction_radius
    }

    pub fn exhibit_in_view(&self) -> Option<&Exhibit> {
        self.hall
            .exhibit_in_view(&self.pose, self.config.ui.exhibit_view_distance, EXHIBIT_VIEW_HALF_ANGLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::kiosk::PlaybackState;
    use crate::controller::media::SimulatedMedia;
    use glam::Vec3;

    fn state() -> ExhibitState<SimulatedMedia> {
        let config = HallConfig::load_default().expect("default layout");
        ExhibitState::new(config, SimulatedMedia::new(90.0), ControlScheme::Desktop)
    }

    fn enter(state: &mut ExhibitState<SimulatedMedia>) {
        state.gate.report_progress(100.0);
        state.step(&InputState::default(), (0.0, 0.0), 5.0);
        state.apply(UiAction::Enter);
        assert!(state.gate.is_open());
    }

    #[test]
    fn test_no_walking_before_entry() {
        let mut state = state();
        let spawn = state.pose;
        let input = InputState::from_keys(true, false, false, false, false);
        state.step(&input, (50.0, 0.0), 0.5);
        assert_eq!(state.pose, spawn);

        state.apply(UiAction::TogglePlay);
        assert_eq!(state.kiosk.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_walk_after_entry() {
        let mut state = state();
        enter(&mut state);
        let spawn = state.pose;
        let input = InputState::from_keys(true, false, false, false, false);
        state.step(&input, (0.0, 0.0), 0.1);
        assert!(state.pose.position.z < spawn.position.z);
    }

    #[test]
    fn test_kiosk_actions_after_entry() {
        let mut state = state();
        enter(&mut state);
        state.apply(UiAction::TogglePlay);
        assert_eq!(state.kiosk.state(), PlaybackState::Playing);
        state.apply(UiAction::Skip(10.0));
        assert_eq!(state.kiosk.media().current_time(), 10.0);
        state.apply(UiAction::AdjustVolume(-1.0));
        assert_eq!(state.kiosk.volume(), 0.0);
        state.apply(UiAction::TogglePlay);
        state.apply(UiAction::Restart);
        assert_eq!(state.kiosk.state(), PlaybackState::Playing);
        assert_eq!(state.kiosk.media().current_time(), 0.0);
    }

    #[test]
    fn test_kiosk_proximity() {
        let mut state = state();
        assert!(!state.near_kiosk());
        let k = state.config.kiosk_position();
        state.pose.position = Vec3::new(k.x, 1.7, k.z + 3.0);
        assert!(state.near_kiosk());
    }

    #[test]
    fn test_portrait_label_when_facing_wall() {
        let mut state = state();
        let first = state.config.exhibits[0].clone();
        let p = first.position();
        // stand in front of the portrait and look at it
        state.pose = PlayerPose::new(Vec3::new(p.x + 4.0, 1.7, p.z), 0.0, std::f32::consts::FRAC_PI_2);
        assert_eq!(state.exhibit_in_view().map(|e| e.name.clone()), Some(first.name));
    }
}
