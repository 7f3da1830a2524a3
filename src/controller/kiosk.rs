use crate::error::MediaError;

/// Commands the kiosk can issue to its media element. All of them are
/// fire-and-forget: implementations handle (and log) asynchronous failures
/// themselves. `play` only returns an error when the command could not be
/// issued at all.
pub trait MediaResource {
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    /// Playback cursor in seconds.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// Transport controls for the video kiosk.
///
/// The state is optimistic: it reflects the last command issued, not what the
/// element is actually doing, and is never rolled back on a late rejection.
pub struct KioskController<M> {
    media: M,
    state: PlaybackState,
    volume: f64,
}

impl<M: MediaResource> KioskController<M> {
    pub fn new(mut media: M, initial_volume: f64) -> Self {
        let volume = initial_volume.clamp(0.0, 1.0);
        media.set_volume(volume);
        Self { media, state: PlaybackState::Paused, volume }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn toggle_play(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Paused => match self.media.play() {
                Ok(()) => {
                    self.state = PlaybackState::Playing;
                    tracing::debug!("kiosk playing");
                }
                Err(err) => {
                    tracing::warn!("kiosk play failed: {err}");
                }
            },
            PlaybackState::Playing => {
                self.media.pause();
                self.state = PlaybackState::Paused;
                tracing::debug!("kiosk paused");
            }
        }
        self.state
    }

    /// Move the cursor by `seconds`; the element clamps to its own range.
    pub fn skip(&mut self, seconds: f64) {
        let target = self.media.current_time() + seconds;
        self.media.set_current_time(target);
    }

    pub fn restart(&mut self) {
        self.media.set_current_time(0.0);
        if let Err(err) = self.media.play() {
            tracing::warn!("kiosk restart could not start playback: {err}");
        }
        self.state = PlaybackState::Playing;
    }

    pub fn adjust_volume(&mut self, delta: f64) -> f64 {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.media.set_volume(self.volume);
        self.media.set_muted(false);
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::media::SimulatedMedia;

    fn kiosk(volume: f64) -> KioskController<SimulatedMedia> {
        KioskController::new(SimulatedMedia::new(120.0), volume)
    }

    #[test]
    fn test_double_toggle_returns_to_start() {
        let mut k = kiosk(0.5);
        assert_eq!(k.state(), PlaybackState::Paused);
        assert_eq!(k.toggle_play(), PlaybackState::Playing);
        assert!(k.media().is_playing());
        assert_eq!(k.toggle_play(), PlaybackState::Paused);
        assert!(!k.media().is_playing());
    }

    #[test]
    fn test_failed_play_stays_paused() {
        let mut k = KioskController::new(SimulatedMedia::new(120.0).not_ready(), 0.5);
        assert_eq!(k.toggle_play(), PlaybackState::Paused);
        assert!(!k.media().is_playing());

        k.media_mut().set_ready(true);
        assert_eq!(k.toggle_play(), PlaybackState::Playing);
    }

    #[test]
    fn test_skip_moves_cursor() {
        let mut k = kiosk(0.5);
        k.skip(10.0);
        assert_eq!(k.media().current_time(), 10.0);
        k.skip(-4.0);
        assert_eq!(k.media().current_time(), 6.0);
        // the element clamps, the controller doesn't care
        k.skip(-100.0);
        assert_eq!(k.media().current_time(), 0.0);
        k.skip(500.0);
        assert_eq!(k.media().current_time(), 120.0);
    }

    #[test]
    fn test_restart_from_paused_plays_from_zero() {
        let mut k = kiosk(0.5);
        k.skip(42.0);
        k.restart();
        assert_eq!(k.media().current_time(), 0.0);
        assert_eq!(k.state(), PlaybackState::Playing);
        assert!(k.media().is_playing());
    }

    #[test]
    fn test_restart_forces_playing_even_if_play_fails() {
        let mut k = KioskController::new(SimulatedMedia::new(120.0).not_ready(), 0.5);
        k.restart();
        assert_eq!(k.state(), PlaybackState::Playing);
        // next toggle pauses, as the visible state says it is playing
        assert_eq!(k.toggle_play(), PlaybackState::Paused);
    }

    #[test]
    fn test_volume_round_trip_and_clamp() {
        let mut k = kiosk(0.5);
        k.adjust_volume(0.1);
        k.adjust_volume(-0.1);
        assert!((k.volume() - 0.5).abs() < 1e-9);

        let mut k = kiosk(0.05);
        assert_eq!(k.adjust_volume(-1.0), 0.0);
        assert_eq!(k.media().volume(), 0.0);
        assert_eq!(k.adjust_volume(5.0), 1.0);
    }

    #[test]
    fn test_volume_change_unmutes() {
        let mut k = kiosk(0.5);
        k.media_mut().set_muted(true);
        k.adjust_volume(0.0);
        assert!(!k.media().is_muted());
        assert_eq!(k.media().volume(), 0.5);
    }
}
