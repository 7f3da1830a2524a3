//! Media elements the kiosk can drive.

use crate::error::MediaError;

use super::kiosk::MediaResource;

/// Clock-driven stand-in for a video element. Used by the native build,
/// which has no video decoder, and by tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedMedia {
    duration: f64,
    cursor: f64,
    playing: bool,
    ready: bool,
    volume: f64,
    muted: bool,
}

impl SimulatedMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            cursor: 0.0,
            playing: false,
            ready: true,
            volume: 1.0,
            muted: false,
        }
    }

    /// Start in the not-ready state; `play` fails until `set_ready(true)`.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Advance the cursor while playing; stops at the end.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.cursor = (self.cursor + dt).min(self.duration);
        if self.cursor >= self.duration {
            self.playing = false;
        }
    }
}

impl MediaResource for SimulatedMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        if !self.ready {
            return Err(MediaError::NotReady);
        }
        if self.cursor >= self.duration {
            self.cursor = 0.0;
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.cursor
    }

    fn set_current_time(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.cursor = seconds.clamp(0.0, self.duration);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(target_arch = "wasm32")]
pub use self::wasm::VideoElementMedia;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen_futures::{spawn_local, JsFuture};
    use web_sys::{HtmlMediaElement, HtmlVideoElement};

    use super::*;

    /// The kiosk's `<video>` element.
    pub struct VideoElementMedia {
        element: HtmlVideoElement,
    }

    impl VideoElementMedia {
        pub fn new(element: HtmlVideoElement) -> Self {
            Self { element }
        }

        pub fn element(&self) -> &HtmlVideoElement {
            &self.element
        }
    }

    impl MediaResource for VideoElementMedia {
        fn play(&mut self) -> Result<(), MediaError> {
            if self.element.network_state() == HtmlMediaElement::NETWORK_NO_SOURCE {
                return Err(MediaError::NoSource);
            }
            let promise: js_sys::Promise = self
                .element
                .play()
                .map_err(|err| MediaError::Rejected(format!("{err:?}")))?;
            spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    tracing::warn!("video play() rejected: {err:?}");
                }
            });
            Ok(())
        }

        fn pause(&mut self) {
            if let Err(err) = self.element.pause() {
                tracing::warn!("video pause() failed: {err:?}");
            }
        }

        fn current_time(&self) -> f64 {
            self.element.current_time()
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.element.set_current_time(seconds);
        }

        fn set_volume(&mut self, volume: f64) {
            self.element.set_volume(volume);
        }

        fn set_muted(&mut self, muted: bool) {
            self.element.set_muted(muted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_media_plays_to_end() {
        let mut media = SimulatedMedia::new(3.0);
        media.play().expect("ready");
        media.advance(1.0);
        assert_eq!(media.current_time(), 1.0);
        media.advance(5.0);
        assert_eq!(media.current_time(), 3.0);
        assert!(!media.is_playing());

        // playing again from the end starts over
        media.play().expect("ready");
        assert_eq!(media.current_time(), 0.0);
    }

    #[test]
    fn test_simulated_media_ignores_non_finite_seek() {
        let mut media = SimulatedMedia::new(3.0);
        media.set_current_time(2.0);
        media.set_current_time(f64::NAN);
        assert_eq!(media.current_time(), 2.0);
    }

    #[test]
    fn test_not_ready_rejects_play() {
        let mut media = SimulatedMedia::new(3.0).not_ready();
        assert_eq!(media.play(), Err(MediaError::NotReady));
        assert!(!media.is_playing());
    }
}
