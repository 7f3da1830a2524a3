/// Welcome-screen gate in front of the hall.
///
/// Loading progress climbs to 100; after that the ENTER button only appears
/// once `enter_delay` seconds have passed. Walking and the kiosk stay
/// inactive until the visitor enters.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryGate {
    progress: f32,
    ready_for: f32,
    enter_delay: f32,
    entered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    Loading,
    Ready,
    Entered,
}

impl EntryGate {
    pub fn new(enter_delay: f32) -> Self {
        Self { progress: 0.0, ready_for: 0.0, enter_delay: enter_delay.max(0.0), entered: false }
    }

    /// Progress never goes backwards.
    pub fn report_progress(&mut self, percent: f32) {
        if percent.is_finite() {
            self.progress = self.progress.max(percent.clamp(0.0, 100.0));
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn tick(&mut self, dt: f32) {
        if self.progress >= 100.0 && dt.is_finite() {
            self.ready_for += dt.max(0.0);
        }
    }

    pub fn phase(&self) -> EntryPhase {
        if self.entered {
            EntryPhase::Entered
        } else if self.progress >= 100.0 && self.ready_for >= self.enter_delay {
            EntryPhase::Ready
        } else {
            EntryPhase::Loading
        }
    }

    pub fn is_open(&self) -> bool {
        self.entered
    }

    /// Returns true if the visitor got in.
    pub fn enter(&mut self) -> bool {
        if self.phase() == EntryPhase::Ready {
            self.entered = true;
            tracing::info!("visitor entered the hall");
        }
        self.entered
    }

    pub fn status_text(&self) -> &'static str {
        match self.phase() {
            EntryPhase::Loading => "LOADING",
            EntryPhase::Ready | EntryPhase::Entered => "ONLINE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_waits_for_progress_and_delay() {
        let mut gate = EntryGate::new(2.0);
        gate.tick(10.0);
        assert_eq!(gate.phase(), EntryPhase::Loading);
        assert!(!gate.enter());

        gate.report_progress(60.0);
        gate.report_progress(30.0);
        assert_eq!(gate.progress(), 60.0);

        gate.report_progress(100.0);
        gate.tick(1.5);
        assert_eq!(gate.phase(), EntryPhase::Loading);
        assert_eq!(gate.status_text(), "LOADING");
        assert!(!gate.enter());

        gate.tick(0.5);
        assert_eq!(gate.phase(), EntryPhase::Ready);
        assert_eq!(gate.status_text(), "ONLINE");
        assert!(gate.enter());
        assert!(gate.is_open());
        assert_eq!(gate.phase(), EntryPhase::Entered);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut gate = EntryGate::new(0.0);
        gate.report_progress(250.0);
        assert_eq!(gate.progress(), 100.0);
        gate.report_progress(f32::NAN);
        assert_eq!(gate.progress(), 100.0);
        assert!(gate.enter());
    }
}
