// CONTROLLER: input, locomotion, kiosk playback and the frame loop
pub mod input;
pub mod joystick;
pub mod locomotion;
pub mod kiosk;
pub mod media;
pub mod entry_gate;
pub mod exhibit_state;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use input::{ControlScheme, InputCapture, InputEvent, InputProcessor, InputState, KeyBindings};
pub use joystick::{TouchControls, VirtualJoystick};
pub use locomotion::{LocomotionController, LocomotionSettings};
pub use kiosk::{KioskController, MediaResource, PlaybackState};
pub use media::SimulatedMedia;
#[cfg(target_arch = "wasm32")]
pub use media::VideoElementMedia;
pub use entry_gate::{EntryGate, EntryPhase};
pub use exhibit_state::{ExhibitState, UiAction};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
