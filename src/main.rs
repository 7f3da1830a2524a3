use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use exhibit_hall::config::HallConfig;
use exhibit_hall::controller::{
    ControlScheme, ExhibitState, InputCapture, InputEvent, InputProcessor, SimulatedMedia,
};
use exhibit_hall::error::GpuError;
use exhibit_hall::model::Camera;
use exhibit_hall::view::{GpuContext, RenderState};
use exhibit_hall::{logging, ui};

/// Length of the stand-in clip the native kiosk plays.
const CLIP_SECONDS: f64 = 180.0;

/// Map a physical key to the browser `KeyboardEvent.key` name the bindings use.
fn key_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::ShiftLeft | KeyCode::ShiftRight => "Shift",
        KeyCode::Escape => "Escape",
        _ => return None,
    })
}

/// Everything that exists once the window is up.
struct Visit {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    camera: Camera,
    input: InputCapture,
    processor: InputProcessor,
    state: ExhibitState<SimulatedMedia>,
    last_frame: Instant,
}

impl Visit {
    async fn new(window: Arc<Window>, config: HallConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new_native(&instance, surface, size.width, size.height).await?;

        let mut state = ExhibitState::new(config, SimulatedMedia::new(CLIP_SECONDS), ControlScheme::Desktop);
        let render_state = RenderState::new(&gpu, &state.config, &state.particles);
        state.gate.report_progress(100.0);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(egui_ctx.clone(), egui::ViewportId::ROOT, &window, None, None, None);

        Ok(Self {
            camera: Camera::new(gpu.config.width, gpu.config.height),
            window,
            gpu,
            render_state,
            egui_state,
            egui_ctx,
            input: InputCapture::new(),
            processor: InputProcessor::default(),
            state,
            last_frame: Instant::now(),
        })
    }

    fn set_mouse_lock(&mut self, locked: bool) {
        if locked {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("cursor grab failed: {e}");
                return;
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("cursor release failed: {e}");
        }
        self.window.set_cursor_visible(!locked);
        self.input.process_event(&InputEvent::PointerLockChanged { locked });
    }

    /// Returns true if the event was used.
    fn input(&mut self, event: &WindowEvent) -> bool {
        if self.egui_state.on_window_event(self.window.as_ref(), event).consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, physical_key: PhysicalKey::Code(code), .. },
                ..
            } => {
                let Some(key) = key_name(*code) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => {
                        if self.processor.is_escape(key) {
                            self.set_mouse_lock(false);
                        }
                        self.input.process_event(&InputEvent::KeyDown(key.to_string()));
                    }
                    ElementState::Released => {
                        self.input.process_event(&InputEvent::KeyUp(key.to_string()));
                    }
                }
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                let over_ui = self.egui_ctx.wants_pointer_input() || self.egui_ctx.is_pointer_over_area();
                if self.state.gate.is_open() && !self.input.pointer_locked && !over_ui {
                    self.set_mouse_lock(true);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.input.process_event(&InputEvent::FocusLost);
                self.set_mouse_lock(false);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.input.process_event(&InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.render_state.resize(&mut self.gpu, width, height) {
            self.camera.set_aspect(width, height);
        }
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().clamp(0.0, 0.1);
        self.last_frame = now;

        self.state.kiosk.media_mut().advance(dt as f64);
        let look = self.input.consume_look();
        let sample = self.input.sample(&self.processor);
        self.state.step(&sample, look, dt);

        self.render_state.update_camera(&self.gpu.queue, &self.camera, &self.state.pose);
        self.render_state.scene.update_particles(&self.gpu.queue, &self.state.particles);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let (mut full_output, actions) = ui::build_ui(&self.egui_ctx, raw_input, &self.state, &self.input.touch);
        for action in actions {
            self.state.apply(action);
        }
        self.render_state.screen_playing = self.state.kiosk.state().is_playing();

        let platform_output = std::mem::take(&mut full_output.platform_output);
        self.egui_state.handle_platform_output(&self.window, platform_output);
        self.render_state.set_ui(&self.egui_ctx, full_output, self.window.scale_factor() as f32);

        self.render_state.draw_frame(&self.gpu)
    }
}

struct App {
    config: HallConfig,
    visit: Option<Visit>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.visit.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.ui.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("could not open window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Visit::new(window, self.config.clone())) {
            Ok(visit) => {
                tracing::info!("native visit started");
                self.visit = Some(visit);
            }
            Err(e) => {
                tracing::error!("GPU setup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(visit) = self.visit.as_mut() else {
            return;
        };
        if window_id != visit.window.id() || visit.input(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => visit.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match visit.frame() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("out of GPU memory");
                    event_loop.exit();
                }
                Err(e) => tracing::warn!("frame dropped: {e}"),
            },
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(visit), DeviceEvent::MouseMotion { delta }) = (self.visit.as_mut(), event) {
            visit.input.process_event(&InputEvent::MouseMove { dx: delta.0 as f32, dy: delta.1 as f32 });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(visit) = &self.visit {
            visit.window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = HallConfig::load_default()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App { config, visit: None };
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_match_bindings() {
        let processor = InputProcessor::default();
        for code in [KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::KeyA, KeyCode::KeyD, KeyCode::ShiftLeft] {
            let key = key_name(code).expect("mapped");
            assert!(processor.is_navigation_key(key), "{key} should be bound");
        }
        assert!(processor.is_escape(key_name(KeyCode::Escape).expect("mapped")));
        assert_eq!(key_name(KeyCode::KeyQ), None);
    }
}
