use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use web_sys::{HtmlCanvasElement, Window};

use crate::model::Camera;
use crate::ui;
use crate::view::{GpuContext, RenderState};

use super::input::{InputCapture, InputProcessor};
use super::exhibit_state::ExhibitState;
use super::media::VideoElementMedia;

/// Per-frame driver for the browser build.
pub struct FrameLoopContext {
    pub state: Rc<RefCell<ExhibitState<VideoElementMedia>>>,
    pub input: Rc<RefCell<InputCapture>>,
    pub processor: InputProcessor,
    pub camera: Camera,
    pub canvas: HtmlCanvasElement,
    /// Whether the kiosk's video overlay is currently displayed.
    pub video_visible: bool,
    pub egui_ctx: egui::Context,
    pub egui_events: Rc<RefCell<Vec<egui::Event>>>,
    pub last_time: f64,
}

impl FrameLoopContext {
    /// Advance the simulation by one animation frame and prepare the UI.
    pub fn update(&mut self, window: &Window, gpu: &mut GpuContext, render_state: &mut RenderState) {
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let dt = ((now - self.last_time) / 1000.0).clamp(0.0, 0.1) as f32;
        self.last_time = now;

        let (viewport, dpr) = self.handle_resize(window, gpu, render_state);

        // last value wins: listeners only ever store the latest input
        let (look, sample) = {
            let mut input = self.input.borrow_mut();
            (input.consume_look(), input.sample(&self.processor))
        };

        let mut state = self.state.borrow_mut();
        state.step(&sample, look, dt);

        render_state.update_camera(&gpu.queue, &self.camera, &state.pose);
        render_state.scene.update_particles(&gpu.queue, &state.particles);
        render_state.screen_playing = state.kiosk.state().is_playing();

        let show_video = state.gate.is_open() && state.near_kiosk();
        if show_video != self.video_visible {
            let display = if show_video { "block" } else { "none" };
            if let Err(e) = state.kiosk.media().element().style().set_property("display", display) {
                tracing::warn!("could not toggle kiosk video: {e:?}");
            }
            self.video_visible = show_video;
        }

        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(now / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(viewport.x, viewport.y)));
        raw_input.events.extend(self.egui_events.borrow_mut().drain(..));
        self.egui_ctx.set_pixels_per_point(dpr);

        let (full_output, actions) = {
            let input = self.input.borrow();
            ui::build_ui(&self.egui_ctx, raw_input, &*state, &input.touch)
        };
        for action in actions {
            state.apply(action);
        }
        drop(state);

        render_state.set_ui(&self.egui_ctx, full_output, dpr);
    }

    /// Keep canvas, surface, camera and joystick layout in step with the
    /// window. Returns the viewport in CSS pixels and the device pixel ratio.
    fn handle_resize(&mut self, window: &Window, gpu: &mut GpuContext, render_state: &mut RenderState) -> (Vec2, f32) {
        let dpr = window.device_pixel_ratio() as f32;
        let css_w = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0) as f32;
        let css_h = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0) as f32;
        let viewport = Vec2::new(css_w, css_h);

        let nw = (css_w * dpr).round() as u32;
        let nh = (css_h * dpr).round() as u32;
        if render_state.resize(gpu, nw, nh) {
            self.canvas.set_width(nw);
            self.canvas.set_height(nh);
            self.camera.set_aspect(nw, nh);
            self.input.borrow_mut().touch.layout(viewport);
        }

        (viewport, dpr)
    }
}
