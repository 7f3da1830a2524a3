pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, HtmlVideoElement, KeyboardEvent, PointerEvent, Window};

    use crate::config::HallConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_move_to_input};
    use crate::controller::{
        ControlScheme, ExhibitState, FrameLoopContext, InputCapture, InputEvent, InputProcessor, TouchControls,
        VideoElementMedia,
    };
    use crate::logging;
    use crate::model::Camera;
    use crate::view::{GpuContext, RenderState};

    type Shared<T> = Rc<RefCell<T>>;

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();

        let config = HallConfig::load_default().map_err(|e| js_error(format!("hall layout: {e}")))?;
        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| js_error("no document on window"))?;
        let (css_w, css_h) = viewport_size(&window);
        let dpr = window.device_pixel_ratio() as f32;

        let canvas = init_canvas(&document, (css_w * dpr) as u32, (css_h * dpr) as u32)?;
        let video = init_video(&document, &config.kiosk.video_src)?;

        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let scheme = ControlScheme::detect(&user_agent, css_w, config.ui.mobile_breakpoint);
        tracing::info!(?scheme, css_w, css_h, dpr, "starting exhibit hall");

        let state = Rc::new(RefCell::new(ExhibitState::new(config, VideoElementMedia::new(video.clone()), scheme)));
        state.borrow_mut().gate.report_progress(30.0);

        setup_app(window, document, canvas, video, state, Vec2::new(css_w, css_h)).await
    }

    async fn setup_app(
        window: Window,
        document: Document,
        canvas: HtmlCanvasElement,
        video: HtmlVideoElement,
        state: Shared<ExhibitState<VideoElementMedia>>,
        viewport: Vec2,
    ) -> Result<(), JsValue> {
        let mut gpu = GpuContext::new(&canvas, canvas.width(), canvas.height())
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;
        state.borrow_mut().gate.report_progress(70.0);

        let mut render_state = {
            let s = state.borrow();
            RenderState::new(&gpu, &s.config, &s.particles)
        };
        state.borrow_mut().gate.report_progress(100.0);

        let input = Rc::new(RefCell::new(InputCapture::new()));
        input.borrow_mut().touch = TouchControls::new(viewport);
        let egui_ctx = egui::Context::default();
        let egui_events: Shared<Vec<egui::Event>> = Rc::new(RefCell::new(Vec::new()));

        setup_input_listeners(&document, &window, &canvas, &video, &state, &input, &egui_ctx, &egui_events)?;

        let mut frame_ctx = FrameLoopContext {
            state,
            input,
            processor: InputProcessor::default(),
            camera: Camera::new(gpu.config.width, gpu.config.height),
            canvas,
            video_visible: false,
            egui_ctx,
            egui_events,
            last_time: window.performance().map(|p| p.now()).unwrap_or(0.0),
        };

        let f = RcCellCallback::new(window.clone(), {
            let window_for_loop = window.clone();
            move || {
                frame_ctx.update(&window_for_loop, &mut gpu, &mut render_state);
                if let Err(e) = render_state.draw_frame(&gpu) {
                    tracing::warn!("frame dropped: {e}");
                }
            }
        });
        f.start()
    }

    #[allow(clippy::too_many_arguments)]
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        video: &HtmlVideoElement,
        state: &Shared<ExhibitState<VideoElementMedia>>,
        input: &Shared<InputCapture>,
        egui_ctx: &egui::Context,
        egui_events: &Shared<Vec<egui::Event>>,
    ) -> Result<(), JsValue> {
        let processor = InputProcessor::default();
        let scheme = state.borrow().scheme;

        // Keyboard down
        {
            let input = input.clone();
            let document_for_exit = document.clone();
            let processor = processor.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let key = e.key();
                if processor.is_escape(&key) {
                    document_for_exit.exit_pointer_lock();
                }
                if processor.is_navigation_key(&key) {
                    e.prevent_default();
                }
                input.borrow_mut().process_event(&keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let input = input.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                input.borrow_mut().process_event(&keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - clear keys and sticks
        {
            let input = input.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input.borrow_mut().process_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change
        {
            let input = input.clone();
            let doc_vis = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                let visible = !doc_vis.hidden();
                input.borrow_mut().process_event(&InputEvent::VisibilityChanged { visible });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        // Pointer lock change
        {
            let input = input.clone();
            let doc_pl = document.clone();
            let plc = Closure::wrap(Box::new(move |_e: Event| {
                let locked = doc_pl.pointer_lock_element().is_some();
                tracing::debug!(locked, "pointer lock changed");
                input.borrow_mut().process_event(&InputEvent::PointerLockChanged { locked });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
            plc.forget();
        }

        // Pointer down: joysticks first, then egui, then pointer lock
        {
            let input = input.clone();
            let state = state.clone();
            let egui_ctx = egui_ctx.clone();
            let egui_events = egui_events.clone();
            let canvas_lock = canvas.clone();
            let down = Closure::wrap(Box::new(move |e: PointerEvent| {
                let pos = Vec2::new(e.client_x() as f32, e.client_y() as f32);
                let entered = state.borrow().gate.is_open();
                let mut input = input.borrow_mut();

                if scheme == ControlScheme::Touch && entered && input.touch.press(e.pointer_id(), pos) {
                    e.prevent_default();
                    return;
                }

                push_pointer_button(&egui_events, pos, true);

                let over_ui = egui_ctx.wants_pointer_input() || egui_ctx.is_pointer_over_area();
                if scheme == ControlScheme::Desktop && entered && !input.pointer_locked && !over_ui {
                    canvas_lock.request_pointer_lock();
                }
            }) as Box<dyn FnMut(PointerEvent)>);
            canvas.add_event_listener_with_callback("pointerdown", down.as_ref().unchecked_ref())?;
            down.forget();
        }

        // Pointer move: mouse look while locked, stick drag, or egui hover
        {
            let input = input.clone();
            let egui_events = egui_events.clone();
            let mv = Closure::wrap(Box::new(move |e: PointerEvent| {
                let mut input = input.borrow_mut();
                if input.pointer_locked {
                    input.process_event(&mouse_move_to_input(&e));
                    return;
                }
                let pos = Vec2::new(e.client_x() as f32, e.client_y() as f32);
                if input.touch.drag(e.pointer_id(), pos) {
                    e.prevent_default();
                    return;
                }
                egui_events.borrow_mut().push(egui::Event::PointerMoved(egui::pos2(pos.x, pos.y)));
            }) as Box<dyn FnMut(PointerEvent)>);
            document.add_event_listener_with_callback("pointermove", mv.as_ref().unchecked_ref())?;
            mv.forget();
        }

        // Pointer up / cancel: re-centre the stick that owned the pointer
        for (name, pressed_release) in [("pointerup", true), ("pointercancel", false)] {
            let input = input.clone();
            let egui_events = egui_events.clone();
            let up = Closure::wrap(Box::new(move |e: PointerEvent| {
                if input.borrow_mut().touch.release(e.pointer_id()) {
                    return;
                }
                if pressed_release {
                    let pos = Vec2::new(e.client_x() as f32, e.client_y() as f32);
                    push_pointer_button(&egui_events, pos, false);
                } else {
                    egui_events.borrow_mut().push(egui::Event::PointerGone);
                }
            }) as Box<dyn FnMut(PointerEvent)>);
            document.add_event_listener_with_callback(name, up.as_ref().unchecked_ref())?;
            up.forget();
        }

        // Context menu prevention
        {
            let contextmenu = Closure::wrap(Box::new(move |e: Event| {
                e.prevent_default();
            }) as Box<dyn FnMut(Event)>);
            canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
            contextmenu.forget();
        }

        // Video problems are logged; the hall works without the clip
        {
            let video_err = video.clone();
            let error = Closure::wrap(Box::new(move |_e: Event| {
                let code = video_err.error().map(|err| err.code());
                tracing::warn!(?code, src = %video_err.src(), "kiosk video failed to load");
            }) as Box<dyn FnMut(Event)>);
            video.add_event_listener_with_callback("error", error.as_ref().unchecked_ref())?;
            error.forget();
        }

        Ok(())
    }

    fn push_pointer_button(events: &Shared<Vec<egui::Event>>, pos: Vec2, pressed: bool) {
        let pos = egui::pos2(pos.x, pos.y);
        let mut events = events.borrow_mut();
        events.push(egui::Event::PointerMoved(pos));
        events.push(egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        });
    }

    fn viewport_size(window: &Window) -> (f32, f32) {
        let w = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0);
        let h = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0);
        (w as f32, h as f32)
    }

    fn init_canvas(document: &Document, width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
        let body = document.body().ok_or_else(|| js_error("no body on document"))?;
        body.style().set_property("margin", "0")?;
        body.style().set_property("overflow", "hidden")?;
        body.style().set_property("background", "#000")?;

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));
        let style = canvas.style();
        style.set_property("display", "block")?;
        style.set_property("width", "100vw")?;
        style.set_property("height", "100vh")?;
        style.set_property("touch-action", "none")?;
        body.append_child(&canvas)?;
        Ok(canvas)
    }

    /// The kiosk's video, shown as an overlay while the visitor stands at it.
    fn init_video(document: &Document, src: &str) -> Result<HtmlVideoElement, JsValue> {
        let body = document.body().ok_or_else(|| js_error("no body on document"))?;
        let video = document
            .create_element("video")?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| js_error("failed to create video element"))?;
        video.set_src(src);
        video.set_preload("auto");
        video.set_attribute("playsinline", "")?;
        let style = video.style();
        style.set_property("display", "none")?;
        style.set_property("position", "fixed")?;
        style.set_property("top", "16px")?;
        style.set_property("right", "16px")?;
        style.set_property("width", "min(40vw, 480px)")?;
        style.set_property("border", "1px solid #f00")?;
        style.set_property("pointer-events", "none")?;
        body.append_child(&video)?;
        Ok(video)
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// requestAnimationFrame loop that keeps rescheduling itself.
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self { inner: Rc::new(RefCell::new(Box::new(f))), window }
        }

        fn start(self) -> Result<(), JsValue> {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            }

            // the loop lives for the rest of the page
            std::mem::forget(callback);
            Ok(())
        }
    }
}
