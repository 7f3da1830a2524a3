use egui::{Color32, Context, RichText};

use crate::controller::{
    ControlScheme, EntryPhase, ExhibitState, MediaResource, TouchControls, UiAction, VirtualJoystick,
};

const NEON_CYAN: Color32 = Color32::from_rgb(0, 255, 255);
const NEON_RED: Color32 = Color32::from_rgb(255, 40, 40);
const PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 200);

/// Build the overlay for one frame. Button presses come back as actions.
pub fn build_ui<M: MediaResource>(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    state: &ExhibitState<M>,
    touch: &TouchControls,
) -> (egui::FullOutput, Vec<UiAction>) {
    let mut actions = Vec::new();

    let output = egui_ctx.run(raw_input, |ctx| {
        if !state.gate.is_open() {
            draw_welcome(ctx, state, &mut actions);
            return;
        }

        draw_hud(ctx, state);
        if let Some(exhibit) = state.exhibit_in_view() {
            draw_exhibit_label(ctx, &exhibit.name, &exhibit.description);
        }
        if state.near_kiosk() {
            draw_kiosk_panel(ctx, state, &mut actions);
        }
        match state.scheme {
            ControlScheme::Desktop => draw_crosshair(ctx),
            ControlScheme::Touch => draw_joysticks(ctx, touch),
        }
    });

    (output, actions)
}

fn draw_welcome<M: MediaResource>(ctx: &Context, state: &ExhibitState<M>, actions: &mut Vec<UiAction>) {
    let ui_config = &state.config.ui;
    let gate = &state.gate;

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(Color32::BLACK))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.label(RichText::new(&ui_config.title).size(32.0).strong().color(Color32::WHITE));
                ui.label(RichText::new(&ui_config.subtitle).size(18.0).color(NEON_RED));
                ui.add_space(24.0);

                match gate.phase() {
                    EntryPhase::Ready => {
                        let button = egui::Button::new(RichText::new("ENTER SIMULATION").size(20.0).color(NEON_CYAN))
                            .stroke(egui::Stroke::new(1.5, NEON_CYAN))
                            .fill(Color32::TRANSPARENT);
                        if ui.add(button).clicked() {
                            actions.push(UiAction::Enter);
                        }
                    }
                    _ => {
                        ui.label(
                            RichText::new(format!("INITIALIZING SIMULATION... {:.0}%", gate.progress()))
                                .monospace()
                                .color(NEON_CYAN),
                        );
                        ui.add(
                            egui::ProgressBar::new(gate.progress() / 100.0)
                                .desired_width(240.0)
                                .fill(NEON_CYAN),
                        );
                    }
                }

                ui.add_space(16.0);
                ui.label(
                    RichText::new(format!("[ SYSTEM STATUS: {} ]", gate.status_text()))
                        .small()
                        .monospace()
                        .color(Color32::GRAY),
                );
            });
        });
}

fn draw_hud<M: MediaResource>(ctx: &Context, state: &ExhibitState<M>) {
    let hint = match state.scheme {
        ControlScheme::Desktop => "Click to Look Around | WASD to Move | Shift to Run | Esc to release mouse",
        ControlScheme::Touch => "Left Stick to Move | Right Stick to Look",
    };

    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_TOP, [16.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(&state.config.ui.title).size(20.0).strong().color(Color32::WHITE));
            ui.label(RichText::new(&state.config.ui.subtitle).small().color(NEON_RED));
            ui.label(RichText::new(hint).small().color(Color32::LIGHT_GRAY));
        });
}

fn draw_exhibit_label(ctx: &Context, name: &str, description: &str) {
    egui::Area::new(egui::Id::new("exhibit_label"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -140.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(PANEL_FILL)
                .stroke(egui::Stroke::new(1.0, NEON_CYAN))
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(name).size(18.0).strong().color(NEON_CYAN));
                        ui.label(RichText::new(description).small().color(Color32::WHITE));
                    });
                });
        });
}

fn draw_kiosk_panel<M: MediaResource>(ctx: &Context, state: &ExhibitState<M>, actions: &mut Vec<UiAction>) {
    let kiosk = &state.kiosk;
    let skip = state.config.kiosk.skip_seconds;
    let step = state.config.kiosk.volume_step;

    egui::Area::new(egui::Id::new("kiosk_panel"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(PANEL_FILL)
                .stroke(egui::Stroke::new(1.0, NEON_RED))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let play_label = if kiosk.state().is_playing() { "PAUSE" } else { "PLAY" };
                        if ui.button(play_label).clicked() {
                            actions.push(UiAction::TogglePlay);
                        }
                        if ui.button(format!("-{skip:.0}s")).clicked() {
                            actions.push(UiAction::Skip(-skip));
                        }
                        if ui.button(format!("+{skip:.0}s")).clicked() {
                            actions.push(UiAction::Skip(skip));
                        }
                        if ui.button("RESTART").clicked() {
                            actions.push(UiAction::Restart);
                        }
                        ui.separator();
                        if ui.button("VOL -").clicked() {
                            actions.push(UiAction::AdjustVolume(-step));
                        }
                        ui.label(RichText::new(format!("{:.0}%", kiosk.volume() * 100.0)).monospace());
                        if ui.button("VOL +").clicked() {
                            actions.push(UiAction::AdjustVolume(step));
                        }
                    });
                });
        });
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 8.0;
    let stroke = egui::Stroke::new(1.0, Color32::WHITE);
    painter.line_segment([egui::pos2(center.x - size, center.y), egui::pos2(center.x + size, center.y)], stroke);
    painter.line_segment([egui::pos2(center.x, center.y - size), egui::pos2(center.x, center.y + size)], stroke);
}

fn draw_joysticks(ctx: &Context, touch: &TouchControls) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("joysticks")));
    draw_joystick(&painter, &touch.move_stick, "MOVE");
    draw_joystick(&painter, &touch.look_stick, "LOOK");
}

fn draw_joystick(painter: &egui::Painter, stick: &VirtualJoystick, label: &str) {
    use crate::controller::joystick::BASE_RADIUS;

    let c = stick.center();
    let center = egui::pos2(c.x, c.y);
    let knob = stick.knob_offset();
    let alpha = if stick.is_active() { 160 } else { 90 };

    painter.circle(
        center,
        BASE_RADIUS,
        Color32::from_rgba_unmultiplied(255, 255, 255, alpha / 4),
        egui::Stroke::new(2.0, Color32::from_rgba_unmultiplied(0, 255, 255, alpha)),
    );
    painter.circle_filled(
        center + egui::vec2(knob.x, knob.y),
        BASE_RADIUS * 0.4,
        Color32::from_rgba_unmultiplied(0, 255, 255, alpha),
    );
    painter.text(
        center + egui::vec2(0.0, BASE_RADIUS + 12.0),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::monospace(12.0),
        Color32::WHITE,
    );
}
