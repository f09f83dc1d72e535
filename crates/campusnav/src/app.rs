use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::api::client::HttpBackend;
use crate::api::dispatch::Dispatcher;
use crate::catalog::SelectWidget;
use crate::config::Config;
use crate::geo::LatLng;
use crate::map::MarkerRef;
use crate::render;
use crate::theme::Theme;
use crate::workspace::CampusMap;

const TITLE: &str = "Campus Navigation";
const SIDE_PANEL_WIDTH: f32 = 300.0;
/// Second Escape within this window exits.
const EXIT_CONFIRM: Duration = Duration::from_secs(1);
const TOAST_DURATION: f32 = 1.5;
const TOAST_FADE_START: f32 = 1.0;

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_DURATION - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EscapeAction {
    ClosePopup,
    ConfirmExit,
    Exit,
}

/// An open line popup takes the first Escape. Otherwise exiting needs a
/// second press within [`EXIT_CONFIRM`].
fn escape_action(popup_open: bool, last_escape: Option<Instant>, now: Instant) -> EscapeAction {
    if popup_open {
        return EscapeAction::ClosePopup;
    }
    match last_escape {
        Some(last) if now.saturating_duration_since(last) < EXIT_CONFIRM => EscapeAction::Exit,
        _ => EscapeAction::ConfirmExit,
    }
}

struct CampusApp {
    workspace: CampusMap,
    dispatcher: Dispatcher,
    theme: Theme,
    toast: Option<Toast>,
    last_escape: Option<Instant>,
    /// Marker the pointer was over last frame.
    hovered: Option<MarkerRef>,
    /// Open popup of a clicked route or tree line.
    line_popup: Option<(LatLng, String)>,
}

impl CampusApp {
    fn new(ctx: &egui::Context, config: &Config, base_url: &str) -> Self {
        let backend = Arc::new(HttpBackend::new(base_url));
        tracing::info!("using server {}", backend.base_url());
        let mut dispatcher = Dispatcher::new(backend).with_repaint(ctx.clone());
        let mut workspace = CampusMap::new(config.map_settings());
        workspace.start(&mut dispatcher);

        let theme = Theme::from_name(config.theme());
        apply_visuals(ctx, &theme);

        Self {
            workspace,
            dispatcher,
            theme,
            toast: None,
            last_escape: None,
            hovered: None,
            line_popup: None,
        }
    }

    fn apply_completions(&mut self) {
        for completion in self.dispatcher.drain() {
            self.workspace.handle(completion);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (toggle_theme, escape, quit) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::T) && i.modifiers.command,
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Q) && i.modifiers.command,
            )
        });
        if toggle_theme {
            self.theme = self.theme.toggled();
            apply_visuals(ctx, &self.theme);
        }
        if escape {
            let now = Instant::now();
            match escape_action(self.line_popup.is_some(), self.last_escape, now) {
                EscapeAction::ClosePopup => {
                    self.line_popup = None;
                    self.last_escape = None;
                }
                EscapeAction::ConfirmExit => {
                    self.last_escape = Some(now);
                    self.toast = Some(Toast::new("Press Esc again to exit"));
                }
                EscapeAction::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            }
        }
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.label(
            egui::RichText::new(TITLE)
                .size(self.theme.heading_size)
                .strong()
                .color(self.theme.heading_color),
        );
        ui.add_space(12.0);

        let width = ui.available_width();
        ui.label("From");
        building_select(ui, "source", &mut self.workspace.catalog.source, width, &self.theme);
        ui.add_space(6.0);
        ui.label("To");
        building_select(
            ui,
            "destination",
            &mut self.workspace.catalog.destination,
            width,
            &self.theme,
        );
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui.button("Find Path").clicked() {
                self.line_popup = None;
                // A rejection is already shown in the output region.
                let _ = self.workspace.find_path(&mut self.dispatcher);
            }
            if ui.button("Show MST").clicked() {
                self.line_popup = None;
                self.workspace.show_mst(&mut self.dispatcher);
            }
        });

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (kind, text) in self.workspace.output.message().lines() {
                ui.label(
                    egui::RichText::new(text)
                        .size(self.theme.line_size(kind))
                        .color(self.theme.line_color(kind)),
                );
            }
        });
    }

    fn map_panel(&mut self, ui: &mut egui::Ui) {
        let Some(map) = self.workspace.map.map_mut() else {
            ui.centered_and_justified(|ui| ui.label("Loading map..."));
            return;
        };
        let response = render::show(ui, map, &self.theme, self.line_popup.as_ref());

        if response.hovered != self.hovered {
            if let Some(old) = self.hovered.take() {
                self.workspace.leave(old);
            }
            if let Some(new) = response.hovered {
                self.workspace.hover(new, &mut self.dispatcher);
            }
            self.hovered = response.hovered;
        }
        self.draw_toast(ui);
        if let Some(line) = response.clicked_line {
            self.line_popup = Some(line);
        } else if response.clicked_empty {
            self.line_popup = None;
        }
    }

    fn draw_toast(&mut self, ui: &egui::Ui) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let rect = ui.max_rect();
        let color = Theme::with_opacity(self.theme.popup_foreground, opacity * 0.9);
        let bg = Theme::with_opacity(self.theme.popup_background, opacity * 0.9);
        let painter = ui.painter();
        let galley = painter.layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(self.theme.body_size + 4.0),
            color,
        );
        let padding = 14.0;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 80.0,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        painter.rect_filled(toast_rect, 8.0, bg);
        painter.galley(toast_rect.min + egui::vec2(padding, padding), galley, color);
        ui.ctx().request_repaint();
    }
}

/// A combo box with the placeholder first and one header per option group.
fn building_select(
    ui: &mut egui::Ui,
    id: &str,
    widget: &mut SelectWidget,
    width: f32,
    theme: &Theme,
) {
    let shown = if widget.value().is_empty() {
        widget.placeholder().to_string()
    } else {
        widget.value().to_string()
    };
    let mut chosen: Option<String> = None;

    egui::ComboBox::from_id_salt(id)
        .selected_text(shown)
        .width(width)
        .show_ui(ui, |ui| {
            if ui
                .selectable_label(widget.value().is_empty(), widget.placeholder())
                .clicked()
            {
                chosen = Some(String::new());
            }
            for group in widget.groups() {
                if let Some(label) = &group.label {
                    ui.label(egui::RichText::new(label).strong().color(theme.muted));
                }
                for option in &group.options {
                    if ui
                        .selectable_label(widget.value() == option, option)
                        .clicked()
                    {
                        chosen = Some(option.clone());
                    }
                }
            }
        });

    if let Some(value) = chosen {
        widget.select(&value);
    }
}

fn apply_visuals(ctx: &egui::Context, theme: &Theme) {
    let mut visuals = if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.panel_fill = theme.panel;
    visuals.error_fg_color = theme.error;
    ctx.set_visuals(visuals);
}

impl eframe::App for CampusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_completions();
        self.handle_keys(ctx);

        egui::SidePanel::left("controls")
            .resizable(false)
            .exact_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| self.side_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.map_panel(ui));
    }
}

pub fn run(config: Config, base_url: String, windowed: bool) -> anyhow::Result<()> {
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(TITLE)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(TITLE)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(CampusApp::new(&cc.egui_ctx, &config, &base_url)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
