//! Modal windows (focused photo viewer, settings)

use super::App;
use crate::theme;
use crate::types::MissPolicy;
use eframe::egui;
use tracing::{info, warn};

impl App {
    pub(crate) fn render_viewer(&mut self, ctx: &egui::Context) {
        if !self.view.is_open() {
            return;
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                self.view.close();
            } else if i.key_pressed(egui::Key::ArrowLeft) {
                self.view.prev();
            } else if i.key_pressed(egui::Key::ArrowRight) {
                self.view.next();
            }
        });

        let Some(current) = self.view.current().cloned() else {
            return;
        };
        let position = self.view.focused_index().unwrap_or(0) + 1;
        let total = self.view.filtered_len();

        // Silent preload of the next photo
        if let Some(next) = self.view.peek_next().cloned() {
            self.load_texture(ctx, &next);
        }
        let texture = self.load_texture(ctx, &current);
        let url = self.photo_url(&current);

        // Dim backdrop behind viewer - click outside closes
        let screen = ctx.screen_rect();
        let backdrop = egui::Area::new(egui::Id::new("viewer_dim"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .interactable(true)
            .show(ctx, |ui| {
                let resp = ui.allocate_response(screen.size(), egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, egui::Color32::from_black_alpha(180));
                resp
            })
            .inner;

        let mut close = backdrop.clicked();
        let mut step: i8 = 0;

        let img_h = theme::VIEWER_IMG_HEIGHT.min(screen.height() - 140.0).max(120.0);
        let img_w = img_h * theme::VIEWER_ASPECT_RATIO;

        egui::Window::new("photo_viewer")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .frame(theme::modal_frame())
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(current.category.label())
                            .size(theme::FONT_HEADING)
                            .strong()
                            .color(theme::category_color(current.category)),
                    );
                    ui.label(
                        egui::RichText::new(format!("{} / {}", position, total))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(theme::button(egui_phosphor::regular::X)).clicked() {
                            close = true;
                        }
                        if let Some(url) = &url {
                            if ui
                                .add(theme::button(egui_phosphor::regular::ARROW_SQUARE_OUT))
                                .on_hover_text("Open in browser")
                                .clicked()
                            {
                                if let Err(e) = open::that(url) {
                                    warn!(url = %url, error = %e, "Failed to open browser");
                                }
                            }
                        }
                    });
                });

                ui.add_space(theme::SPACING_MD);

                ui.horizontal(|ui| {
                    let nav_enabled = total > 1;
                    if ui
                        .add_enabled(nav_enabled, theme::button(egui_phosphor::regular::CARET_LEFT))
                        .on_hover_text("Previous photo")
                        .clicked()
                    {
                        step = -1;
                    }

                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(img_w, img_h), egui::Sense::hover());
                    match &texture {
                        Some(tex) => {
                            // Letterbox inside the fixed viewer area
                            let size = tex.size_vec2();
                            let scale = (rect.width() / size.x).min(rect.height() / size.y);
                            let fitted = egui::Rect::from_center_size(rect.center(), size * scale);
                            egui::Image::from_texture(tex).paint_at(ui, fitted);
                        }
                        None => {
                            ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
                            ui.put(rect, egui::Spinner::new().size(32.0));
                        }
                    }

                    if ui
                        .add_enabled(nav_enabled, theme::button(egui_phosphor::regular::CARET_RIGHT))
                        .on_hover_text("Next photo")
                        .clicked()
                    {
                        step = 1;
                    }
                });

                ui.add_space(theme::SPACING_SM);
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(current.alt_text())
                            .size(theme::FONT_LABEL)
                            .color(theme::TEXT_MUTED),
                    );
                });
            });

        match step {
            -1 => self.view.prev(),
            1 => self.view.next(),
            _ => {}
        }
        if close {
            self.view.close();
        }
    }

    pub(crate) fn render_settings(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut apply = false;
        let mut cancel = false;
        let draft = &mut self.settings_draft;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .frame(theme::modal_frame())
            .anchor(egui::Align2::RIGHT_TOP, [-theme::SPACING_XL, theme::HEADER_HEIGHT])
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([theme::SPACING_LG, theme::SPACING_MD])
                    .show(ui, |ui| {
                        ui.label("Host");
                        ui.add(egui::TextEdit::singleline(&mut draft.host).desired_width(260.0))
                            .on_hover_text("Website URL, or a local folder holding the site files");
                        ui.end_row();

                        ui.label("Gallery folder");
                        ui.add(egui::TextEdit::singleline(&mut draft.gallery_root).desired_width(260.0));
                        ui.end_row();

                        ui.label("Max per group");
                        ui.add(egui::DragValue::new(&mut draft.max_per_category).range(1..=500));
                        ui.end_row();

                        ui.label("Stop after misses");
                        ui.add(egui::DragValue::new(&mut draft.miss_streak_limit).range(1..=50));
                        ui.end_row();

                        ui.label("Request timeout (s)");
                        ui.add(egui::DragValue::new(&mut draft.probe_timeout_secs).range(1..=120));
                        ui.end_row();

                        ui.label("Failed checks");
                        ui.vertical(|ui| {
                            ui.radio_value(
                                &mut draft.miss_policy,
                                MissPolicy::CountErrorsAsMisses,
                                "Count as missing",
                            );
                            ui.radio_value(&mut draft.miss_policy, MissPolicy::IgnoreErrors, "Ignore");
                        });
                        ui.end_row();

                        ui.label("Manifest");
                        ui.checkbox(&mut draft.use_manifest, "Use manifest.json when available");
                        ui.end_row();
                    });

                ui.add_space(theme::SPACING_LG);
                ui.horizontal(|ui| {
                    if ui.add(theme::button_accent("Apply & reload")).clicked() {
                        apply = true;
                    }
                    if ui.add(theme::button("Cancel")).clicked() {
                        cancel = true;
                    }
                });
            });

        if apply {
            // Keep geometry and filter; everything else comes from the draft
            let mut next = self.settings_draft.clone();
            next.window_x = self.settings.window_x;
            next.window_y = self.settings.window_y;
            next.window_w = self.settings.window_w;
            next.window_h = self.settings.window_h;
            next.last_filter = self.view.filter();
            self.settings = next;
            self.show_settings = false;
            info!(host = %self.settings.host, "Settings applied");
            self.save_settings();
            self.refresh(ctx);
        } else if cancel {
            self.show_settings = false;
        }
    }
}
