//! View rendering (header, filter tabs, polaroid grid)

use super::App;
use crate::theme;
use crate::types::*;
use crate::ui::components::{centered_note, filter_tab, paint_polaroid};
use crate::utils::format_count;
use eframe::egui;

impl App {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut refresh = false;

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Gallery")
                    .size(theme::FONT_DISPLAY)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(theme::button(egui_phosphor::regular::GEAR))
                    .on_hover_text("Settings")
                    .clicked()
                {
                    self.settings_draft = self.settings.clone();
                    self.show_settings = !self.show_settings;
                }

                let refresh_btn = ui.add_enabled(
                    !self.loading,
                    theme::button(format!("{}  Refresh", egui_phosphor::regular::ARROW_CLOCKWISE)),
                );
                if refresh_btn.clicked() {
                    refresh = true;
                }

                if self.loading {
                    ui.add(egui::Spinner::new());
                }
            });
        });

        ui.add_space(theme::SPACING_MD);

        ui.horizontal(|ui| {
            let active = self.view.filter();
            for filter in CategoryFilter::TABS {
                if filter_tab(ui, filter, filter == active).clicked() {
                    self.set_filter(filter);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(self.status_text());
            });
        });

        if refresh {
            self.refresh(ctx);
        }
    }

    fn status_text(&self) -> egui::RichText {
        if let Some(err) = &self.status_error {
            return egui::RichText::new(format!("{}  {}", egui_phosphor::regular::WARNING, err))
                .size(theme::FONT_SMALL)
                .color(theme::STATUS_ERROR);
        }
        if self.loading {
            return egui::RichText::new("Looking for photos…")
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM);
        }

        let mut parts = vec![format_count(self.view.filtered_len())];
        if let Some(source) = self.source {
            parts.push(format!("via {}", source.label()));
        }
        if let Some(at) = self.last_refreshed {
            parts.push(format!("updated {}", at.format("%H:%M")));
        }
        egui::RichText::new(parts.join("  ·  "))
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_DIM)
    }

    pub(crate) fn render_grid(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.loading && self.view.images().is_empty() {
            centered_note(ui, egui_phosphor::regular::IMAGES, "Loading photos…");
            return;
        }

        if self.view.is_empty_for_filter() {
            centered_note(
                ui,
                egui_phosphor::regular::IMAGES,
                "No photos yet for this group, check back soon!",
            );
            return;
        }

        let (card_w, card_h) = theme::CARD_SIZE;
        // Clone to avoid borrow issues while loading textures
        let images: Vec<ImageDescriptor> = self.view.filtered().into_iter().cloned().collect();
        let mut open_index: Option<usize> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .id_salt("gallery_grid")
            .show(ui, |ui| {
                ui.add_space(theme::SPACING_LG);
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(theme::SPACING_XL, theme::SPACING_XL);
                    for (i, image) in images.iter().enumerate() {
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(card_w, card_h), egui::Sense::click());

                        if ui.is_rect_visible(rect) {
                            let texture = self.load_texture(ctx, image);
                            paint_polaroid(
                                ui,
                                rect,
                                texture.as_ref(),
                                image.display_rotation,
                                image.category.label(),
                                theme::category_color(image.category),
                                response.hovered(),
                            );
                        }

                        if response.clicked() {
                            open_index = Some(i);
                        }
                        response.on_hover_text(image.alt_text());
                    }
                });
            });

        if let Some(i) = open_index {
            self.view.open_at(i);
        }
    }
}
