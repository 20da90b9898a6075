//! Reusable UI components
//!
//! Standalone widgets shared by the gallery grid, header and viewer.

use crate::theme;
use crate::types::CategoryFilter;
use eframe::egui;

/// Segmented filter tab. Returns the click response.
pub fn filter_tab(ui: &mut egui::Ui, filter: CategoryFilter, selected: bool) -> egui::Response {
    let text = egui::RichText::new(filter.label())
        .size(theme::FONT_LABEL)
        .color(if selected {
            theme::TEXT_PRIMARY
        } else {
            theme::TEXT_MUTED
        });
    let fill = if selected {
        theme::TOGGLE_SELECTED
    } else {
        theme::TOGGLE_UNSELECTED
    };
    ui.add(
        egui::Button::new(text)
            .fill(fill)
            .corner_radius(theme::RADIUS_LARGE)
            .min_size(egui::vec2(0.0, theme::TAB_HEIGHT)),
    )
}

/// Centered muted note for loading and empty states
pub fn centered_note(ui: &mut egui::Ui, icon: &str, text: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.label(egui::RichText::new(icon).size(36.0).color(theme::TEXT_DIM));
        ui.add_space(theme::SPACING_MD);
        ui.label(
            egui::RichText::new(text)
                .size(theme::FONT_BODY)
                .color(theme::TEXT_MUTED),
        );
    });
}

/// Paint a polaroid card: paper, photo area, caption.
/// `photo` is painted rotated by `rotation_deg` when present.
pub fn paint_polaroid(
    ui: &egui::Ui,
    rect: egui::Rect,
    photo: Option<&egui::TextureHandle>,
    rotation_deg: f32,
    caption: &str,
    caption_color: egui::Color32,
    hovered: bool,
) {
    let painter = ui.painter();
    painter.rect_filled(rect, theme::RADIUS_SMALL, theme::POLAROID_PAPER);
    if hovered {
        painter.rect_stroke(
            rect,
            theme::RADIUS_SMALL,
            egui::Stroke::new(2.0, theme::ACCENT),
            egui::StrokeKind::Outside,
        );
    }

    let photo_rect = egui::Rect::from_min_max(
        rect.min + egui::vec2(theme::CARD_PADDING, theme::CARD_PADDING),
        egui::pos2(
            rect.max.x - theme::CARD_PADDING,
            rect.max.y - theme::CARD_CAPTION_HEIGHT,
        ),
    );

    match photo {
        Some(tex) => {
            egui::Image::from_texture(tex)
                .rotate(rotation_deg.to_radians(), egui::Vec2::splat(0.5))
                .paint_at(ui, photo_rect);
        }
        None => {
            painter.rect_filled(photo_rect, 0.0, theme::PHOTO_PLACEHOLDER);
            painter.text(
                photo_rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::IMAGE,
                egui::FontId::proportional(28.0),
                theme::TEXT_DIM,
            );
        }
    }

    let caption_pos = egui::pos2(
        rect.center().x,
        rect.max.y - theme::CARD_CAPTION_HEIGHT / 2.0,
    );
    painter.text(
        caption_pos,
        egui::Align2::CENTER_CENTER,
        caption,
        egui::FontId::proportional(theme::FONT_LABEL),
        theme::POLAROID_CAPTION,
    );
    // Category marker
    painter.circle_filled(
        egui::pos2(rect.min.x + theme::CARD_PADDING + 4.0, caption_pos.y),
        4.0,
        caption_color,
    );
}
