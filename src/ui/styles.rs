use {
    crate::{
        analysis::{Rgba, hex_to_rgba},
        config::plot::{PLOT_CONFIG, ThemeColors},
        models::Theme,
        ui::UI_CONFIG,
    },
    eframe::egui::{
        Color32, CornerRadius, FontId, Response, RichText, Sense, Stroke, StrokeKind, Ui, Vec2,
        WidgetInfo, WidgetType,
    },
};

pub(crate) fn colored_subsection_heading(text: impl Into<String>) -> RichText {
    RichText::new(text.into()).color(UI_CONFIG.colors.subsection_heading)
}

pub fn rgba_to_color32(c: Rgba) -> Color32 {
    let alpha = if c.a.is_finite() { c.a.clamp(0.0, 1.0) } else { 1.0 };
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (alpha * 255.0).round() as u8)
}

pub fn hex_to_color32(hex: &str) -> Color32 {
    rgba_to_color32(hex_to_rgba(hex, 1.0))
}

/// `#RRGGBB`, alpha dropped. Used to write color-picker edits back into preferences.
pub fn color32_to_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

pub fn theme_colors(theme: Theme) -> &'static ThemeColors {
    match theme {
        Theme::Dark => &PLOT_CONFIG.dark,
        Theme::Light => &PLOT_CONFIG.light,
    }
}

/// Color for a free-text directional bias ("Alcista", "bajista moderado", "bullish", ...).
pub fn bias_color(bias: &str) -> Color32 {
    let bias = bias.to_lowercase();
    if bias.contains("alcista") || bias.contains("bull") || bias.contains("long") {
        PLOT_CONFIG.color_long
    } else if bias.contains("bajista") || bias.contains("bear") || bias.contains("short") {
        PLOT_CONFIG.color_short
    } else {
        PLOT_CONFIG.color_text_subdued
    }
}

pub(crate) trait UiStyleExt {
    /// Interactive label acting as button: transparent when idle, gray bg on hover, blue bg when selected.
    fn interactive_label(&mut self, text: &str, is_selected: bool, idle_color: Color32, font_id: FontId) -> Response;

    fn label_subdued(&mut self, text: impl Into<String>);
    fn metric(&mut self, label: &str, value: &str, color: Color32);
    fn label_subheader(&mut self, text: impl Into<String>);
}

impl UiStyleExt for Ui {
    fn interactive_label(&mut self, text: &str, is_selected: bool, idle_color: Color32, font_id: FontId) -> Response {
        let padding = Vec2::new(4.0, 4.0);
        let galley = self.painter().layout_no_wrap(text.to_string(), font_id, idle_color);
        let desired_size = galley.size() + padding * 2.0;
        let (rect, response) = self.allocate_exact_size(desired_size, Sense::click());
        response.widget_info(|| WidgetInfo::selected(WidgetType::Button, true, is_selected, text));

        if self.is_rect_visible(rect) {
            let visuals = self.style().visuals.clone();
            let (bg_fill, text_color) = if is_selected {
                (visuals.selection.bg_fill, Color32::WHITE)
            } else if response.hovered() || response.has_focus() {
                (visuals.widgets.hovered.bg_fill, Color32::YELLOW)
            } else {
                (Color32::TRANSPARENT, idle_color)
            };

            if is_selected || response.hovered() {
                self.painter()
                    .rect(rect, CornerRadius::same(4), bg_fill, Stroke::NONE, StrokeKind::Inside);
            }
            let text_pos = rect.left_top() + padding;
            self.painter().galley(text_pos, galley, text_color);
        }
        response
    }

    fn label_subdued(&mut self, text: impl Into<String>) {
        self.label(RichText::new(text).small().color(Color32::GRAY));
    }

    fn metric(&mut self, label: &str, value: &str, color: Color32) {
        self.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0; // Tight spacing
            ui.label_subdued(format!("{}:", label));
            ui.label(RichText::new(value).small().color(color));
        });
    }

    fn label_subheader(&mut self, text: impl Into<String>) {
        self.label(colored_subsection_heading(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_alpha_maps_to_byte() {
        let c = rgba_to_color32(Rgba { r: 255, g: 0, b: 0, a: 0.5 });
        assert_eq!(c.a(), 128);
        assert_eq!(rgba_to_color32(Rgba { r: 1, g: 2, b: 3, a: f64::NAN }).a(), 255);
        assert_eq!(rgba_to_color32(Rgba { r: 1, g: 2, b: 3, a: 4.0 }).a(), 255);
    }

    #[test]
    fn hex_round_trip_for_opaque_colors() {
        assert_eq!(color32_to_hex(hex_to_color32("#243EA8")), "#243EA8");
        assert_eq!(color32_to_hex(hex_to_color32("18191b")), "#18191B");
    }

    #[test]
    fn bias_words_pick_direction() {
        assert_eq!(bias_color("Alcista moderado"), PLOT_CONFIG.color_long);
        assert_eq!(bias_color("BAJISTA"), PLOT_CONFIG.color_short);
        assert_eq!(bias_color("Neutral / rango"), PLOT_CONFIG.color_text_subdued);
    }
}
