use eframe::egui::{Color32, CornerRadius, Frame, Margin, Stroke};

pub use crate::ui::ui_text::UI_TEXT;

/// Fixed chrome colors. Chart colors follow the theme and live in the plot config.
#[derive(Clone, Copy, Default)]
pub struct UiColors {
    pub label: Color32,
    pub heading: Color32,
    pub subsection_heading: Color32,
    pub side_panel: Color32,
    pub toolbar: Color32,
    pub user_bubble: Color32,
    pub ai_bubble: Color32,
}

#[derive(Default, Clone, Copy)]
pub struct UiConfig {
    pub colors: UiColors,
    pub side_panel_width: f32,
    pub chat_input_rows: usize,
}

pub static UI_CONFIG: UiConfig = UiConfig {
    colors: UiColors {
        label: Color32::GRAY,
        heading: Color32::YELLOW,
        subsection_heading: Color32::ORANGE,
        side_panel: Color32::from_rgb(25, 25, 25),
        toolbar: Color32::from_rgb(17, 24, 39),
        user_bubble: Color32::from_rgb(30, 58, 138),
        ai_bubble: Color32::from_rgb(38, 38, 42),
    },
    side_panel_width: 360.0,
    chat_input_rows: 2,
};

impl UiConfig {
    fn panel_frame(fill: Color32, margin: Margin) -> Frame {
        Frame::new().fill(fill).stroke(Stroke::NONE).inner_margin(margin)
    }

    /// Analysis/chat column
    pub fn side_panel_frame(&self) -> Frame {
        Self::panel_frame(self.colors.side_panel, Margin::same(8))
    }

    /// Source, symbol and timeframe pickers
    pub fn top_panel_frame(&self) -> Frame {
        Self::panel_frame(self.colors.toolbar, Margin::symmetric(8, 6))
    }

    /// Status bar
    pub fn bottom_panel_frame(&self) -> Frame {
        Self::panel_frame(self.colors.toolbar, Margin::symmetric(8, 4))
    }

    /// Plot area. The fill is the user's pane background.
    pub fn central_panel_frame(&self, fill: Color32) -> Frame {
        // Right margin keeps the price axis labels off the border
        Self::panel_frame(
            fill,
            Margin {
                left: 0,
                right: 8,
                top: 0,
                bottom: 0,
            },
        )
    }

    /// One chat message
    pub fn bubble_frame(&self, fill: Color32) -> Frame {
        Self::panel_frame(fill, Margin::same(6)).corner_radius(CornerRadius::same(6))
    }
}
