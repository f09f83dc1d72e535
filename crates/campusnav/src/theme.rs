use eframe::egui::Color32;

use crate::output::LineKind;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub panel: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub muted: Color32,
    pub error: Color32,
    pub popup_background: Color32,
    pub popup_foreground: Color32,
    pub place_marker: Color32,
    pub start_marker: Color32,
    pub end_marker: Color32,
    pub heading_size: f32,
    pub body_size: f32,
    pub small_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            panel: Color32::from_rgb(0x25, 0x25, 0x2B),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x8A, 0x9B, 0xF0),
            muted: Color32::from_rgb(0x8C, 0x8C, 0x8C),
            error: Color32::from_rgb(0xFF, 0x7E, 0x67),
            popup_background: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            popup_foreground: Color32::from_rgb(0xD4, 0xD4, 0xD4),
            place_marker: Color32::from_rgb(0x5C, 0xB8, 0xFF),
            start_marker: Color32::from_rgb(0x5C, 0xDB, 0x95),
            end_marker: Color32::from_rgb(0xFF, 0x7E, 0x67),
            heading_size: 18.0,
            body_size: 14.0,
            small_size: 11.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF2, 0xEF, 0xE9),
            panel: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x66, 0x7E, 0xEA),
            muted: Color32::from_rgb(0x66, 0x66, 0x66),
            error: Color32::from_rgb(0xC7, 0x3E, 0x1D),
            popup_background: Color32::WHITE,
            popup_foreground: Color32::from_rgb(0x33, 0x33, 0x33),
            place_marker: Color32::from_rgb(0x1A, 0x6B, 0xB5),
            start_marker: Color32::from_rgb(0x1E, 0x8A, 0x5A),
            end_marker: Color32::from_rgb(0xC7, 0x3E, 0x1D),
            heading_size: 18.0,
            body_size: 14.0,
            small_size: 11.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Color of an output line.
    pub fn line_color(&self, kind: LineKind) -> Color32 {
        match kind {
            LineKind::Heading => self.heading_color,
            LineKind::Figure => self.accent,
            LineKind::Note | LineKind::Progress => self.muted,
            LineKind::Error => self.error,
            LineKind::Body | LineKind::Item => self.foreground,
        }
    }

    pub fn line_size(&self, kind: LineKind) -> f32 {
        match kind {
            LineKind::Heading => self.heading_size,
            LineKind::Note => self.small_size,
            _ => self.body_size,
        }
    }
}
