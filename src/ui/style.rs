use egui::{Color32, FontId, Stroke};

/// Two-stop color gradient.
///
/// egui's painter has no gradient primitive, so fills blend the stops and
/// strokes keep the darker end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub start: Color32,
    pub end: Color32,
}

impl Gradient {
    pub fn new(start: Color32, end: Color32) -> Self {
        Self { start, end }
    }

    /// Midpoint blend of the two stops, used as the flat fill color.
    pub fn fill(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(
            ((self.start.r() as u16 + self.end.r() as u16) / 2) as u8,
            ((self.start.g() as u16 + self.end.g() as u16) / 2) as u8,
            ((self.start.b() as u16 + self.end.b() as u16) / 2) as u8,
            ((self.start.a() as u16 + self.end.a() as u16) / 2) as u8,
        )
    }
}

/// Style for single-event pin markers
#[derive(Debug, Clone)]
pub struct PinStyle {
    /// Body gradient
    pub gradient: Gradient,
    /// Border color
    pub border_color: Color32,
    /// Border width
    pub border_width: f32,
    /// Glyph color inside the pin head
    pub glyph_color: Color32,
    /// Drop shadow color under the pin
    pub shadow_color: Color32,
}

/// Style for cluster disc markers
#[derive(Debug, Clone)]
pub struct ClusterStyle {
    /// Disc gradient
    pub gradient: Gradient,
    /// Border color
    pub border_color: Color32,
    /// Border width
    pub border_width: f32,
    /// Count label color
    pub label_color: Color32,
    /// Count label font
    pub label_font: FontId,
    /// Drop shadow color under the disc
    pub shadow_color: Color32,
}

/// Style and sizing constraints for the info popup panel
#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_stroke: Stroke,
    pub rounding: f32,
    pub padding: f32,
    pub font_id: FontId,
    pub text_color: Color32,
    pub min_width: f32,
    pub max_width: f32,
    pub max_height: f32,
    /// Gap between the popup bottom edge and its anchor point
    pub anchor_gap: f32,
}

/// Combined style for a marker overlay
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub pin: PinStyle,
    pub cluster: ClusterStyle,
    pub popup: PopupStyle,
}

impl Default for PinStyle {
    fn default() -> Self {
        Self {
            gradient: Gradient::new(
                Color32::from_rgb(59, 130, 246),
                Color32::from_rgb(37, 99, 235),
            ),
            border_color: Color32::WHITE,
            border_width: 3.0,
            glyph_color: Color32::WHITE,
            shadow_color: Color32::from_black_alpha(80),
        }
    }
}

impl Default for ClusterStyle {
    fn default() -> Self {
        Self {
            gradient: Gradient::new(
                Color32::from_rgb(16, 185, 129),
                Color32::from_rgb(5, 150, 105),
            ),
            border_color: Color32::WHITE,
            border_width: 3.0,
            label_color: Color32::WHITE,
            label_font: FontId::proportional(16.0),
            shadow_color: Color32::from_black_alpha(80),
        }
    }
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_stroke: Stroke::new(1.0, Color32::GRAY),
            rounding: 6.0,
            padding: 10.0,
            font_id: FontId::proportional(13.0),
            text_color: Color32::BLACK,
            min_width: 280.0,
            max_width: 500.0,
            max_height: 320.0,
            anchor_gap: 6.0,
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            pin: PinStyle::default(),
            cluster: ClusterStyle::default(),
            popup: PopupStyle::default(),
        }
    }
}

/// Predefined overlay themes
pub struct OverlayThemes;

impl OverlayThemes {
    /// Light theme (default)
    pub fn light() -> OverlayStyle {
        OverlayStyle::default()
    }

    /// Dark theme for night mode
    pub fn dark() -> OverlayStyle {
        OverlayStyle {
            pin: PinStyle {
                border_color: Color32::from_rgb(200, 200, 200),
                ..PinStyle::default()
            },
            cluster: ClusterStyle {
                border_color: Color32::from_rgb(200, 200, 200),
                ..ClusterStyle::default()
            },
            popup: PopupStyle {
                background_color: Color32::from_rgb(40, 40, 40),
                border_stroke: Stroke::new(1.0, Color32::from_rgb(80, 80, 80)),
                text_color: Color32::WHITE,
                ..PopupStyle::default()
            },
        }
    }
}
