//! Tldraw style tokens and the derived color/size tables.
//!
//! The v1 and v2 shape formats spell their tokens differently ("small" vs
//! "s", "lightGray" vs "light-gray"-family names); both spellings parse into
//! the same enums and, where the two formats genuinely disagree (font sizes),
//! the token distinction is preserved by giving each spelling its own
//! variant.

use core_geom::{color_blend, Color};

use crate::ShapeDataError;

/// Background color of the tldraw canvas; fills are blended against it.
pub const CANVAS: Color = Color::from_int(0xFAFAFA);

pub const PATTERN_FILL_BACKGROUND_COLOR: Color = Color::from_int(0xFCFFFE);
pub const STICKY_TEXT_COLOR: Color = Color::from_int(0x0D0D0D);
pub const STICKY_PADDING: f64 = 16.0;

/// Letter spacing for tldraw text, in em.
pub const LETTER_SPACING: f64 = -0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeStyle {
    #[default]
    Small,
    S,
    Medium,
    M,
    Large,
    L,
    Xl,
}

impl SizeStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "small" => Some(Self::Small),
            "s" => Some(Self::S),
            "medium" => Some(Self::Medium),
            "m" => Some(Self::M),
            "large" => Some(Self::Large),
            "l" => Some(Self::L),
            "xl" => Some(Self::Xl),
            _ => None,
        }
    }
}

pub fn stroke_width(size: SizeStyle) -> f64 {
    match size {
        SizeStyle::Small | SizeStyle::S => 2.0,
        SizeStyle::Medium | SizeStyle::M => 3.5,
        SizeStyle::Large | SizeStyle::L => 5.0,
        SizeStyle::Xl => 6.5,
    }
}

/// Font sizes differ between the v1 ("small") and v2 ("s") token families.
pub fn font_size(size: SizeStyle) -> f64 {
    match size {
        SizeStyle::Small => 28.0,
        SizeStyle::S => 26.0,
        SizeStyle::Medium => 48.0,
        SizeStyle::M => 36.0,
        SizeStyle::Large => 96.0,
        SizeStyle::L => 54.0,
        SizeStyle::Xl => 64.0,
    }
}

pub fn sticky_font_size(size: SizeStyle) -> f64 {
    match size {
        SizeStyle::Small | SizeStyle::S => 24.0,
        SizeStyle::Medium | SizeStyle::M => 36.0,
        SizeStyle::Large | SizeStyle::L => 48.0,
        SizeStyle::Xl => 60.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorStyle {
    White,
    LightGray,
    Gray,
    Grey,
    #[default]
    Black,
    Green,
    LightGreen,
    Cyan,
    Blue,
    LightBlue,
    Indigo,
    Violet,
    LightViolet,
    Red,
    LightRed,
    Orange,
    Yellow,
    Semi,
}

impl ColorStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "white" => Some(Self::White),
            "lightGray" => Some(Self::LightGray),
            "gray" => Some(Self::Gray),
            "grey" => Some(Self::Grey),
            "black" => Some(Self::Black),
            "green" => Some(Self::Green),
            "light-green" => Some(Self::LightGreen),
            "cyan" => Some(Self::Cyan),
            "blue" => Some(Self::Blue),
            "light-blue" => Some(Self::LightBlue),
            "indigo" => Some(Self::Indigo),
            "violet" => Some(Self::Violet),
            "light-violet" => Some(Self::LightViolet),
            "red" => Some(Self::Red),
            "light-red" => Some(Self::LightRed),
            "orange" => Some(Self::Orange),
            "yellow" => Some(Self::Yellow),
            "semi" => Some(Self::Semi),
            _ => None,
        }
    }
}

/// Base palette shared by strokes and fills.
pub fn color(style: ColorStyle) -> Color {
    match style {
        ColorStyle::White => Color::from_int(0x1D1D1D),
        ColorStyle::LightGray => Color::from_int(0xC6CBD1),
        ColorStyle::Gray => Color::from_int(0x788492),
        ColorStyle::Grey => Color::from_int(0x9EA6B0),
        ColorStyle::Black => Color::from_int(0x1D1D1D),
        ColorStyle::Green => Color::from_int(0x36B24D),
        ColorStyle::LightGreen => Color::from_int(0x38B845),
        ColorStyle::Cyan => Color::from_int(0x0E98AD),
        ColorStyle::Blue => Color::from_int(0x1C7ED6),
        ColorStyle::LightBlue => Color::from_int(0x4099F5),
        ColorStyle::Indigo => Color::from_int(0x4263EB),
        ColorStyle::Violet => Color::from_int(0x7746F1),
        ColorStyle::LightViolet => Color::from_int(0x9C1FBE),
        ColorStyle::Red => Color::from_int(0xFF2133),
        ColorStyle::LightRed => Color::from_int(0xFC7075),
        ColorStyle::Orange => Color::from_int(0xFF9433),
        ColorStyle::Yellow => Color::from_int(0xFFC936),
        ColorStyle::Semi => Color::from_int(0xF5F9F7),
    }
}

/// Stroke color. White draws as near-black so it stays visible on the
/// near-white canvas.
pub fn stroke_color(style: ColorStyle) -> Color {
    if style == ColorStyle::White {
        Color::from_int(0x1D1D1D)
    } else {
        color(style)
    }
}

/// Fill color: the stroke color washed out against the canvas.
pub fn fill_color(style: ColorStyle) -> Color {
    if style == ColorStyle::White {
        Color::from_int(0xFEFEFE)
    } else {
        color_blend(color(style), CANVAS, 0.82)
    }
}

/// Sticky notes use a stronger tint, with white/black special-cased.
pub fn sticky_fill_color(style: ColorStyle) -> Color {
    match style {
        ColorStyle::White => Color::from_int(0xFFFFFF),
        ColorStyle::Black => Color::from_int(0x3D3D3D),
        _ => color_blend(color(style), CANVAS, 0.45),
    }
}

/// Highlighter palette; colors without a highlight variant fall back to the
/// yellow marker.
pub fn highlight_color(style: ColorStyle) -> Color {
    match style {
        ColorStyle::Black => Color::from_int(0xFFF4A1),
        ColorStyle::Grey => Color::from_int(0xEDF7FA),
        ColorStyle::LightViolet => Color::from_int(0xFFD7FF),
        ColorStyle::Violet => Color::from_int(0xECD3FF),
        ColorStyle::Blue => Color::from_int(0xB4E2FF),
        ColorStyle::LightBlue => Color::from_int(0xA2FCFF),
        ColorStyle::Yellow => Color::from_int(0xFFF4A1),
        ColorStyle::Orange => Color::from_int(0xFFE2B5),
        ColorStyle::Green => Color::from_int(0xA2FFEC),
        ColorStyle::LightGreen => Color::from_int(0xCCFCC1),
        ColorStyle::LightRed => Color::from_int(0xFFD3DF),
        ColorStyle::Red => Color::from_int(0xFFCACD),
        _ => Color::from_int(0xFFF4A1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DashStyle {
    #[default]
    Draw,
    Solid,
    Dashed,
    Dotted,
}

impl DashStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "draw" => Some(Self::Draw),
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Script,
    Sans,
    /// Spelling mistake in old tldraw payloads; same face as `Serif`.
    Erif,
    Serif,
    Mono,
    Draw,
    Arial,
}

impl FontStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "script" => Some(Self::Script),
            "sans" => Some(Self::Sans),
            "erif" => Some(Self::Erif),
            "serif" => Some(Self::Serif),
            "mono" => Some(Self::Mono),
            "draw" => Some(Self::Draw),
            "arial" => Some(Self::Arial),
            _ => None,
        }
    }
}

pub fn font_face(font: FontStyle) -> &'static str {
    match font {
        FontStyle::Script | FontStyle::Draw => "Caveat Brush",
        FontStyle::Sans => "Source Sans Pro",
        FontStyle::Erif | FontStyle::Serif => "Crimson Pro",
        FontStyle::Mono => "Source Code Pro",
        FontStyle::Arial => "Arial",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignStyle {
    Start,
    #[default]
    Middle,
    End,
    Justify,
}

impl AlignStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "middle" => Some(Self::Middle),
            "end" => Some(Self::End),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    #[default]
    None,
    Semi,
    Solid,
    Pattern,
}

impl FillStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "none" => Some(Self::None),
            "semi" => Some(Self::Semi),
            "solid" => Some(Self::Solid),
            "pattern" => Some(Self::Pattern),
            _ => None,
        }
    }
}

/// Style fields common to every tldraw shape. Partial updates overwrite only
/// the keys present in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub color: ColorStyle,
    pub size: SizeStyle,
    pub dash: DashStyle,
    pub is_filled: bool,
    pub is_closed: bool,
    pub scale: f64,
    pub font: FontStyle,
    pub text_align: AlignStyle,
    pub opacity: f64,
    pub fill: FillStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: ColorStyle::Black,
            size: SizeStyle::Small,
            dash: DashStyle::Draw,
            is_filled: false,
            is_closed: false,
            scale: 1.0,
            font: FontStyle::Script,
            text_align: AlignStyle::Middle,
            opacity: 1.0,
            fill: FillStyle::None,
        }
    }
}

impl Style {
    /// Merge a v1 `style` object or a v2 `props` object over this style.
    pub fn update_from_data(&mut self, data: &serde_json::Value) -> Result<(), ShapeDataError> {
        if let Some(token) = data.get("color").and_then(|v| v.as_str()) {
            self.color = ColorStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("color", token))?;
        }
        if let Some(token) = data.get("size").and_then(|v| v.as_str()) {
            self.size = SizeStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("size", token))?;
        }
        if let Some(token) = data.get("dash").and_then(|v| v.as_str()) {
            self.dash = DashStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("dash", token))?;
        }
        if let Some(v) = data.get("isFilled").and_then(|v| v.as_bool()) {
            self.is_filled = v;
        }
        if let Some(v) = data.get("scale").and_then(|v| v.as_f64()) {
            self.scale = v;
        }
        if let Some(token) = data.get("font").and_then(|v| v.as_str()) {
            self.font = FontStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("font", token))?;
        }
        if let Some(token) = data.get("textAlign").and_then(|v| v.as_str()) {
            self.text_align = AlignStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("textAlign", token))?;
        }
        if let Some(v) = data.get("opacity").and_then(|v| v.as_f64()) {
            self.opacity = v;
        }

        // v2-only style props.
        if let Some(v) = data.get("isClosed").and_then(|v| v.as_bool()) {
            self.is_closed = v;
        }
        if let Some(token) = data.get("fill").and_then(|v| v.as_str()) {
            self.fill = FillStyle::from_token(token)
                .ok_or_else(|| ShapeDataError::unknown_token("fill", token))?;
            if self.fill != FillStyle::None {
                self.is_filled = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn white_fill_is_special_cased() {
        assert_eq!(fill_color(ColorStyle::White), Color::from_int(0xFEFEFE));
        // Other colors blend toward the canvas.
        let f = fill_color(ColorStyle::Blue);
        let s = color(ColorStyle::Blue);
        assert!(f.r > s.r && f.g > s.g);
    }

    #[test]
    fn both_serif_spellings_share_a_face() {
        assert_eq!(font_face(FontStyle::Erif), font_face(FontStyle::Serif));
    }

    #[test]
    fn v1_and_v2_size_tokens_have_distinct_font_sizes() {
        assert_eq!(font_size(SizeStyle::Large), 96.0);
        assert_eq!(font_size(SizeStyle::L), 54.0);
        assert_eq!(stroke_width(SizeStyle::Large), stroke_width(SizeStyle::L));
    }

    #[test]
    fn style_merge_is_partial() {
        let mut style = Style::default();
        style
            .update_from_data(&json!({"color": "red", "size": "m"}))
            .unwrap();
        assert_eq!(style.color, ColorStyle::Red);
        assert_eq!(style.size, SizeStyle::M);
        assert_eq!(style.dash, DashStyle::Draw);

        style.update_from_data(&json!({"dash": "dotted"})).unwrap();
        assert_eq!(style.color, ColorStyle::Red);
        assert_eq!(style.dash, DashStyle::Dotted);
    }

    #[test]
    fn v2_fill_implies_filled() {
        let mut style = Style::default();
        style.update_from_data(&json!({"fill": "pattern"})).unwrap();
        assert_eq!(style.fill, FillStyle::Pattern);
        assert!(style.is_filled);
    }

    #[test]
    fn unknown_token_is_an_error() {
        let mut style = Style::default();
        assert!(style.update_from_data(&json!({"color": "mauve"})).is_err());
    }
}
