//! Typed token values.
//!
//! [`TokenValue`] is a closed union with one variant per [`TokenType`]. Each
//! composite variant stores its sub-fields as [`Aliasable`], so any of them
//! can independently point at another token.
//!
//! - [`validate`]: raw JSON to `TokenValue`, one validator per type
//! - [`TokenValue::to_json`]: the inverse, rewriting references to aliases

pub(crate) mod json;
mod validate;

pub use json::PathMap;
pub use validate::{validate, AliasLookup, ValueError, ValueErrorKind};

use swatch_tree::NodeId;

use crate::meta::Aliasable;
use crate::types::TokenType;

/// A color component: a number or the `none` keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    Value(f64),
    None,
}

/// A color value.
///
/// The color space is passed through untouched; only the shape is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// A bare color string (`#ff0000`, `rebeccapurple`).
    Css(String),
    Components {
        color_space: String,
        components: Vec<Component>,
        alpha: Option<f64>,
        hex: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionUnit {
    Px,
    Rem,
}

impl DimensionUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionUnit::Px => "px",
            DimensionUnit::Rem => "rem",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "px" => Some(DimensionUnit::Px),
            "rem" => Some(DimensionUnit::Rem),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: DimensionUnit,
}

impl Dimension {
    pub fn new(value: f64, unit: DimensionUnit) -> Self {
        Self { value, unit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Ms,
    S,
}

impl DurationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Ms => "ms",
            DurationUnit::S => "s",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ms" => Some(DurationUnit::Ms),
            "s" => Some(DurationUnit::S),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duration {
    pub value: f64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }
}

/// Control points `[x1, y1, x2, y2]`; both x values lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier(pub [f64; 4]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFamily {
    Single(String),
    Stack(Vec<String>),
}

impl FontFamily {
    pub fn names(&self) -> Vec<&str> {
        match self {
            FontFamily::Single(name) => vec![name.as_str()],
            FontFamily::Stack(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Weight keywords and the numeric weight each one stands for.
pub const FONT_WEIGHT_KEYWORDS: &[(&str, u16)] = &[
    ("thin", 100),
    ("hairline", 100),
    ("extra-light", 200),
    ("ultra-light", 200),
    ("light", 300),
    ("normal", 400),
    ("regular", 400),
    ("book", 400),
    ("medium", 500),
    ("semi-bold", 600),
    ("demi-bold", 600),
    ("bold", 700),
    ("extra-bold", 800),
    ("ultra-bold", 800),
    ("black", 900),
    ("heavy", 900),
    ("extra-black", 950),
    ("ultra-black", 950),
];

#[derive(Debug, Clone, PartialEq)]
pub enum FontWeight {
    Numeric(f64),
    /// One of [`FONT_WEIGHT_KEYWORDS`], kept as written.
    Keyword(String),
}

impl FontWeight {
    /// The numeric weight, resolving keywords.
    pub fn numeric(&self) -> f64 {
        match self {
            FontWeight::Numeric(weight) => *weight,
            FontWeight::Keyword(keyword) => FONT_WEIGHT_KEYWORDS
                .iter()
                .find(|(k, _)| k == keyword)
                .map(|(_, w)| f64::from(*w))
                .unwrap_or(400.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKeyword {
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Outset,
    Inset,
}

impl StrokeKeyword {
    pub const ALL: [StrokeKeyword; 8] = [
        StrokeKeyword::Solid,
        StrokeKeyword::Dashed,
        StrokeKeyword::Dotted,
        StrokeKeyword::Double,
        StrokeKeyword::Groove,
        StrokeKeyword::Ridge,
        StrokeKeyword::Outset,
        StrokeKeyword::Inset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrokeKeyword::Solid => "solid",
            StrokeKeyword::Dashed => "dashed",
            StrokeKeyword::Dotted => "dotted",
            StrokeKeyword::Double => "double",
            StrokeKeyword::Groove => "groove",
            StrokeKeyword::Ridge => "ridge",
            StrokeKeyword::Outset => "outset",
            StrokeKeyword::Inset => "inset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Butt,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Round => "round",
            LineCap::Butt => "butt",
            LineCap::Square => "square",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "round" => Some(LineCap::Round),
            "butt" => Some(LineCap::Butt),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrokeStyle {
    Keyword(StrokeKeyword),
    Custom {
        dash_array: Vec<Aliasable<Dimension>>,
        line_cap: LineCap,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub color: Aliasable<Color>,
    pub width: Aliasable<Dimension>,
    pub style: Aliasable<StrokeStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowLayer {
    pub color: Aliasable<Color>,
    pub offset_x: Aliasable<Dimension>,
    pub offset_y: Aliasable<Dimension>,
    pub blur: Aliasable<Dimension>,
    pub spread: Aliasable<Dimension>,
    pub inset: Option<bool>,
}

/// A shadow keeps the single-object vs. array shape it was written in.
#[derive(Debug, Clone, PartialEq)]
pub enum Shadow {
    Single(ShadowLayer),
    Layers(Vec<ShadowLayer>),
}

impl Shadow {
    pub fn layers(&self) -> &[ShadowLayer] {
        match self {
            Shadow::Single(layer) => std::slice::from_ref(layer),
            Shadow::Layers(layers) => layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: Aliasable<Color>,
    /// Position along the gradient, `0` to `1`.
    pub position: Aliasable<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub duration: Aliasable<Duration>,
    pub delay: Aliasable<Duration>,
    pub timing_function: Aliasable<CubicBezier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    pub font_family: Aliasable<FontFamily>,
    pub font_size: Aliasable<Dimension>,
    pub font_weight: Aliasable<FontWeight>,
    pub letter_spacing: Aliasable<Dimension>,
    pub line_height: Aliasable<f64>,
}

/// A validated token value.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Color(Color),
    Dimension(Dimension),
    Duration(Duration),
    CubicBezier(CubicBezier),
    Number(f64),
    FontFamily(FontFamily),
    FontWeight(FontWeight),
    StrokeStyle(StrokeStyle),
    Border(Border),
    Shadow(Shadow),
    Gradient(Vec<GradientStop>),
    Transition(Transition),
    Typography(Typography),
}

impl TokenValue {
    pub fn token_type(&self) -> TokenType {
        match self {
            TokenValue::Color(_) => TokenType::Color,
            TokenValue::Dimension(_) => TokenType::Dimension,
            TokenValue::Duration(_) => TokenType::Duration,
            TokenValue::CubicBezier(_) => TokenType::CubicBezier,
            TokenValue::Number(_) => TokenType::Number,
            TokenValue::FontFamily(_) => TokenType::FontFamily,
            TokenValue::FontWeight(_) => TokenType::FontWeight,
            TokenValue::StrokeStyle(_) => TokenType::StrokeStyle,
            TokenValue::Border(_) => TokenType::Border,
            TokenValue::Shadow(_) => TokenType::Shadow,
            TokenValue::Gradient(_) => TokenType::Gradient,
            TokenValue::Transition(_) => TokenType::Transition,
            TokenValue::Typography(_) => TokenType::Typography,
        }
    }

    /// Targets of every aliased sub-field, in field order.
    pub fn references(&self) -> Vec<&NodeId> {
        fn push<'a, T>(out: &mut Vec<&'a NodeId>, field: &'a Aliasable<T>) {
            if let Aliasable::Ref(node_ref) = field {
                out.push(&node_ref.target);
            }
        }
        fn stroke<'a>(out: &mut Vec<&'a NodeId>, style: &'a StrokeStyle) {
            if let StrokeStyle::Custom { dash_array, .. } = style {
                for dash in dash_array {
                    push(out, dash);
                }
            }
        }

        let mut out = Vec::new();
        match self {
            TokenValue::StrokeStyle(style) => stroke(&mut out, style),
            TokenValue::Border(border) => {
                push(&mut out, &border.color);
                push(&mut out, &border.width);
                match &border.style {
                    Aliasable::Literal(style) => stroke(&mut out, style),
                    style => push(&mut out, style),
                }
            }
            TokenValue::Shadow(shadow) => {
                for layer in shadow.layers() {
                    push(&mut out, &layer.color);
                    push(&mut out, &layer.offset_x);
                    push(&mut out, &layer.offset_y);
                    push(&mut out, &layer.blur);
                    push(&mut out, &layer.spread);
                }
            }
            TokenValue::Gradient(stops) => {
                for stop in stops {
                    push(&mut out, &stop.color);
                    push(&mut out, &stop.position);
                }
            }
            TokenValue::Transition(transition) => {
                push(&mut out, &transition.duration);
                push(&mut out, &transition.delay);
                push(&mut out, &transition.timing_function);
            }
            TokenValue::Typography(typography) => {
                push(&mut out, &typography.font_family);
                push(&mut out, &typography.font_size);
                push(&mut out, &typography.font_weight);
                push(&mut out, &typography.letter_spacing);
                push(&mut out, &typography.line_height);
            }
            _ => {}
        }
        out
    }
}
