//! Rendering token values as CSS value text.

use std::collections::HashMap;

use swatch_tree::NodeId;

use crate::error::SerializeError;
use crate::meta::{Aliasable, NodeMeta, NodeRef, TokenTree};
use crate::naming::{identifier_collisions, token_identifiers};
use crate::value::{
    Color, Component, CubicBezier, Dimension, Duration, FontFamily, FontWeight, GradientStop,
    ShadowLayer, StrokeStyle, TokenValue, Transition, Typography,
};

type Result<T> = std::result::Result<T, SerializeError>;

/// CSS generic families, written unquoted.
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "math",
    "emoji",
    "fangsong",
];

/// Color spaces with their own CSS function; the rest use `color()`.
const FUNCTION_SPACES: &[&str] = &["hsl", "hwb", "lab", "lch", "oklab", "oklch"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Css,
    Scss,
}

impl Dialect {
    fn variable(self, ident: &str) -> String {
        match self {
            Dialect::Css => format!("var(--{})", ident),
            Dialect::Scss => format!("${}", ident),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub name: String,
    pub value: String,
}

fn decl(name: impl Into<String>, value: impl Into<String>) -> Declaration {
    Declaration {
        name: name.into(),
        value: value.into(),
    }
}

/// Declarations for every token in tree pre-order.
pub(crate) fn declarations(
    tree: &TokenTree,
    dialect: Dialect,
    prefix: Option<&str>,
) -> Result<Vec<Declaration>> {
    let idents = token_identifiers(tree, prefix);
    for (ident, first, later) in identifier_collisions(tree, &idents) {
        tracing::warn!(%ident, %first, %later, "tokens share an output identifier");
    }
    let render = Render {
        dialect,
        idents: &idents,
    };

    let mut out = Vec::new();
    for node in tree.values() {
        let NodeMeta::Token(token) = &node.meta else {
            continue;
        };
        let name = render.ident(&node.id)?;
        match &token.value {
            Aliasable::Ref(node_ref) => out.push(decl(name, render.reference(node_ref)?)),
            Aliasable::Literal(value) => render.token(name, value, &mut out)?,
        }
    }
    tracing::trace!(declarations = out.len(), ?dialect, "rendered declarations");
    Ok(out)
}

struct Render<'a> {
    dialect: Dialect,
    idents: &'a HashMap<NodeId, String>,
}

impl Render<'_> {
    fn ident(&self, id: &NodeId) -> Result<&str> {
        self.idents
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| SerializeError::DanglingReference(id.clone()))
    }

    fn reference(&self, node_ref: &NodeRef) -> Result<String> {
        Ok(self.dialect.variable(self.ident(&node_ref.target)?))
    }

    fn field<T>(&self, field: &Aliasable<T>, literal: impl FnOnce(&T) -> Result<String>) -> Result<String> {
        match field {
            Aliasable::Literal(value) => literal(value),
            Aliasable::Ref(node_ref) => self.reference(node_ref),
        }
    }

    /// Pushes the declarations of one literal token.
    fn token(&self, name: &str, value: &TokenValue, out: &mut Vec<Declaration>) -> Result<()> {
        match value {
            TokenValue::StrokeStyle(StrokeStyle::Custom { dash_array, line_cap }) => {
                let dashes = dash_array
                    .iter()
                    .map(|dash| self.field(dash, |d| Ok(dimension(d))))
                    .collect::<Result<Vec<_>>>()?;
                out.push(decl(format!("{}-dash-array", name), dashes.join(" ")));
                out.push(decl(format!("{}-line-cap", name), line_cap.as_str()));
                out.push(decl(name, "dashed"));
            }
            TokenValue::Typography(typography) => self.typography(name, typography, out)?,
            other => out.push(decl(name, self.value(other)?)),
        }
        Ok(())
    }

    fn value(&self, value: &TokenValue) -> Result<String> {
        Ok(match value {
            TokenValue::Color(c) => color(c),
            TokenValue::Dimension(d) => dimension(d),
            TokenValue::Duration(d) => duration(d),
            TokenValue::CubicBezier(b) => cubic_bezier(b),
            TokenValue::Number(n) => number(*n),
            TokenValue::FontFamily(f) => font_family(f)?,
            TokenValue::FontWeight(w) => font_weight(w),
            TokenValue::StrokeStyle(s) => stroke_style(s).to_string(),
            TokenValue::Border(border) => [
                self.field(&border.width, |w| Ok(dimension(w)))?,
                self.field(&border.style, |s| Ok(stroke_style(s).to_string()))?,
                self.field(&border.color, |c| Ok(color(c)))?,
            ]
            .join(" "),
            TokenValue::Shadow(shadow) => shadow
                .layers()
                .iter()
                .map(|layer| self.shadow_layer(layer))
                .collect::<Result<Vec<_>>>()?
                .join(", "),
            TokenValue::Gradient(stops) => format!(
                "linear-gradient({})",
                stops
                    .iter()
                    .map(|stop| self.gradient_stop(stop))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ")
            ),
            TokenValue::Transition(transition) => self.transition(transition)?,
            TokenValue::Typography(typography) => self.font_shorthand(typography)?,
        })
    }

    fn shadow_layer(&self, layer: &ShadowLayer) -> Result<String> {
        let mut parts = Vec::with_capacity(6);
        if layer.inset == Some(true) {
            parts.push("inset".to_string());
        }
        for offset in [&layer.offset_x, &layer.offset_y, &layer.blur, &layer.spread] {
            parts.push(self.field(offset, |d| Ok(dimension(d)))?);
        }
        parts.push(self.field(&layer.color, |c| Ok(color(c)))?);
        Ok(parts.join(" "))
    }

    fn gradient_stop(&self, stop: &GradientStop) -> Result<String> {
        let position = match &stop.position {
            Aliasable::Literal(p) => percent(*p),
            Aliasable::Ref(node_ref) => format!("calc({} * 100%)", self.reference(node_ref)?),
        };
        Ok(format!("{} {}", self.field(&stop.color, |c| Ok(color(c)))?, position))
    }

    fn transition(&self, transition: &Transition) -> Result<String> {
        Ok([
            self.field(&transition.duration, |d| Ok(duration(d)))?,
            self.field(&transition.timing_function, |b| Ok(cubic_bezier(b)))?,
            self.field(&transition.delay, |d| Ok(duration(d)))?,
        ]
        .join(" "))
    }

    fn typography(&self, name: &str, t: &Typography, out: &mut Vec<Declaration>) -> Result<()> {
        out.push(decl(
            format!("{}-font-family", name),
            self.field(&t.font_family, font_family)?,
        ));
        out.push(decl(
            format!("{}-font-size", name),
            self.field(&t.font_size, |d| Ok(dimension(d)))?,
        ));
        out.push(decl(
            format!("{}-font-weight", name),
            self.field(&t.font_weight, |w| Ok(font_weight(w)))?,
        ));
        out.push(decl(
            format!("{}-letter-spacing", name),
            self.field(&t.letter_spacing, |d| Ok(dimension(d)))?,
        ));
        out.push(decl(
            format!("{}-line-height", name),
            self.field(&t.line_height, |n| Ok(number(*n)))?,
        ));
        out.push(decl(name, self.font_shorthand(t)?));
        Ok(())
    }

    /// `font` shorthand: `<weight> <size>/<line-height> <family>`.
    fn font_shorthand(&self, t: &Typography) -> Result<String> {
        let weight = self.field(&t.font_weight, |w| Ok(font_weight(w)))?;
        let size = self.field(&t.font_size, |d| Ok(dimension(d)))?;
        let line_height = self.field(&t.line_height, |n| Ok(number(*n)))?;
        let family = self.field(&t.font_family, font_family)?;

        // `$a/$b` would be division in Sass
        let aliased = t.font_size.as_reference().is_some() || t.line_height.as_reference().is_some();
        let size_line = if self.dialect == Dialect::Scss && aliased {
            format!("#{{{}}}/#{{{}}}", size, line_height)
        } else {
            format!("{}/{}", size, line_height)
        };
        Ok(format!("{} {} {}", weight, size_line, family))
    }
}

fn number(value: f64) -> String {
    format!("{}", value)
}

/// A `0..=1` fraction as a percentage, without float noise.
fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0 * 1e6).round() / 1e6)
}

fn dimension(d: &Dimension) -> String {
    format!("{}{}", number(d.value), d.unit.as_str())
}

fn duration(d: &Duration) -> String {
    format!("{}{}", number(d.value), d.unit.as_str())
}

fn cubic_bezier(b: &CubicBezier) -> String {
    let [x1, y1, x2, y2] = b.0.map(number);
    format!("cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
}

fn font_weight(w: &FontWeight) -> String {
    number(w.numeric())
}

fn stroke_style(s: &StrokeStyle) -> &'static str {
    match s {
        StrokeStyle::Keyword(keyword) => keyword.as_str(),
        StrokeStyle::Custom { .. } => "dashed",
    }
}

fn color(c: &Color) -> String {
    let (color_space, components, alpha, hex) = match c {
        Color::Css(css) => return css.clone(),
        Color::Components {
            color_space,
            components,
            alpha,
            hex,
        } => (color_space.as_str(), components, *alpha, hex.as_deref()),
    };

    let alpha = alpha.filter(|a| *a < 1.0);
    if let (Some(hex), None, "srgb") = (hex, alpha, color_space) {
        return hex.to_string();
    }

    let channels = components
        .iter()
        .map(|c| match c {
            Component::Value(v) => number(*v),
            Component::None => "none".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let alpha = alpha.map(|a| format!(" / {}", number(a))).unwrap_or_default();

    if FUNCTION_SPACES.contains(&color_space) {
        format!("{}({}{})", color_space, channels, alpha)
    } else {
        format!("color({} {}{})", color_space, channels, alpha)
    }
}

fn font_family(f: &FontFamily) -> Result<String> {
    f.names()
        .into_iter()
        .map(font_name)
        .collect::<Result<Vec<_>>>()
        .map(|names| names.join(", "))
}

fn font_name(name: &str) -> Result<String> {
    if GENERIC_FAMILIES.contains(&name) {
        return Ok(name.to_string());
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    cssparser::serialize_string(name, &mut quoted).map_err(|e| SerializeError::Encode(e.to_string()))?;
    Ok(quoted)
}
