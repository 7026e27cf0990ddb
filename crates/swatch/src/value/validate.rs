//! Structural validators, one per token type.
//!
//! Each validator turns raw JSON into a typed value or returns a
//! [`ValueError`] locating the offending sub-field. Composite sub-fields may
//! be written as aliases (`"{path}"`); these are resolved to node ids through
//! an [`AliasLookup`] while validating.

use std::collections::HashMap;

use serde_json::{Map, Value};
use swatch_tree::NodeId;

use super::{
    Border, Color, Component, CubicBezier, Dimension, DimensionUnit, Duration, DurationUnit,
    FontFamily, FontWeight, GradientStop, LineCap, Shadow, ShadowLayer, StrokeKeyword,
    StrokeStyle, TokenValue, Transition, Typography, FONT_WEIGHT_KEYWORDS,
};
use crate::meta::{Aliasable, NodeRef};
use crate::path::{join_path, parse_alias};
use crate::types::TokenType;

/// Resolves alias paths to token ids.
pub trait AliasLookup {
    fn lookup(&self, path: &str) -> Option<NodeId>;
}

impl AliasLookup for HashMap<String, NodeId> {
    fn lookup(&self, path: &str) -> Option<NodeId> {
        self.get(path).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// The literal does not have the shape its type requires.
    Invalid,
    /// An alias sub-field names a path with no token.
    UnresolvedAlias,
}

/// A validation failure inside a value.
///
/// `path` is relative to the value itself (`""` for the whole value,
/// `width`, `[1].color`, `dashArray[0]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    pub path: String,
    pub message: String,
    pub kind: ValueErrorKind,
}

impl ValueError {
    fn invalid(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            kind: ValueErrorKind::Invalid,
        }
    }

    fn unresolved(path: &str, alias: &str) -> Self {
        Self {
            path: path.to_string(),
            message: format!("alias '{{{}}}' does not resolve to a token", alias),
            kind: ValueErrorKind::UnresolvedAlias,
        }
    }
}

impl std::fmt::Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValueError {}

type Result<T> = std::result::Result<T, ValueError>;

/// Validates `raw` as a value of type `ty`.
pub fn validate(ty: TokenType, raw: &Value, lookup: &dyn AliasLookup) -> Result<TokenValue> {
    let path = "";
    match ty {
        TokenType::Color => color(raw, path).map(TokenValue::Color),
        TokenType::Dimension => dimension(raw, path).map(TokenValue::Dimension),
        TokenType::Duration => duration(raw, path).map(TokenValue::Duration),
        TokenType::CubicBezier => cubic_bezier(raw, path).map(TokenValue::CubicBezier),
        TokenType::Number => number(raw, path).map(TokenValue::Number),
        TokenType::FontFamily => font_family(raw, path).map(TokenValue::FontFamily),
        TokenType::FontWeight => font_weight(raw, path).map(TokenValue::FontWeight),
        TokenType::StrokeStyle => stroke_style(raw, path, lookup).map(TokenValue::StrokeStyle),
        TokenType::Border => border(raw, path, lookup).map(TokenValue::Border),
        TokenType::Shadow => shadow(raw, path, lookup).map(TokenValue::Shadow),
        TokenType::Gradient => gradient(raw, path, lookup).map(TokenValue::Gradient),
        TokenType::Transition => transition(raw, path, lookup).map(TokenValue::Transition),
        TokenType::Typography => typography(raw, path, lookup).map(TokenValue::Typography),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

fn describe(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn object<'a>(raw: &'a Value, path: &str, what: &str) -> Result<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| ValueError::invalid(path, format!("expected {} object, found {}", what, describe(raw))))
}

fn array<'a>(raw: &'a Value, path: &str, what: &str) -> Result<&'a Vec<Value>> {
    raw.as_array()
        .ok_or_else(|| ValueError::invalid(path, format!("expected {}, found {}", what, describe(raw))))
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| ValueError::invalid(path, format!("missing field '{}'", key)))
}

/// Rejects keys outside `allowed`, so accepted values always round-trip.
fn only_fields(obj: &Map<String, Value>, allowed: &[&str], path: &str) -> Result<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(extra) => Err(ValueError::invalid(path, format!("unexpected field '{}'", extra))),
        None => Ok(()),
    }
}

fn string<'a>(raw: &'a Value, path: &str, what: &str) -> Result<&'a str> {
    raw.as_str()
        .ok_or_else(|| ValueError::invalid(path, format!("expected {}, found {}", what, describe(raw))))
}

/// A literal, or a reference if `raw` is an alias string.
fn aliasable<T>(
    raw: &Value,
    path: &str,
    lookup: &dyn AliasLookup,
    literal: impl FnOnce(&Value, &str) -> Result<T>,
) -> Result<Aliasable<T>> {
    if let Some(alias) = raw.as_str().and_then(parse_alias) {
        return lookup
            .lookup(alias)
            .map(|id| Aliasable::Ref(NodeRef::new(id)))
            .ok_or_else(|| ValueError::unresolved(path, alias));
    }
    literal(raw, path).map(Aliasable::Literal)
}

// =============================================================================
// Primitive validators
// =============================================================================

fn number(raw: &Value, path: &str) -> Result<f64> {
    raw.as_f64()
        .ok_or_else(|| ValueError::invalid(path, format!("expected a number, found {}", describe(raw))))
}

fn unit_number(raw: &Value, path: &str) -> Result<f64> {
    let value = number(raw, path)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ValueError::invalid(path, format!("{} is outside the range 0 to 1", value)));
    }
    Ok(value)
}

fn is_hex6(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn color(raw: &Value, path: &str) -> Result<Color> {
    if let Value::String(s) = raw {
        if s.trim().is_empty() {
            return Err(ValueError::invalid(path, "color string must not be empty"));
        }
        return Ok(Color::Css(s.clone()));
    }

    let obj = object(raw, path, "a color")?;
    only_fields(obj, &["colorSpace", "components", "alpha", "hex"], path)?;

    let space_path = join_path(path, "colorSpace");
    let color_space = string(field(obj, "colorSpace", path)?, &space_path, "a color space name")?;

    let components_path = join_path(path, "components");
    let raw_components = array(field(obj, "components", path)?, &components_path, "a components array")?;
    if raw_components.len() != 3 {
        return Err(ValueError::invalid(
            &components_path,
            format!("expected 3 components, found {}", raw_components.len()),
        ));
    }
    let components = raw_components
        .iter()
        .enumerate()
        .map(|(i, c)| match c {
            Value::String(s) if s == "none" => Ok(Component::None),
            other => number(other, &index_path(&components_path, i)).map(Component::Value),
        })
        .collect::<Result<Vec<_>>>()?;

    let alpha = obj
        .get("alpha")
        .map(|a| unit_number(a, &join_path(path, "alpha")))
        .transpose()?;

    let hex = match obj.get("hex") {
        None => None,
        Some(h) => {
            let hex_path = join_path(path, "hex");
            let hex = string(h, &hex_path, "a hex string")?;
            if !is_hex6(hex) {
                return Err(ValueError::invalid(&hex_path, format!("'{}' is not a #rrggbb hex color", hex)));
            }
            Some(hex.to_string())
        }
    };

    Ok(Color::Components {
        color_space: color_space.to_string(),
        components,
        alpha,
        hex,
    })
}

fn dimension(raw: &Value, path: &str) -> Result<Dimension> {
    let obj = object(raw, path, "a dimension")?;
    only_fields(obj, &["value", "unit"], path)?;
    let value = number(field(obj, "value", path)?, &join_path(path, "value"))?;
    let unit_path = join_path(path, "unit");
    let unit = string(field(obj, "unit", path)?, &unit_path, "a unit")?;
    let unit = DimensionUnit::parse(unit)
        .ok_or_else(|| ValueError::invalid(&unit_path, format!("unknown dimension unit '{}'", unit)))?;
    Ok(Dimension { value, unit })
}

fn duration(raw: &Value, path: &str) -> Result<Duration> {
    let obj = object(raw, path, "a duration")?;
    only_fields(obj, &["value", "unit"], path)?;
    let value = number(field(obj, "value", path)?, &join_path(path, "value"))?;
    let unit_path = join_path(path, "unit");
    let unit = string(field(obj, "unit", path)?, &unit_path, "a unit")?;
    let unit = DurationUnit::parse(unit)
        .ok_or_else(|| ValueError::invalid(&unit_path, format!("unknown duration unit '{}'", unit)))?;
    Ok(Duration { value, unit })
}

fn cubic_bezier(raw: &Value, path: &str) -> Result<CubicBezier> {
    let points = array(raw, path, "an array of four numbers")?;
    if points.len() != 4 {
        return Err(ValueError::invalid(
            path,
            format!("expected 4 control points, found {}", points.len()),
        ));
    }
    let mut out = [0.0; 4];
    for (i, point) in points.iter().enumerate() {
        let point_path = index_path(path, i);
        // x coordinates are bounded, y coordinates are not
        out[i] = if i % 2 == 0 {
            unit_number(point, &point_path)?
        } else {
            number(point, &point_path)?
        };
    }
    Ok(CubicBezier(out))
}

fn font_family(raw: &Value, path: &str) -> Result<FontFamily> {
    match raw {
        Value::String(name) if !name.trim().is_empty() => Ok(FontFamily::Single(name.clone())),
        Value::Array(names) if !names.is_empty() => names
            .iter()
            .enumerate()
            .map(|(i, name)| match name {
                Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
                other => Err(ValueError::invalid(
                    &index_path(path, i),
                    format!("expected a font name, found {}", describe(other)),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(FontFamily::Stack),
        other => Err(ValueError::invalid(
            path,
            format!("expected a font name or a list of names, found {}", describe(other)),
        )),
    }
}

fn font_weight(raw: &Value, path: &str) -> Result<FontWeight> {
    match raw {
        Value::Number(_) => {
            let weight = number(raw, path)?;
            if !(1.0..=1000.0).contains(&weight) {
                return Err(ValueError::invalid(path, format!("font weight {} is outside 1 to 1000", weight)));
            }
            Ok(FontWeight::Numeric(weight))
        }
        Value::String(keyword) if FONT_WEIGHT_KEYWORDS.iter().any(|(k, _)| k == keyword) => {
            Ok(FontWeight::Keyword(keyword.clone()))
        }
        Value::String(keyword) => Err(ValueError::invalid(
            path,
            format!("unknown font weight '{}'", keyword),
        )),
        other => Err(ValueError::invalid(
            path,
            format!("expected a number or weight keyword, found {}", describe(other)),
        )),
    }
}

fn stroke_style(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<StrokeStyle> {
    if let Value::String(keyword) = raw {
        return StrokeKeyword::parse(keyword)
            .map(StrokeStyle::Keyword)
            .ok_or_else(|| ValueError::invalid(path, format!("unknown stroke style '{}'", keyword)));
    }

    let obj = object(raw, path, "a stroke style")?;
    only_fields(obj, &["dashArray", "lineCap"], path)?;

    let dash_path = join_path(path, "dashArray");
    let dashes = array(field(obj, "dashArray", path)?, &dash_path, "a dash array")?;
    if dashes.is_empty() {
        return Err(ValueError::invalid(&dash_path, "dash array must not be empty"));
    }
    let dash_array = dashes
        .iter()
        .enumerate()
        .map(|(i, dash)| aliasable(dash, &index_path(&dash_path, i), lookup, dimension))
        .collect::<Result<Vec<_>>>()?;

    let cap_path = join_path(path, "lineCap");
    let cap = string(field(obj, "lineCap", path)?, &cap_path, "a line cap")?;
    let line_cap = LineCap::parse(cap)
        .ok_or_else(|| ValueError::invalid(&cap_path, format!("unknown line cap '{}'", cap)))?;

    Ok(StrokeStyle::Custom { dash_array, line_cap })
}

// =============================================================================
// Composite validators
// =============================================================================

fn border(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<Border> {
    let obj = object(raw, path, "a border")?;
    only_fields(obj, &["color", "width", "style"], path)?;
    let sub = |key: &str| -> Result<(&Value, String)> { Ok((field(obj, key, path)?, join_path(path, key))) };

    let (raw_color, color_path) = sub("color")?;
    let (raw_width, width_path) = sub("width")?;
    let (raw_style, style_path) = sub("style")?;
    Ok(Border {
        color: aliasable(raw_color, &color_path, lookup, color)?,
        width: aliasable(raw_width, &width_path, lookup, dimension)?,
        style: aliasable(raw_style, &style_path, lookup, |v, p| stroke_style(v, p, lookup))?,
    })
}

fn shadow_layer(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<ShadowLayer> {
    let obj = object(raw, path, "a shadow")?;
    only_fields(obj, &["color", "offsetX", "offsetY", "blur", "spread", "inset"], path)?;
    let dim = |key: &str| -> Result<Aliasable<Dimension>> {
        aliasable(field(obj, key, path)?, &join_path(path, key), lookup, dimension)
    };

    let inset = match obj.get("inset") {
        None => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(other) => {
            return Err(ValueError::invalid(
                &join_path(path, "inset"),
                format!("expected a boolean, found {}", describe(other)),
            ))
        }
    };

    Ok(ShadowLayer {
        color: aliasable(field(obj, "color", path)?, &join_path(path, "color"), lookup, color)?,
        offset_x: dim("offsetX")?,
        offset_y: dim("offsetY")?,
        blur: dim("blur")?,
        spread: dim("spread")?,
        inset,
    })
}

fn shadow(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<Shadow> {
    match raw {
        Value::Array(layers) => {
            if layers.is_empty() {
                return Err(ValueError::invalid(path, "shadow list must not be empty"));
            }
            layers
                .iter()
                .enumerate()
                .map(|(i, layer)| shadow_layer(layer, &index_path(path, i), lookup))
                .collect::<Result<Vec<_>>>()
                .map(Shadow::Layers)
        }
        _ => shadow_layer(raw, path, lookup).map(Shadow::Single),
    }
}

fn gradient(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<Vec<GradientStop>> {
    let stops = array(raw, path, "an array of gradient stops")?;
    if stops.is_empty() {
        return Err(ValueError::invalid(path, "gradient must have at least one stop"));
    }
    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let stop_path = index_path(path, i);
            let obj = object(stop, &stop_path, "a gradient stop")?;
            only_fields(obj, &["color", "position"], &stop_path)?;
            Ok(GradientStop {
                color: aliasable(
                    field(obj, "color", &stop_path)?,
                    &join_path(&stop_path, "color"),
                    lookup,
                    color,
                )?,
                position: aliasable(
                    field(obj, "position", &stop_path)?,
                    &join_path(&stop_path, "position"),
                    lookup,
                    unit_number,
                )?,
            })
        })
        .collect()
}

fn transition(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<Transition> {
    let obj = object(raw, path, "a transition")?;
    only_fields(obj, &["duration", "delay", "timingFunction"], path)?;
    let time = |key: &str| -> Result<Aliasable<Duration>> {
        aliasable(field(obj, key, path)?, &join_path(path, key), lookup, duration)
    };
    Ok(Transition {
        duration: time("duration")?,
        delay: time("delay")?,
        timing_function: aliasable(
            field(obj, "timingFunction", path)?,
            &join_path(path, "timingFunction"),
            lookup,
            cubic_bezier,
        )?,
    })
}

fn typography(raw: &Value, path: &str, lookup: &dyn AliasLookup) -> Result<Typography> {
    let obj = object(raw, path, "a typography")?;
    only_fields(
        obj,
        &["fontFamily", "fontSize", "fontWeight", "letterSpacing", "lineHeight"],
        path,
    )?;
    let dim = |key: &str| -> Result<Aliasable<Dimension>> {
        aliasable(field(obj, key, path)?, &join_path(path, key), lookup, dimension)
    };
    Ok(Typography {
        font_family: aliasable(
            field(obj, "fontFamily", path)?,
            &join_path(path, "fontFamily"),
            lookup,
            font_family,
        )?,
        font_size: dim("fontSize")?,
        font_weight: aliasable(
            field(obj, "fontWeight", path)?,
            &join_path(path, "fontWeight"),
            lookup,
            font_weight,
        )?,
        letter_spacing: dim("letterSpacing")?,
        line_height: aliasable(
            field(obj, "lineHeight", path)?,
            &join_path(path, "lineHeight"),
            lookup,
            number,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup() -> HashMap<String, NodeId> {
        HashMap::from([
            ("colors.black".to_string(), NodeId::from("black")),
            ("size.hairline".to_string(), NodeId::from("hairline")),
        ])
    }

    fn check(ty: TokenType, raw: Value) -> Result<TokenValue> {
        validate(ty, &raw, &lookup())
    }

    fn assert_invalid(ty: TokenType, raw: Value, path: &str) {
        let err = check(ty, raw.clone()).expect_err(&format!("accepted {} {}", ty, raw));
        assert_eq!(err.kind, ValueErrorKind::Invalid, "{}", err);
        assert_eq!(err.path, path, "{}", err);
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    #[test]
    fn test_color_components() {
        let value = check(
            TokenType::Color,
            json!({"colorSpace": "oklch", "components": [0.7, 0.1, "none"], "alpha": 0.5}),
        )
        .unwrap();
        assert_eq!(
            value,
            TokenValue::Color(Color::Components {
                color_space: "oklch".into(),
                components: vec![Component::Value(0.7), Component::Value(0.1), Component::None],
                alpha: Some(0.5),
                hex: None,
            })
        );
    }

    #[test]
    fn test_color_passes_any_space_and_strings() {
        assert!(check(
            TokenType::Color,
            json!({"colorSpace": "made-up", "components": [1, 2, 3]})
        )
        .is_ok());
        assert_eq!(
            check(TokenType::Color, json!("#ff0000")).unwrap(),
            TokenValue::Color(Color::Css("#ff0000".into()))
        );
    }

    #[test]
    fn test_color_shape_errors() {
        assert_invalid(TokenType::Color, json!({"components": [0, 0, 0]}), "");
        assert_invalid(
            TokenType::Color,
            json!({"colorSpace": "srgb", "components": [0, 0]}),
            "components",
        );
        assert_invalid(
            TokenType::Color,
            json!({"colorSpace": "srgb", "components": [0, "x", 0]}),
            "components[1]",
        );
        assert_invalid(
            TokenType::Color,
            json!({"colorSpace": "srgb", "components": [0, 0, 0], "alpha": 2}),
            "alpha",
        );
        assert_invalid(
            TokenType::Color,
            json!({"colorSpace": "srgb", "components": [0, 0, 0], "hex": "red"}),
            "hex",
        );
        assert_invalid(TokenType::Color, json!(""), "");
        assert_invalid(TokenType::Color, json!(12), "");
    }

    #[test]
    fn test_dimension_and_duration() {
        assert_eq!(
            check(TokenType::Dimension, json!({"value": 8, "unit": "px"})).unwrap(),
            TokenValue::Dimension(Dimension::new(8.0, DimensionUnit::Px))
        );
        assert_eq!(
            check(TokenType::Duration, json!({"value": 0.2, "unit": "s"})).unwrap(),
            TokenValue::Duration(Duration::new(0.2, DurationUnit::S))
        );
        assert_invalid(TokenType::Dimension, json!({"value": 8, "unit": "vw"}), "unit");
        assert_invalid(TokenType::Dimension, json!({"value": "8", "unit": "px"}), "value");
        assert_invalid(TokenType::Dimension, json!("8px"), "");
        assert_invalid(
            TokenType::Dimension,
            json!({"value": 8, "unit": "px", "extra": true}),
            "",
        );
        assert_invalid(TokenType::Duration, json!({"value": 1, "unit": "px"}), "unit");
    }

    #[test]
    fn test_cubic_bezier() {
        assert_eq!(
            check(TokenType::CubicBezier, json!([0.4, -0.5, 0.2, 1.5])).unwrap(),
            TokenValue::CubicBezier(CubicBezier([0.4, -0.5, 0.2, 1.5]))
        );
        assert_invalid(TokenType::CubicBezier, json!([0, 0, 1]), "");
        assert_invalid(TokenType::CubicBezier, json!([1.2, 0, 1, 1]), "[0]");
    }

    #[test]
    fn test_number_and_font_family() {
        assert_eq!(check(TokenType::Number, json!(1.5)).unwrap(), TokenValue::Number(1.5));
        assert_invalid(TokenType::Number, json!("1.5"), "");
        assert_eq!(
            check(TokenType::FontFamily, json!(["Inter", "sans-serif"])).unwrap(),
            TokenValue::FontFamily(FontFamily::Stack(vec!["Inter".into(), "sans-serif".into()]))
        );
        assert_invalid(TokenType::FontFamily, json!([]), "");
        assert_invalid(TokenType::FontFamily, json!(["Inter", 3]), "[1]");
    }

    #[test]
    fn test_font_weight() {
        assert_eq!(
            check(TokenType::FontWeight, json!("semi-bold")).unwrap(),
            TokenValue::FontWeight(FontWeight::Keyword("semi-bold".into()))
        );
        assert_eq!(
            check(TokenType::FontWeight, json!(350)).unwrap(),
            TokenValue::FontWeight(FontWeight::Numeric(350.0))
        );
        assert_invalid(TokenType::FontWeight, json!(0), "");
        assert_invalid(TokenType::FontWeight, json!("heavyish"), "");
    }

    #[test]
    fn test_stroke_style() {
        assert_eq!(
            check(TokenType::StrokeStyle, json!("dashed")).unwrap(),
            TokenValue::StrokeStyle(StrokeStyle::Keyword(StrokeKeyword::Dashed))
        );
        let custom = check(
            TokenType::StrokeStyle,
            json!({"dashArray": ["{size.hairline}", {"value": 2, "unit": "px"}], "lineCap": "round"}),
        )
        .unwrap();
        let TokenValue::StrokeStyle(StrokeStyle::Custom { dash_array, line_cap }) = custom else {
            panic!("expected custom stroke style");
        };
        assert_eq!(line_cap, LineCap::Round);
        assert_eq!(dash_array[0], Aliasable::Ref(NodeRef::new(NodeId::from("hairline"))));
        assert_invalid(TokenType::StrokeStyle, json!("wavy"), "");
        assert_invalid(
            TokenType::StrokeStyle,
            json!({"dashArray": [], "lineCap": "round"}),
            "dashArray",
        );
    }

    // =========================================================================
    // Composites
    // =========================================================================

    #[test]
    fn test_border_sub_fields_alias_independently() {
        let value = check(
            TokenType::Border,
            json!({"color": "{colors.black}", "width": {"value": 1, "unit": "px"}, "style": "solid"}),
        )
        .unwrap();
        let TokenValue::Border(border) = value else {
            panic!("expected border");
        };
        assert_eq!(border.color, Aliasable::Ref(NodeRef::new(NodeId::from("black"))));
        assert_eq!(
            border.width,
            Aliasable::Literal(Dimension::new(1.0, DimensionUnit::Px))
        );
        assert_eq!(
            border.style,
            Aliasable::Literal(StrokeStyle::Keyword(StrokeKeyword::Solid))
        );
    }

    #[test]
    fn test_unresolved_sub_field_alias() {
        let err = check(
            TokenType::Border,
            json!({"color": "{colors.missing}", "width": "{size.hairline}", "style": "solid"}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValueErrorKind::UnresolvedAlias);
        assert_eq!(err.path, "color");
    }

    #[test]
    fn test_shadow_single_and_layers() {
        let layer = json!({
            "color": "{colors.black}",
            "offsetX": {"value": 0, "unit": "px"},
            "offsetY": {"value": 2, "unit": "px"},
            "blur": {"value": 4, "unit": "px"},
            "spread": {"value": 0, "unit": "px"}
        });
        assert!(matches!(
            check(TokenType::Shadow, layer.clone()).unwrap(),
            TokenValue::Shadow(Shadow::Single(_))
        ));
        let layers = check(TokenType::Shadow, json!([layer.clone(), layer])).unwrap();
        let TokenValue::Shadow(Shadow::Layers(layers)) = layers else {
            panic!("expected layered shadow");
        };
        assert_eq!(layers.len(), 2);

        assert_invalid(
            TokenType::Shadow,
            json!([{"color": "#000", "offsetX": {"value": 0, "unit": "px"}}]),
            "[0]",
        );
        assert_invalid(TokenType::Shadow, json!([]), "");
    }

    #[test]
    fn test_gradient() {
        let value = check(
            TokenType::Gradient,
            json!([
                {"color": "#000000", "position": 0},
                {"color": "{colors.black}", "position": 1}
            ]),
        )
        .unwrap();
        let TokenValue::Gradient(stops) = value else {
            panic!("expected gradient");
        };
        assert_eq!(stops.len(), 2);
        assert_invalid(
            TokenType::Gradient,
            json!([{"color": "#000000", "position": 1.5}]),
            "[0].position",
        );
    }

    #[test]
    fn test_transition() {
        let value = check(
            TokenType::Transition,
            json!({
                "duration": {"value": 200, "unit": "ms"},
                "delay": {"value": 0, "unit": "ms"},
                "timingFunction": [0.5, 0, 1, 1]
            }),
        );
        assert!(matches!(value, Ok(TokenValue::Transition(_))));
        assert_invalid(
            TokenType::Transition,
            json!({"duration": {"value": 200, "unit": "ms"}, "delay": {"value": 0, "unit": "ms"}}),
            "",
        );
    }

    #[test]
    fn test_typography() {
        let value = check(
            TokenType::Typography,
            json!({
                "fontFamily": ["Inter", "sans-serif"],
                "fontSize": {"value": 16, "unit": "px"},
                "fontWeight": "bold",
                "letterSpacing": "{size.hairline}",
                "lineHeight": 1.5
            }),
        )
        .unwrap();
        let TokenValue::Typography(typography) = value else {
            panic!("expected typography");
        };
        assert_eq!(typography.line_height, Aliasable::Literal(1.5));
        assert!(typography.letter_spacing.as_reference().is_some());
        assert_invalid(
            TokenType::Typography,
            json!({
                "fontFamily": "Inter",
                "fontSize": {"value": 16, "unit": "px"},
                "fontWeight": "bold",
                "letterSpacing": {"value": 0, "unit": "px"},
                "lineHeight": "tall"
            }),
            "lineHeight",
        );
    }
}
