//! Canonical JSON encoding of [`TokenValue`].

use std::collections::HashMap;

use serde_json::{Map, Value};
use swatch_tree::NodeId;

use super::{
    Border, Color, Component, CubicBezier, Dimension, Duration, FontFamily, FontWeight,
    GradientStop, ShadowLayer, Shadow, StrokeStyle, TokenValue, Transition, Typography,
};
use crate::error::SerializeError;
use crate::meta::{Aliasable, NodeRef};
use crate::path::format_alias;

type Result<T> = std::result::Result<T, SerializeError>;

/// Node id to dot path, for rewriting references.
pub type PathMap = HashMap<NodeId, String>;

/// Encodes a number, preferring an integer when there is no fractional part.
pub(crate) fn number_json(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Rewrites a reference to its `{path}` alias string.
pub(crate) fn alias_json(node_ref: &NodeRef, paths: &PathMap) -> Result<Value> {
    paths
        .get(&node_ref.target)
        .map(|path| Value::String(format_alias(path)))
        .ok_or_else(|| SerializeError::DanglingReference(node_ref.target.clone()))
}

fn aliasable<T>(
    field: &Aliasable<T>,
    paths: &PathMap,
    literal: impl FnOnce(&T) -> Result<Value>,
) -> Result<Value> {
    match field {
        Aliasable::Literal(value) => literal(value),
        Aliasable::Ref(node_ref) => alias_json(node_ref, paths),
    }
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Map<_, _>>(),
    )
}

fn color(color: &Color) -> Result<Value> {
    Ok(match color {
        Color::Css(s) => Value::String(s.clone()),
        Color::Components {
            color_space,
            components,
            alpha,
            hex,
        } => {
            let mut out = Map::new();
            out.insert("colorSpace".into(), Value::String(color_space.clone()));
            out.insert(
                "components".into(),
                Value::Array(
                    components
                        .iter()
                        .map(|c| match c {
                            Component::Value(v) => number_json(*v),
                            Component::None => Value::String("none".into()),
                        })
                        .collect(),
                ),
            );
            if let Some(alpha) = alpha {
                out.insert("alpha".into(), number_json(*alpha));
            }
            if let Some(hex) = hex {
                out.insert("hex".into(), Value::String(hex.clone()));
            }
            Value::Object(out)
        }
    })
}

fn dimension(d: &Dimension) -> Result<Value> {
    Ok(object([
        ("value", number_json(d.value)),
        ("unit", Value::String(d.unit.as_str().into())),
    ]))
}

fn duration(d: &Duration) -> Result<Value> {
    Ok(object([
        ("value", number_json(d.value)),
        ("unit", Value::String(d.unit.as_str().into())),
    ]))
}

fn cubic_bezier(b: &CubicBezier) -> Result<Value> {
    Ok(Value::Array(b.0.iter().copied().map(number_json).collect()))
}

fn number(n: &f64) -> Result<Value> {
    Ok(number_json(*n))
}

fn font_family(f: &FontFamily) -> Result<Value> {
    Ok(match f {
        FontFamily::Single(name) => Value::String(name.clone()),
        FontFamily::Stack(names) => Value::Array(names.iter().cloned().map(Value::String).collect()),
    })
}

fn font_weight(w: &FontWeight) -> Result<Value> {
    Ok(match w {
        FontWeight::Numeric(n) => number_json(*n),
        FontWeight::Keyword(k) => Value::String(k.clone()),
    })
}

fn stroke_style(s: &StrokeStyle, paths: &PathMap) -> Result<Value> {
    Ok(match s {
        StrokeStyle::Keyword(k) => Value::String(k.as_str().into()),
        StrokeStyle::Custom { dash_array, line_cap } => object([
            (
                "dashArray",
                Value::Array(
                    dash_array
                        .iter()
                        .map(|d| aliasable(d, paths, dimension))
                        .collect::<Result<_>>()?,
                ),
            ),
            ("lineCap", Value::String(line_cap.as_str().into())),
        ]),
    })
}

fn border(b: &Border, paths: &PathMap) -> Result<Value> {
    Ok(object([
        ("color", aliasable(&b.color, paths, color)?),
        ("width", aliasable(&b.width, paths, dimension)?),
        ("style", aliasable(&b.style, paths, |s| stroke_style(s, paths))?),
    ]))
}

fn shadow_layer(layer: &ShadowLayer, paths: &PathMap) -> Result<Value> {
    let mut out = object([
        ("color", aliasable(&layer.color, paths, color)?),
        ("offsetX", aliasable(&layer.offset_x, paths, dimension)?),
        ("offsetY", aliasable(&layer.offset_y, paths, dimension)?),
        ("blur", aliasable(&layer.blur, paths, dimension)?),
        ("spread", aliasable(&layer.spread, paths, dimension)?),
    ]);
    if let (Some(inset), Value::Object(map)) = (layer.inset, &mut out) {
        map.insert("inset".into(), Value::Bool(inset));
    }
    Ok(out)
}

fn gradient_stop(stop: &GradientStop, paths: &PathMap) -> Result<Value> {
    Ok(object([
        ("color", aliasable(&stop.color, paths, color)?),
        ("position", aliasable(&stop.position, paths, number)?),
    ]))
}

fn transition(t: &Transition, paths: &PathMap) -> Result<Value> {
    Ok(object([
        ("duration", aliasable(&t.duration, paths, duration)?),
        ("delay", aliasable(&t.delay, paths, duration)?),
        ("timingFunction", aliasable(&t.timing_function, paths, cubic_bezier)?),
    ]))
}

fn typography(t: &Typography, paths: &PathMap) -> Result<Value> {
    Ok(object([
        ("fontFamily", aliasable(&t.font_family, paths, font_family)?),
        ("fontSize", aliasable(&t.font_size, paths, dimension)?),
        ("fontWeight", aliasable(&t.font_weight, paths, font_weight)?),
        ("letterSpacing", aliasable(&t.letter_spacing, paths, dimension)?),
        ("lineHeight", aliasable(&t.line_height, paths, number)?),
    ]))
}

impl TokenValue {
    /// Encodes the value as canonical JSON, rewriting references through
    /// `paths`.
    ///
    /// Fails with [`SerializeError::DanglingReference`] if a referenced node
    /// has no path.
    pub fn to_json(&self, paths: &PathMap) -> Result<Value> {
        match self {
            TokenValue::Color(c) => color(c),
            TokenValue::Dimension(d) => dimension(d),
            TokenValue::Duration(d) => duration(d),
            TokenValue::CubicBezier(b) => cubic_bezier(b),
            TokenValue::Number(n) => number(n),
            TokenValue::FontFamily(f) => font_family(f),
            TokenValue::FontWeight(w) => font_weight(w),
            TokenValue::StrokeStyle(s) => stroke_style(s, paths),
            TokenValue::Border(b) => border(b, paths),
            TokenValue::Shadow(Shadow::Single(layer)) => shadow_layer(layer, paths),
            TokenValue::Shadow(Shadow::Layers(layers)) => layers
                .iter()
                .map(|layer| shadow_layer(layer, paths))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            TokenValue::Gradient(stops) => stops
                .iter()
                .map(|stop| gradient_stop(stop, paths))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            TokenValue::Transition(t) => transition(t, paths),
            TokenValue::Typography(t) => typography(t, paths),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{validate, DimensionUnit};
    use serde_json::json;

    #[test]
    fn test_number_json_prefers_integers() {
        assert_eq!(number_json(8.0), json!(8));
        assert_eq!(number_json(0.25), json!(0.25));
        assert_eq!(number_json(-3.0), json!(-3));
    }

    #[test]
    fn test_literal_values_survive_encoding() {
        let lookup: HashMap<String, NodeId> = HashMap::new();
        let cases = [
            (crate::types::TokenType::Color, json!({"colorSpace": "srgb", "components": [1, 0.5, "none"], "hex": "#ff8000"})),
            (crate::types::TokenType::CubicBezier, json!([0.25, 0.1, 0.25, 1])),
            (crate::types::TokenType::FontFamily, json!(["Inter", "sans-serif"])),
            (crate::types::TokenType::StrokeStyle, json!({"dashArray": [{"value": 2, "unit": "px"}], "lineCap": "butt"})),
        ];
        for (ty, raw) in cases {
            let value = validate(ty, &raw, &lookup).unwrap();
            assert_eq!(value.to_json(&PathMap::new()).unwrap(), raw, "{}", ty);
        }
    }

    #[test]
    fn test_references_become_alias_strings() {
        let value = TokenValue::Border(Border {
            color: Aliasable::Ref(NodeRef::new(NodeId::from("c"))),
            width: Aliasable::Literal(Dimension::new(1.0, DimensionUnit::Px)),
            style: Aliasable::Literal(StrokeStyle::Keyword(crate::value::StrokeKeyword::Solid)),
        });
        let paths = PathMap::from([(NodeId::from("c"), "colors.black".to_string())]);
        assert_eq!(
            value.to_json(&paths).unwrap(),
            json!({"color": "{colors.black}", "width": {"value": 1, "unit": "px"}, "style": "solid"})
        );
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let value = TokenValue::Gradient(vec![GradientStop {
            color: Aliasable::Ref(NodeRef::new(NodeId::from("gone"))),
            position: Aliasable::Literal(0.0),
        }]);
        assert!(matches!(
            value.to_json(&PathMap::new()),
            Err(SerializeError::DanglingReference(id)) if id == NodeId::from("gone")
        ));
    }
}
