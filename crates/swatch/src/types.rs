//! The thirteen token types.

use std::fmt;

/// A token `$type`.
///
/// Eight primitive types carry a single value; five composite types are
/// objects (or arrays) whose sub-fields may each be an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Color,
    Dimension,
    Duration,
    CubicBezier,
    Number,
    FontFamily,
    FontWeight,
    StrokeStyle,
    Border,
    Shadow,
    Gradient,
    Transition,
    Typography,
}

impl TokenType {
    pub const ALL: [TokenType; 13] = [
        TokenType::Color,
        TokenType::Dimension,
        TokenType::Duration,
        TokenType::CubicBezier,
        TokenType::Number,
        TokenType::FontFamily,
        TokenType::FontWeight,
        TokenType::StrokeStyle,
        TokenType::Border,
        TokenType::Shadow,
        TokenType::Gradient,
        TokenType::Transition,
        TokenType::Typography,
    ];

    /// Parses a `$type` string. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// The `$type` spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Color => "color",
            TokenType::Dimension => "dimension",
            TokenType::Duration => "duration",
            TokenType::CubicBezier => "cubicBezier",
            TokenType::Number => "number",
            TokenType::FontFamily => "fontFamily",
            TokenType::FontWeight => "fontWeight",
            TokenType::StrokeStyle => "strokeStyle",
            TokenType::Border => "border",
            TokenType::Shadow => "shadow",
            TokenType::Gradient => "gradient",
            TokenType::Transition => "transition",
            TokenType::Typography => "typography",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            TokenType::Border
                | TokenType::Shadow
                | TokenType::Gradient
                | TokenType::Transition
                | TokenType::Typography
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_type() {
        for ty in TokenType::ALL {
            assert_eq!(TokenType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(TokenType::parse("cubicBezier"), Some(TokenType::CubicBezier));
        assert_eq!(TokenType::parse("cubicbezier"), None);
        assert_eq!(TokenType::parse("Color"), None);
    }

    #[test]
    fn test_composite_split() {
        let composite = TokenType::ALL.iter().filter(|t| t.is_composite()).count();
        assert_eq!(composite, 5);
    }
}
