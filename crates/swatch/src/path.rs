//! Node names, dot paths and alias strings.
//!
//! A path is the dot-joined chain of group and token names from the document
//! root to a node. Aliases address tokens by path: `{colors.brand.primary}`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel name for a token that lives at its group's own path.
pub const ROOT_NAME: &str = "$root";

/// Properties that describe a node rather than name a child.
pub(crate) const RESERVED_PROPERTIES: &[&str] = &[
    "$type",
    "$value",
    "$description",
    "$deprecated",
    "$extensions",
    "$schema",
];

static ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([^{}]+)\}$").expect("valid alias regex"));

/// Checks a node name against the naming rules.
///
/// Names must not start with `$` (except the `$root` sentinel) and must not
/// contain `{`, `}` or `.`.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name == ROOT_NAME {
        return Ok(());
    }
    if name.is_empty() {
        return Err("names must not be empty".to_string());
    }
    if name.starts_with('$') {
        return Err(format!("name '{}' must not start with '$'", name));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '{' | '}' | '.')) {
        return Err(format!("name '{}' must not contain '{}'", name, c));
    }
    Ok(())
}

/// Returns the referenced path if `value` is a well-formed alias.
///
/// # Example
///
/// ```rust
/// use swatch::parse_alias;
///
/// assert_eq!(parse_alias("{spacing.base}"), Some("spacing.base"));
/// assert_eq!(parse_alias("{colors.$root}"), Some("colors.$root"));
/// assert_eq!(parse_alias("spacing.base"), None);
/// assert_eq!(parse_alias("{a..b}"), None);
/// ```
pub fn parse_alias(value: &str) -> Option<&str> {
    let path = ALIAS.captures(value)?.get(1)?.as_str();
    path.split('.')
        .all(|segment| validate_name(segment).is_ok())
        .then_some(path)
}

/// Formats `path` as an alias string.
pub fn format_alias(path: &str) -> String {
    format!("{{{}}}", path)
}

/// Appends a segment to a dot path.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_plain_names() {
        for name in ["color", "brand-primary", "space 2", "größe", "$root", "100"] {
            assert!(validate_name(name).is_ok(), "rejected {:?}", name);
        }
    }

    #[test]
    fn test_validate_name_rejects_reserved() {
        for name in ["$bad", "$value", "a.b", "{a}", "a}", ""] {
            assert!(validate_name(name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn test_parse_alias() {
        assert_eq!(parse_alias("{a}"), Some("a"));
        assert_eq!(parse_alias("{a.b.c}"), Some("a.b.c"));
        assert_eq!(parse_alias(" {a}"), None);
        assert_eq!(parse_alias("{}"), None);
        assert_eq!(parse_alias("{a.$bad}"), None);
        assert_eq!(parse_alias("{{a}}"), None);
        assert_eq!(parse_alias("#ff0000"), None);
    }

    #[test]
    fn test_join_and_format() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b"), "a.b");
        assert_eq!(format_alias("a.b"), "{a.b}");
    }
}
