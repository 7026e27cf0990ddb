use super::render::Declaration;
use super::EmitOptions;

/// Wraps declarations in one selector block.
pub(crate) fn write(decls: &[Declaration], options: &EmitOptions) -> String {
    let mut out = format!("{} {{\n", options.selector);
    for decl in decls {
        out.push_str(&format!("{}--{}: {};\n", options.indent, decl.name, decl.value));
    }
    out.push_str("}\n");
    out
}
