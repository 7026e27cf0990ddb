use super::render::Declaration;

/// One variable assignment per line, no wrapper.
///
/// Sass evaluates assignments in order, so a binding to a variable declared
/// further down fails to compile. Tree order is kept regardless.
pub(crate) fn write(decls: &[Declaration]) -> String {
    decls
        .iter()
        .map(|decl| format!("${}: {};\n", decl.name, decl.value))
        .collect()
}
