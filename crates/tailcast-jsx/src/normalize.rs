//! Source normalization ahead of compilation.
//!
//! Input is assumed fence-free: markdown fences and comment spans are
//! stripped when generated code is received, not here.

use std::sync::LazyLock;

use regex::Regex;

/// Name given to bare JSX snippets that arrive without an enclosing function.
pub const FALLBACK_COMPONENT: &str = "GeneratedComponent";

static RE_IMPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^import\s.+?;$").unwrap());
static RE_EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\s+").unwrap());
static RE_COMPONENT_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+[A-Z][A-Za-z0-9_]*\s*\(").unwrap());
static RE_COMPONENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+([A-Z][A-Za-z0-9_]*)").unwrap());

/// Strip imports and `export default`, and wrap bare JSX in a component.
pub fn normalize(raw: &str) -> String {
    let code = RE_IMPORT.replace_all(raw, "");
    let code = RE_EXPORT_DEFAULT.replace_all(&code, "");
    let code = code.trim();

    if RE_COMPONENT_DECL.is_match(code) {
        code.to_string()
    } else {
        format!("function {FALLBACK_COMPONENT}() {{\n  return (\n    <>\n{code}\n    </>\n  );\n}}")
    }
}

/// First capitalized function name in normalized source.
///
/// Call this on the output of [`normalize`], which may be what introduces
/// the name.
pub fn find_name(normalized: &str) -> &str {
    RE_COMPONENT_NAME
        .captures(normalized)
        .and_then(|caps| caps.get(1))
        .map_or(FALLBACK_COMPONENT, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_jsx_is_wrapped() {
        let out = normalize("<div>x</div>");
        assert!(out.contains("function GeneratedComponent()"));
        assert!(out.contains("<div>x</div>"));
        assert_eq!(find_name(&out), "GeneratedComponent");
    }

    #[test]
    fn test_import_stripped_component_kept() {
        let out = normalize("import x from 'y';\nfunction Foo(){return <div/>}");
        assert_eq!(out, "function Foo(){return <div/>}");
        assert_eq!(find_name(&out), "Foo");
    }

    #[test]
    fn test_export_default_removed_anywhere() {
        let out = normalize("import React from 'react';\r\nexport default function Card() { return <p/>; }");
        assert_eq!(out, "function Card() { return <p/>; }");
    }

    #[test]
    fn test_multiline_import_is_left_alone() {
        let out = normalize("import {\n  a,\n} from 'b';\nfunction A() { return null }");
        assert!(out.starts_with("import {"));
    }

    #[test]
    fn test_lowercase_function_is_not_a_component() {
        let out = normalize("function helper() { return 1 }\n<span/>");
        assert_eq!(find_name(&out), "GeneratedComponent");
        assert!(out.contains("function helper()"));
    }

    #[test]
    fn test_first_component_name_wins() {
        let out = normalize("function Header() { return <h1/> }\nfunction Footer() { return <p/> }");
        assert_eq!(find_name(&out), "Header");
    }
}
