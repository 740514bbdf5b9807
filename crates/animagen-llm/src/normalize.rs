//! Script normalization and the canonical scene guarantee
//!
//! Generated scripts arrive wrapped in markdown fences, padded with blank
//! lines, or missing the canonical `GeneratedScene` class entirely. The
//! normalizer strips the formatting artifacts; the wrapper is a last-resort
//! structural guarantee that the renderer has an entry point to invoke. It
//! does not validate that the wrapped body is coherent Python.

use regex::Regex;
use std::sync::OnceLock;

/// Canonical entry-point class the render tool is invoked against
pub const SCENE_CLASS: &str = "GeneratedScene";

/// Entry method on the canonical class
pub const SCENE_METHOD: &str = "construct";

fn scene_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"class\s+(\w+)\s*\([^)]*Scene[^)]*\)").expect("valid regex"))
}

/// Strip markdown code fences and surrounding blank lines
///
/// Removes a leading fence line (optional language hint) and a trailing
/// fence line if present, then trims fully-blank leading/trailing lines.
/// Interior blank lines and all indentation are preserved.
pub fn strip_code_fences(code: &str) -> String {
    let mut lines: Vec<&str> = code.lines().collect();

    trim_blank_edges(&mut lines);

    if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim() == "```") {
        lines.pop();
    }

    trim_blank_edges(&mut lines);

    lines.join("\n")
}

fn trim_blank_edges(lines: &mut Vec<&str>) {
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

/// Wrap a script body that lacks the canonical class
///
/// Produces a module defining `GeneratedScene` with a single `construct`
/// method, re-indenting every non-blank original line by one level (8
/// spaces) under it.
pub fn wrap_in_scene(body: &str) -> String {
    let mut script = format!(
        "from manim import *\n\nclass {}(Scene):\n    def {}(self):\n",
        SCENE_CLASS, SCENE_METHOD
    );
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        script.push_str("        ");
        script.push_str(line);
        script.push('\n');
    }
    script
}

/// Guarantee the canonical class is present, wrapping if needed
pub fn ensure_canonical_scene(code: &str) -> String {
    if code.contains(&format!("class {}", SCENE_CLASS)) {
        code.to_string()
    } else {
        wrap_in_scene(code)
    }
}

/// Detect the scene class name the renderer should be invoked against
///
/// Falls back to the canonical name when no `class X(...Scene...)`
/// definition is found.
pub fn scene_class_name(code: &str) -> String {
    scene_class_re()
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| SCENE_CLASS.to_string())
}
