//! Rough LaTeX text extraction used by the alignment metrics.

use std::sync::LazyLock;

use regex::Regex;

static RESUME_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\resumeItem\{(.+?)\}").expect("valid regex"));
static COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?(?:\{[^}]*\})?").expect("valid regex")
});
static BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}\\]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Bodies of `\resumeItem{...}` bullets, whitespace-collapsed. Empty bodies are dropped.
///
/// The match is non-greedy, so a body stops at its first closing brace.
pub fn extract_resume_items(latex: &str) -> Vec<String> {
    RESUME_ITEM
        .captures_iter(latex)
        .map(|c| collapse_whitespace(&c[1]))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Drops `\command*[opt]{arg}` forms, then any stray braces and backslashes.
///
/// Only the first brace argument goes with its command, and it ends at the first `}`,
/// so `\href{url}{label}` keeps `label` while `\textbf{Rust}` disappears entirely.
pub fn strip_latex_commands(latex: &str) -> String {
    let without_commands = COMMAND.replace_all(latex, " ");
    let without_braces = BRACES.replace_all(&without_commands, " ");
    collapse_whitespace(&without_braces)
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}
