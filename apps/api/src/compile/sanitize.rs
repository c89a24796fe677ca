//! Removes pdfTeX-only primitives that break XeTeX-based engines such as Tectonic.

/// Literal invocations stripped from every document before compilation.
pub const INCOMPATIBLE_MACROS: [&str; 4] = [
    "\\input{glyphtounicode}",
    "\\pdfgentounicode=1",
    "\\pdfminorversion=7",
    "\\pdfobjcompresslevel=0",
];

/// Strips every `INCOMPATIBLE_MACROS` occurrence.
///
/// Runs to a fixed point: removing one occurrence can join its neighbours into a
/// new one, so a single pass would not be idempotent.
pub fn sanitize_latex(latex: &str) -> String {
    let mut current = latex.to_string();
    loop {
        let next = INCOMPATIBLE_MACROS
            .iter()
            .fold(current.clone(), |text, needle| text.replace(needle, ""));
        if next == current {
            return current;
        }
        current = next;
    }
}
