/// Cosmetic rewrite of bracket-style math delimiters to dollar-style
/// before text reaches the browser renderer.
pub fn normalize_math_delimiters(text: &str) -> String {
    text.replace("\\[", "$$")
        .replace("\\]", "$$")
        .replace("\\(", "$")
        .replace("\\)", "$")
        .replace("$$$", "$$")
        .replace(" ,", " \\cdot ")
}
