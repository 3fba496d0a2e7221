//! Syntax highlighting for fenced code blocks

use once_cell::sync::Lazy;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Colour scheme used for highlighted code
pub const DEFAULT_CODE_THEME: &str = "InspiredGitHub";

/// Pretty-printer for code blocks, keyed by language name
pub trait Highlighter {
    /// Highlighted HTML for `code`, or `None` if `language` is not known
    fn highlight(&self, code: &str, language: &str) -> Option<String>;
}

/// Highlights with syntect's bundled syntaxes, emitting inline styles
///
/// Inline styles rather than CSS classes, since most mail clients drop
/// stylesheets.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl SyntectHighlighter {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_THEME)
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Option<String> {
        // Accepts names ("python") as well as extensions ("py")
        let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
        let theme = THEME_SET.themes.get(&self.theme)?;
        highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_by_name_and_extension() {
        let highlighter = SyntectHighlighter::default();

        let by_name = highlighter.highlight("print(1)\n", "python").unwrap();
        let by_extension = highlighter.highlight("print(1)\n", "py").unwrap();

        assert!(by_name.starts_with("<pre style="));
        assert!(by_name.contains("<span style="));
        assert_eq!(by_name, by_extension);
    }

    #[test]
    fn unknown_language_is_none() {
        let highlighter = SyntectHighlighter::default();
        assert!(highlighter.highlight("x", "no-such-language").is_none());
    }

    #[test]
    fn unknown_theme_is_none() {
        let highlighter = SyntectHighlighter::new("No Such Theme");
        assert!(highlighter.highlight("print(1)\n", "python").is_none());
    }
}
