//! Two-pass email rendering
//!
//! Pass one turns Markdown into a complete HTML document: code blocks are
//! highlighted, the result is wrapped in the outer template together with
//! the theme stylesheet, and every CSS rule is inlined into `style`
//! attributes. Pass two substitutes user variables into that document.
//!
//! Inlining runs before substitution so that values supplied on the
//! command line are never matched by theme selectors.

mod highlight;
mod markdown;
mod substitute;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tera::{Context, Tera};
use tracing::debug;

use crate::error::{MaildownError, MaildownResult};

pub use highlight::{Highlighter, SyntectHighlighter, DEFAULT_CODE_THEME};

/// Stylesheet used when no theme is given
pub const DEFAULT_THEME: &str = include_str!("style.css");

const OUTER_TEMPLATE: &str = include_str!("template.html");

/// Read the theme stylesheet at `path`, or the bundled default
pub fn load_theme(path: Option<&Path>) -> MaildownResult<String> {
    match path {
        None => Ok(DEFAULT_THEME.to_string()),
        Some(path) => fs::read_to_string(path)
            .map_err(|e| MaildownError::ThemeNotFound(format!("{}: {}", path.display(), e))),
    }
}

/// Output of the first pass: a full HTML document with all styles inline
/// and user variable references still in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedDocument(String);

impl InlinedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Run the second pass
    pub fn substitute(&self, context: &BTreeMap<String, String>) -> String {
        substitute::substitute(&self.0, context)
    }
}

/// Markdown email renderer
pub struct Renderer {
    highlighter: Box<dyn Highlighter>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_highlighter(Box::new(SyntectHighlighter::default()))
    }

    pub fn with_highlighter(highlighter: Box<dyn Highlighter>) -> Self {
        Self { highlighter }
    }

    /// Render `markup` into a styled, self-contained HTML document
    pub fn render(
        &self,
        markup: &str,
        theme_css: &str,
        context: &BTreeMap<String, String>,
    ) -> MaildownResult<String> {
        let document = self.inline(markup, theme_css)?;
        Ok(document.substitute(context))
    }

    /// First pass only
    pub fn inline(&self, markup: &str, theme_css: &str) -> MaildownResult<InlinedDocument> {
        let body = markdown::to_html(markup, self.highlighter.as_ref());

        let mut context = Context::new();
        context.insert("content", &body);
        context.insert("stylesheet", theme_css);
        let document = Tera::one_off(OUTER_TEMPLATE, &context, false)?;

        let inlined = css_inline::inline(&document)
            .map_err(|e| MaildownError::Render(format!("Failed to inline CSS: {}", e)))?;
        debug!(
            markup_bytes = markup.len(),
            html_bytes = inlined.len(),
            "rendered document"
        );
        Ok(InlinedDocument(inlined))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
