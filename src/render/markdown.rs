//! Markdown to HTML

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use tracing::warn;

use super::highlight::Highlighter;

/// Render Markdown to an HTML fragment
///
/// Fenced code blocks with a language tag are handed to `highlighter`.
/// Untagged blocks, and blocks in a language it does not know, are escaped
/// and wrapped in `<pre><code>`.
///
/// Link and image destinations are written out with HTML escaping only, never
/// percent-encoded, so `{{ name }}` references in them survive to the
/// substitution pass.
pub fn to_html(markup: &str, highlighter: &dyn Highlighter) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut events = Vec::new();
    let mut code_block: Option<(Option<String>, String)> = None;
    let mut image: Option<(CowStr, CowStr, String)> = None;

    for event in Parser::new_ext(markup, options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split(|c: char| c.is_whitespace() || c == ',')
                        .next()
                        .filter(|language| !language.is_empty())
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                code_block = Some((language, String::new()));
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = code_block.take() {
                    let block = code_block_html(language.as_deref(), &code, highlighter);
                    events.push(Event::Html(CowStr::from(block)));
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                image = Some((dest_url, title, String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((dest_url, title, alt)) = image.take() {
                    events.push(Event::Html(CowStr::from(image_tag(&dest_url, &title, &alt))));
                }
            }
            Event::Text(text) | Event::Code(text) if image.is_some() => {
                if let Some((_, _, alt)) = image.as_mut() {
                    alt.push_str(&text);
                }
            }
            // Alt text is plain text only
            _ if image.is_some() => {}
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) => {
                events.push(Event::Html(CowStr::from(link_open_tag(
                    link_type, &dest_url, &title,
                ))));
            }
            Event::End(TagEnd::Link) => events.push(Event::Html(CowStr::Borrowed("</a>"))),
            other => events.push(other),
        }
    }

    let mut output = String::with_capacity(markup.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

fn link_open_tag(link_type: LinkType, dest_url: &str, title: &str) -> String {
    let href = match link_type {
        LinkType::Email => format!("mailto:{}", dest_url),
        _ => dest_url.to_string(),
    };
    let mut tag = format!("<a href=\"{}\"", escape_attr(&href));
    if !title.is_empty() {
        tag.push_str(&format!(" title=\"{}\"", escape_attr(title)));
    }
    tag.push('>');
    tag
}

fn image_tag(dest_url: &str, title: &str, alt: &str) -> String {
    let mut tag = format!(
        "<img src=\"{}\" alt=\"{}\"",
        escape_attr(dest_url),
        escape_attr(alt)
    );
    if !title.is_empty() {
        tag.push_str(&format!(" title=\"{}\"", escape_attr(title)));
    }
    tag.push_str(" />");
    tag
}

/// Escape a quoted attribute value, leaving URL characters such as `/` as is
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn code_block_html(language: Option<&str>, code: &str, highlighter: &dyn Highlighter) -> String {
    if let Some(language) = language {
        if let Some(highlighted) = highlighter.highlight(code, language) {
            return highlighted;
        }
        warn!(language, "unknown code block language, rendering without highlighting");
    }
    format!("\n<pre><code>{}</code></pre>\n", tera::escape_html(code))
}
