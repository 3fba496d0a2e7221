//! Second-pass variable substitution
//!
//! Replaces `{{ name }}` references with values from the render context.
//! A reference whose name is not in the context is left exactly as written,
//! and nothing inside a `<pre>` block or an inline `<code>` span is ever
//! touched.

use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("variable pattern is valid")
});

static CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<pre\b.*?</pre>|<code\b.*?</code>").expect("code pattern is valid")
});

/// Substitute `context` into `document`
pub fn substitute(document: &str, context: &BTreeMap<String, String>) -> String {
    if context.is_empty() {
        return document.to_string();
    }

    let mut output = String::with_capacity(document.len());
    let mut last = 0;
    for block in CODE.find_iter(document) {
        output.push_str(&replace_variables(&document[last..block.start()], context));
        output.push_str(block.as_str());
        last = block.end();
    }
    output.push_str(&replace_variables(&document[last..], context));
    output
}

fn replace_variables<'a>(text: &'a str, context: &BTreeMap<String, String>) -> Cow<'a, str> {
    VARIABLE.replace_all(text, |caps: &Captures| match context.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_names() {
        let ctx = context(&[("name", "Ann"), ("team", "Ops")]);
        assert_eq!(
            substitute("<p>Hi {{ name }} from {{team}}</p>", &ctx),
            "<p>Hi Ann from Ops</p>"
        );
    }

    #[test]
    fn leaves_unknown_names_verbatim() {
        let ctx = context(&[("name", "Ann")]);
        assert_eq!(
            substitute("{{ name }} and {{  other  }}", &ctx),
            "Ann and {{  other  }}"
        );
    }

    #[test]
    fn empty_context_is_identity() {
        let document = "<p>{{ name }} {% raw %} {{</p>";
        assert_eq!(substitute(document, &BTreeMap::new()), document);
    }

    #[test]
    fn preformatted_blocks_are_untouched() {
        let ctx = context(&[("name", "Ann")]);
        let document = "<p>{{ name }}</p><pre style=\"x\"><code>{{ name }}</code></pre><p>{{ name }}</p>";
        assert_eq!(
            substitute(document, &ctx),
            "<p>Ann</p><pre style=\"x\"><code>{{ name }}</code></pre><p>Ann</p>"
        );
    }

    #[test]
    fn inline_code_is_untouched() {
        let ctx = context(&[("name", "Ann")]);
        assert_eq!(
            substitute("<p>Use <code style=\"x\">{{ name }}</code>, {{ name }}</p>", &ctx),
            "<p>Use <code style=\"x\">{{ name }}</code>, Ann</p>"
        );
    }

    #[test]
    fn values_are_inserted_as_is() {
        let ctx = context(&[("link", "<a href=\"https://example.com\">here</a>")]);
        assert_eq!(
            substitute("Click {{ link }}", &ctx),
            "Click <a href=\"https://example.com\">here</a>"
        );
    }
}
