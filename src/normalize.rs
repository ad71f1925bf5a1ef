// src/normalize.rs
//! Reduces raw page markup to a canonical visible-text form so that
//! comparisons ignore markup-only noise (analytics tags, inline scripts,
//! reformatted whitespace).

use ego_tree::NodeRef;
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Node};

// Elements whose subtree never renders as page text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Normalize raw markup into comparable plain text: parse as a DOM, drop
/// non-rendered subtrees, concatenate text nodes in document order, collapse
/// whitespace runs to single spaces, trim. Deterministic for a given input.
///
/// Malformed input never fails: html5ever recovers from broken markup, and if
/// the DOM walk still yields nothing for a non-empty input we degrade to
/// stripping tags textually.
pub fn normalize(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut visible = String::new();
    collect_visible(document.tree.root(), &mut visible);

    let text = collapse_whitespace(&visible);
    if text.is_empty() && !raw.trim().is_empty() {
        return collapse_whitespace(&strip_tags(raw));
    }
    text
}

fn collect_visible(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Element(el) => {
                if !HIDDEN_ELEMENTS.contains(&el.name()) {
                    collect_visible(child, out);
                }
            }
            Node::Text(t) => {
                out.push_str(&t);
                out.push(' ');
            }
            _ => {}
        }
    }
}

/// Best-effort extraction for markup the tree walk got nothing out of: cut
/// non-rendered blocks wholesale, decode entities, then cut everything that
/// looks like a tag. A page whose only content is script or style must come
/// out empty here too, or invisible edits would read as changes.
fn strip_tags(raw: &str) -> String {
    static RE_HIDDEN: OnceCell<Regex> = OnceCell::new();
    let re_hidden = RE_HIDDEN.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<template\b.*?</template>|<head\b.*?</head>",
        )
        .unwrap()
    });
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());

    let without_hidden = re_hidden.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_hidden).to_string();
    re_tags.replace_all(&decoded, " ").to_string()
}

fn collapse_whitespace(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}
