//! HTML sanitization
//!
//! User text is cleaned against a "relaxed" allow-list: common formatting,
//! list, table, quote and image markup survives, everything else (scripts,
//! event handlers, styles, unknown tags) is stripped.

use ammonia::{Builder, UrlRelative};
use std::collections::{HashMap, HashSet};

const TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd", "div", "dl",
    "dt", "em", "h1", "h2", "h3", "h4", "h5", "h6", "i", "img", "li", "ol", "p", "pre", "q",
    "small", "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "u", "ul",
];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("blockquote", &["cite"]),
    ("col", &["span", "width"]),
    ("colgroup", &["span", "width"]),
    ("img", &["align", "alt", "height", "src", "title", "width"]),
    ("ol", &["start", "type"]),
    ("q", &["cite"]),
    ("table", &["summary", "width"]),
    ("td", &["abbr", "axis", "colspan", "rowspan", "width"]),
    ("th", &["abbr", "axis", "colspan", "rowspan", "scope", "width"]),
    ("ul", &["type"]),
];

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Build the relaxed allow-list profile
fn relaxed() -> Builder<'static> {
    let tag_attributes: HashMap<&str, HashSet<&str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = Builder::empty();
    builder
        .tags(TAGS.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::Deny)
        .clean_content_tags(["script", "style"].into_iter().collect())
        .strip_comments(true)
        .link_rel(None);
    builder
}

/// Strip everything outside the relaxed allow-list from `input`
pub fn clean(input: &str) -> String {
    relaxed().clean(input).to_string()
}
