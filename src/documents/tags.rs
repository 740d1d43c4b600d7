//! `{{KEY}}` placeholders.
//!
//! Matching is an exact literal substring search: no wildcards, nesting or
//! escaping. A key with no entry in the data is left in the text as-is.

use lazy_static::lazy_static;
use regex::Regex;

use super::value::DocumentData;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"\{\{([^{}]+)\}\}").unwrap();
}

pub const TAG_OPEN: &str = "{{";

pub fn tag_for(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}

/// Applies every entry of `data` in key order.
pub fn replace_tags(text: &str, data: &DocumentData) -> String {
    if !text.contains(TAG_OPEN) {
        return text.to_string();
    }
    let mut out = text.to_string();
    for (key, value) in data {
        let tag = tag_for(key);
        if out.contains(&tag) {
            out = out.replace(&tag, &value.render());
        }
    }
    out
}

pub fn contains_tag(text: &str, key: &str) -> bool {
    text.contains(&tag_for(key))
}

/// Keys of every placeholder still present in `text`, in order of appearance.
pub fn find_tags(text: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
