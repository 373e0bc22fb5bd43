//! Attribute get/set/remove on an element's opening tag.
//!
//! Every function accepts either a whole element text (`<g id="a"><rect/></g>`) or just its
//! opening tag, and only ever looks at the opening tag: attributes of child elements are never
//! read or rewritten.

use crate::scan;
use indexmap::IndexMap;
use std::ops::Range;

/// Ordered attribute edits: `Some(value)` sets, `None` removes.
pub type AttributeSet = IndexMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawAttr {
    name: Range<usize>,
    /// Value without its quotes; empty for a bare attribute.
    value: Range<usize>,
    /// Leading whitespace through the closing quote.
    whole: Range<usize>,
}

/// End of the opening tag (offset of its `>`), or the text length for a truncated tag.
fn open_tag_end(element: &str) -> usize {
    scan::find_tag_end(element, 0).unwrap_or(element.len())
}

fn scan_attributes(element: &str) -> Vec<RawAttr> {
    let bytes = element.as_bytes();
    let end = open_tag_end(element);
    let mut out = Vec::new();

    let mut i = 1;
    while i < end && !bytes[i].is_ascii_whitespace() && bytes[i] != b'/' {
        i += 1;
    }

    loop {
        let ws_start = i;
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end || bytes[i] == b'/' {
            break;
        }

        let name_start = i;
        while i < end && !matches!(bytes[i], b'=' | b'/') && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name = name_start..i;
        if name.is_empty() {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < end && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= end || bytes[j] != b'=' {
            out.push(RawAttr {
                name,
                value: i..i,
                whole: ws_start..i,
            });
            continue;
        }
        j += 1;
        while j < end && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let (value, after) = match bytes.get(j) {
            Some(&q @ (b'"' | b'\'')) => {
                let close = memchr::memchr(q, &bytes[j + 1..end]).map_or(end, |k| j + 1 + k);
                (j + 1..close, (close + 1).min(end))
            }
            _ => {
                let mut k = j;
                while k < end && !bytes[k].is_ascii_whitespace() && bytes[k] != b'/' {
                    k += 1;
                }
                (j..k, k)
            }
        };
        out.push(RawAttr {
            name,
            value,
            whole: ws_start..after,
        });
        i = after;
    }
    out
}

fn find_attr(element: &str, name: &str) -> Option<RawAttr> {
    scan_attributes(element)
        .into_iter()
        .find(|a| element[a.name.clone()].eq_ignore_ascii_case(name))
}

/// All attributes of the opening tag, in source order.
pub fn attributes(element: &str) -> Vec<(&str, &str)> {
    scan_attributes(element)
        .into_iter()
        .map(|a| (&element[a.name], &element[a.value]))
        .collect()
}

/// Reads an attribute value from the opening tag (name matched case-insensitively).
pub fn get_attribute(element: &str, name: &str) -> Option<String> {
    find_attr(element, name).map(|a| element[a.value].to_string())
}

/// Sets `name="value"`, replacing an existing value in place or appending the attribute just
/// before the tag close (`>` or `/>`, after any trailing whitespace is skipped).
pub fn set_attribute(element: &str, name: &str, value: &str) -> String {
    if let Some(attr) = find_attr(element, name) {
        let mut out = String::with_capacity(element.len() + value.len());
        out.push_str(&element[..attr.whole.start]);
        let leading = &element[attr.whole.start..attr.name.start];
        out.push_str(if leading.is_empty() { " " } else { leading });
        out.push_str(&element[attr.name.clone()]);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
        out.push_str(&element[attr.whole.end..]);
        return out;
    }

    let at = insertion_point(element);
    let mut out = String::with_capacity(element.len() + name.len() + value.len() + 4);
    out.push_str(&element[..at]);
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
    out.push_str(&element[at..]);
    out
}

/// Removes the attribute together with its leading whitespace. Missing attributes are a no-op.
pub fn remove_attribute(element: &str, name: &str) -> String {
    match find_attr(element, name) {
        Some(attr) => format!(
            "{}{}",
            &element[..attr.whole.start],
            &element[attr.whole.end..]
        ),
        None => element.to_string(),
    }
}

/// Applies every entry of `set` in order.
pub fn apply_attributes(element: &str, set: &AttributeSet) -> String {
    set.iter()
        .fold(element.to_string(), |acc, (name, value)| match value {
            Some(v) => set_attribute(&acc, name, v),
            None => remove_attribute(&acc, name),
        })
}

fn insertion_point(element: &str) -> usize {
    let bytes = element.as_bytes();
    let mut at = open_tag_end(element);
    if at < bytes.len() && scan::is_self_closing_end(element, at) {
        at -= 1;
    }
    while at > 0 && bytes[at - 1].is_ascii_whitespace() {
        at -= 1;
    }
    at
}
