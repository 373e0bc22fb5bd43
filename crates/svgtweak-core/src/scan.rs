//! Low-level tag scanning over raw SVG text.
//!
//! Everything that needs to find a tag, the end of an opening tag, or a matching close tag goes
//! through these helpers, so the self-closing and nesting edge cases live in one place.
//!
//! All offsets are byte offsets into the document. Every offset returned here points at an ASCII
//! byte (`<` or one past `>`), so slicing the document with them never splits a UTF-8 sequence.

use memchr::memchr;

/// Returns `true` when `b` may terminate a tag name (`<rect ...`, `<g>`, `<circle/>`).
#[inline]
fn is_name_boundary(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
}

#[inline]
fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

#[inline]
fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// When a comment opens at `lt`, the offset just past its `-->` (or the end of the text).
#[inline]
fn comment_end(doc: &str, lt: usize) -> Option<usize> {
    doc[lt..]
        .starts_with("<!--")
        .then(|| doc[lt + 4..].find("-->").map_or(doc.len(), |i| lt + 4 + i + 3))
}

/// Does `doc[pos..]` start with `<tag` followed by a name boundary (case-insensitive)?
pub fn is_open_tag_at(doc: &str, pos: usize, tag: &str) -> bool {
    let bytes = doc.as_bytes();
    let name = tag.as_bytes();
    let name_start = pos + 1;
    let name_end = name_start + name.len();
    if bytes.get(pos) != Some(&b'<') || name_end >= bytes.len() {
        return false;
    }
    bytes[name_start..name_end].eq_ignore_ascii_case(name) && is_name_boundary(bytes[name_end])
}

/// Finds the next `<tag` opening (name-boundary checked, case-insensitive) at or after `from`.
pub fn find_open_tag(doc: &str, tag: &str, from: usize) -> Option<usize> {
    let bytes = doc.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        let lt = pos + memchr(b'<', &bytes[pos..])?;
        if let Some(end) = comment_end(doc, lt) {
            pos = end;
            continue;
        }
        if is_open_tag_at(doc, lt, tag) {
            return Some(lt);
        }
        pos = lt + 1;
    }
    None
}

/// Finds the next `</tag>` (optional whitespace before `>`) at or after `from`.
///
/// Returns `(close_start, close_end)` where `close_end` is one past the `>`.
pub fn find_close_tag(doc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = doc.as_bytes();
    let name = tag.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        let lt = pos + memchr(b'<', &bytes[pos..])?;
        if let Some(end) = comment_end(doc, lt) {
            pos = end;
            continue;
        }
        pos = lt + 1;
        if bytes.get(lt + 1) != Some(&b'/') {
            continue;
        }
        let name_start = lt + 2;
        let name_end = name_start + name.len();
        if name_end > bytes.len() || !bytes[name_start..name_end].eq_ignore_ascii_case(name) {
            continue;
        }
        let mut i = name_end;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) == Some(&b'>') {
            return Some((lt, i + 1));
        }
    }
    None
}

/// Finds the last `</tag` (case-insensitive) in the document.
pub fn rfind_close_tag(doc: &str, tag: &str) -> Option<usize> {
    let bytes = doc.as_bytes();
    let name = tag.as_bytes();
    let mut end = bytes.len();
    while let Some(lt) = memchr::memrchr(b'<', &bytes[..end]) {
        end = lt;
        let name_start = lt + 2;
        let name_end = name_start + name.len();
        if bytes.get(lt + 1) == Some(&b'/')
            && name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && bytes.get(name_end).is_none_or(|b| is_name_boundary(*b))
        {
            return Some(lt);
        }
    }
    None
}

/// Finds the `>` that ends the tag starting at `start`, skipping `>` inside quoted values.
///
/// Returns the offset of the `>` itself.
pub fn find_tag_end(doc: &str, start: usize) -> Option<usize> {
    let bytes = doc.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'"' if !in_single => in_double = !in_double,
            b'\'' if !in_double => in_single = !in_single,
            b'>' if !in_single && !in_double => return Some(i),
            _ => {}
        }
    }
    None
}

/// `true` when the tag whose `>` sits at `gt` is written as `<... />`.
#[inline]
pub fn is_self_closing_end(doc: &str, gt: usize) -> bool {
    gt > 0 && doc.as_bytes()[gt - 1] == b'/'
}

/// Reads the tag name of the opening tag at `pos` (which must point at `<`).
pub fn tag_name_at(doc: &str, pos: usize) -> Option<&str> {
    let bytes = doc.as_bytes();
    if bytes.get(pos) != Some(&b'<') {
        return None;
    }
    let start = pos + 1;
    if !bytes.get(start).is_some_and(|b| is_name_start_char(*b)) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_name_char(bytes[end]) {
        end += 1;
    }
    if end < bytes.len() && !is_name_boundary(bytes[end]) {
        return None;
    }
    Some(&doc[start..end])
}

/// An opening (or self-closing) tag found by [`open_tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTag<'a> {
    pub name: &'a str,
    pub start: usize,
    /// One past the closing `>` of the opening tag.
    pub end: usize,
}

/// Iterates over every opening tag in document order.
///
/// Closing tags, comments, processing instructions and declarations are skipped.
pub fn open_tags(doc: &str) -> OpenTags<'_> {
    OpenTags { doc, pos: 0 }
}

pub struct OpenTags<'a> {
    doc: &'a str,
    pos: usize,
}

impl<'a> Iterator for OpenTags<'a> {
    type Item = OpenTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.doc.as_bytes();
        while self.pos < bytes.len() {
            let lt = self.pos + memchr(b'<', &bytes[self.pos..])?;
            if let Some(end) = comment_end(self.doc, lt) {
                self.pos = end;
                continue;
            }
            let Some(name) = tag_name_at(self.doc, lt) else {
                self.pos = lt + 1;
                continue;
            };
            let end = find_tag_end(self.doc, lt).map_or(bytes.len(), |gt| gt + 1);
            self.pos = end;
            return Some(OpenTag {
                name,
                start: lt,
                end,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_tag_requires_name_boundary() {
        let doc = r#"<svg><rectangle/><rect x="1"/><RECT/></svg>"#;
        assert_eq!(find_open_tag(doc, "rect", 0), Some(17));
        assert_eq!(find_open_tag(doc, "rect", 18), Some(30));
        assert_eq!(find_open_tag(doc, "rect", 31), None);
    }

    #[test]
    fn close_tag_allows_trailing_whitespace() {
        let doc = "<g><g></g ></G></g>";
        assert_eq!(find_close_tag(doc, "g", 3), Some((6, 11)));
        assert_eq!(find_close_tag(doc, "g", 11), Some((11, 15)));
        assert_eq!(rfind_close_tag(doc, "g"), Some(15));
    }

    #[test]
    fn tag_end_skips_quoted_gt() {
        let doc = r#"<text data-x="a>b" y='>'>hi</text>"#;
        let gt = find_tag_end(doc, 0).unwrap();
        assert_eq!(&doc[gt + 1..gt + 3], "hi");
        assert!(!is_self_closing_end(doc, gt));
    }

    #[test]
    fn open_tags_skips_comments_and_closers() {
        let doc = r#"<?xml version="1.0"?><svg><!-- <rect/> --><g><circle r="1"/></g></svg>"#;
        let names: Vec<_> = open_tags(doc).map(|t| t.name).collect();
        assert_eq!(names, vec!["svg", "g", "circle"]);
    }

    #[test]
    fn explicit_tag_search_skips_comments() {
        let doc = "<svg><!-- <circle r=\"9\"/></g> --><g><circle r=\"1\"/></g></svg>";
        let first = find_open_tag(doc, "circle", 0).unwrap();
        assert!(doc[first..].starts_with("<circle r=\"1\""));
        let g = find_open_tag(doc, "g", 0).unwrap();
        let (close, _) = find_close_tag(doc, "g", g).unwrap();
        assert!(close > first);
        assert_eq!(find_open_tag("<!-- <rect/>", "rect", 0), None);
    }

    #[test]
    fn tag_name_handles_mixed_case_names() {
        let doc = r#"<linearGradient id="a">"#;
        assert_eq!(tag_name_at(doc, 0), Some("linearGradient"));
        assert_eq!(tag_name_at("</g>", 0), None);
    }
}
