//! Offset-based rewrites of a document snapshot.
//!
//! Every function takes the document as `&str` and returns a new `String`. Offsets handed in
//! must come from the same snapshot; batches are applied from the highest offset down so that no
//! edit shifts the offsets of another.

use crate::attr::{self, AttributeSet};
use crate::error::{Error, Result};
use crate::num::fmt_number;
use crate::scan;
use crate::span::ElementSpan;
use std::cmp::Reverse;
use std::ops::Range;

/// One replacement of `range` by `replacement`. An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            replacement: text.into(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            replacement: text.into(),
        }
    }
}

/// Applies a batch of non-overlapping edits computed against one snapshot.
///
/// Insertions sharing an offset land in the order they were given.
pub fn apply_edits(doc: &str, edits: Vec<Edit>) -> Result<String> {
    let mut ordered: Vec<(usize, Edit)> = edits.into_iter().enumerate().collect();
    ordered.sort_by_key(|(i, e)| (Reverse(e.range.start), Reverse(*i)));

    for pair in ordered.windows(2) {
        let (later, earlier) = (&pair[0].1, &pair[1].1);
        if earlier.range.end > later.range.start {
            return Err(Error::OverlappingEdits {
                offset: later.range.start,
            });
        }
    }
    let mut out = doc.to_string();
    for (_, edit) in ordered {
        tracing::debug!(start = edit.range.start, end = edit.range.end, "apply edit");
        out.replace_range(edit.range, &edit.replacement);
    }
    Ok(out)
}

pub fn insert_at(doc: &str, offset: usize, text: &str) -> String {
    let mut out = String::with_capacity(doc.len() + text.len());
    out.push_str(&doc[..offset]);
    out.push_str(text);
    out.push_str(&doc[offset..]);
    out
}

pub fn replace_span(doc: &str, span: &ElementSpan, text: &str) -> String {
    let mut out = doc.to_string();
    out.replace_range(span.range(), text);
    out
}

/// Keeps only the outermost spans, deduplicated and sorted by start.
fn outermost(spans: &[ElementSpan]) -> Vec<&ElementSpan> {
    let mut sorted: Vec<&ElementSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| (s.start, Reverse(s.end)));
    sorted.dedup_by_key(|s| s.start);

    let mut kept: Vec<&ElementSpan> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if kept.last().is_some_and(|k| span.start < k.end) {
            continue;
        }
        kept.push(span);
    }
    kept
}

/// Removes every span, returning the new text and the removed texts in document order.
///
/// Spans nested inside another selected span go away with their ancestor and are not reported
/// separately.
pub fn remove_spans(doc: &str, spans: &[ElementSpan]) -> (String, Vec<String>) {
    let kept = outermost(spans);
    tracing::debug!(
        count = kept.len(),
        bytes = kept.iter().map(|s| s.len()).sum::<usize>(),
        "removing spans"
    );
    let mut out = doc.to_string();
    for span in kept.iter().rev() {
        out.replace_range(span.range(), "");
    }
    let removed = kept.into_iter().map(|s| s.text.clone()).collect();
    (out, removed)
}

/// Inserts `text` right before the last `</svg` of the document.
pub fn insert_before_root_close(doc: &str, text: &str) -> Result<String> {
    let at = scan::rfind_close_tag(doc, "svg").ok_or(Error::NoSvgRoot)?;
    Ok(insert_at(doc, at, text))
}

/// Moves every span into a new `<g id="…">` appended before the root close tag.
pub fn wrap_in_group(
    doc: &str,
    spans: &[ElementSpan],
    id: &str,
    attrs: &AttributeSet,
) -> Result<String> {
    let (rest, removed) = remove_spans(doc, spans);

    let mut group = format!(r#"<g id="{id}""#);
    for (name, value) in attrs {
        if let Some(value) = value {
            group.push_str(&format!(r#" {name}="{value}""#));
        }
    }
    group.push_str(">\n");
    group.push_str(&removed.join("\n"));
    group.push_str("\n</g>\n");

    insert_before_root_close(&rest, &group)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloneOptions {
    pub dx: f64,
    pub dy: f64,
    pub count: usize,
    pub overrides: AttributeSet,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            count: 1,
            overrides: AttributeSet::new(),
        }
    }
}

/// Builds copy number `i` (1-based) of `element`.
fn clone_copy(element: &str, i: usize, opts: &CloneOptions) -> String {
    let step = i as f64;
    let (ox, oy) = (opts.dx * step, opts.dy * step);

    let mut copy = element.to_string();
    if ox != 0.0 || oy != 0.0 {
        let translate = format!("translate({} {})", fmt_number(ox), fmt_number(oy));
        let transform = match attr::get_attribute(&copy, "transform") {
            Some(existing) => format!("{translate} {existing}"),
            None => translate,
        };
        copy = attr::set_attribute(&copy, "transform", &transform);
    }

    let mut overrides = opts.overrides.clone();
    match overrides.get("id").cloned() {
        Some(Some(id)) if opts.count > 1 => {
            overrides.insert("id".to_string(), Some(format!("{id}-{i}")));
        }
        Some(_) => {}
        None => {
            overrides.insert("id".to_string(), None);
        }
    }
    attr::apply_attributes(&copy, &overrides)
}

/// Inserts `opts.count` copies of `span` right after it, each on its own line.
pub fn clone_with_offset(doc: &str, span: &ElementSpan, opts: &CloneOptions) -> String {
    let mut copies = String::new();
    for i in 1..=opts.count {
        copies.push('\n');
        copies.push_str(&clone_copy(&span.text, i, opts));
    }
    insert_at(doc, span.end, &copies)
}

/// The paired form of a self-closing element: `<tag …/>` becomes `<tag …>inner</tag>`.
///
/// Paired elements get `inner` appended before their close tag.
pub fn paired_element(span: &ElementSpan, inner: &str) -> String {
    let open = span.open_tag();
    if span.is_self_closing() {
        let head = open[..open.len() - 2].trim_end();
        return format!("{head}>{inner}</{}>", span.tag);
    }
    match span.kind {
        crate::span::SpanKind::Paired { close_start } => {
            let split = close_start - span.start;
            format!("{}{inner}{}", &span.text[..split], &span.text[split..])
        }
        _ => format!("{}{inner}</{}>", span.text, span.tag),
    }
}

pub fn convert_self_closing_to_paired(doc: &str, span: &ElementSpan, inner: &str) -> String {
    replace_span(doc, span, &paired_element(span, inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{ElementMatch, extract};

    fn span(doc: &str, tag: &str) -> ElementSpan {
        let start = scan::find_open_tag(doc, tag, 0).unwrap();
        extract(doc, &ElementMatch::new(tag, start))
    }

    #[test]
    fn edits_apply_from_the_end() {
        let out = apply_edits(
            "abcdef",
            vec![Edit::insert(1, "X"), Edit::replace(3..5, "YY"), Edit::replace(5..6, "")],
        )
        .unwrap();
        assert_eq!(out, "aXbcYY");
    }

    #[test]
    fn same_offset_inserts_keep_order() {
        let out = apply_edits("ab", vec![Edit::insert(1, "1"), Edit::insert(1, "2")]).unwrap();
        assert_eq!(out, "a12b");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let err = apply_edits("abcdef", vec![Edit::replace(1..4, ""), Edit::replace(3..5, "")]).unwrap_err();
        assert!(matches!(err, Error::OverlappingEdits { offset: 3 }));
    }

    #[test]
    fn nested_spans_are_removed_with_their_ancestor() {
        let doc = r#"<svg><g><circle r="1"/></g><rect/></svg>"#;
        let g = span(doc, "g");
        let c = span(doc, "circle");
        let (out, removed) = remove_spans(doc, &[c, g.clone(), g]);
        assert_eq!(out, "<svg><rect/></svg>");
        assert_eq!(removed, vec![r#"<g><circle r="1"/></g>"#.to_string()]);
    }

    #[test]
    fn root_close_insertion_needs_a_root() {
        assert_eq!(
            insert_before_root_close("<svg></svg>", "<g/>").unwrap(),
            "<svg><g/></svg>"
        );
        assert!(matches!(
            insert_before_root_close("<g></g>", "x"),
            Err(Error::NoSvgRoot)
        ));
    }

    #[test]
    fn group_wraps_in_document_order() {
        let doc = "<svg>\n<rect/>\n<circle/>\n</svg>";
        let spans = vec![span(doc, "circle"), span(doc, "rect")];
        let mut attrs = AttributeSet::new();
        attrs.insert("fill".into(), Some("red".into()));
        let out = wrap_in_group(doc, &spans, "grp", &attrs).unwrap();
        assert_eq!(
            out,
            "<svg>\n\n\n<g id=\"grp\" fill=\"red\">\n<rect/>\n<circle/>\n</g>\n</svg>"
        );
    }

    #[test]
    fn clone_prepends_translate_and_strips_id() {
        let doc = r#"<svg><circle id="c" cx="10" transform="scale(2)"/></svg>"#;
        let c = span(doc, "circle");
        let opts = CloneOptions {
            dx: 20.0,
            count: 2,
            ..CloneOptions::default()
        };
        let out = clone_with_offset(doc, &c, &opts);
        assert_eq!(
            out,
            concat!(
                r#"<svg><circle id="c" cx="10" transform="scale(2)"/>"#,
                "\n",
                r#"<circle cx="10" transform="translate(20 0) scale(2)"/>"#,
                "\n",
                r#"<circle cx="10" transform="translate(40 0) scale(2)"/>"#,
                "</svg>"
            )
        );
    }

    #[test]
    fn clone_id_override_is_suffixed_only_for_many() {
        let doc = r#"<svg><rect id="r"/></svg>"#;
        let r = span(doc, "rect");
        let mut overrides = AttributeSet::new();
        overrides.insert("id".into(), Some("copy".into()));

        let one = CloneOptions {
            overrides: overrides.clone(),
            ..CloneOptions::default()
        };
        assert!(clone_with_offset(doc, &r, &one).contains(r#"<rect id="copy"/>"#));

        let many = CloneOptions {
            count: 2,
            overrides,
            ..CloneOptions::default()
        };
        let out = clone_with_offset(doc, &r, &many);
        assert!(out.contains(r#"<rect id="copy-1"/>"#));
        assert!(out.contains(r#"<rect id="copy-2"/>"#));
    }

    #[test]
    fn self_closing_becomes_paired() {
        let doc = r#"<svg><circle r="1" /></svg>"#;
        let c = span(doc, "circle");
        assert_eq!(
            convert_self_closing_to_paired(doc, &c, "<animate/>"),
            r#"<svg><circle r="1"><animate/></circle></svg>"#
        );
    }

    #[test]
    fn paired_element_appends_before_close() {
        let doc = r#"<svg><g id="a"><rect/></g></svg>"#;
        let g = span(doc, "g");
        assert_eq!(paired_element(&g, "<set/>"), r#"<g id="a"><rect/><set/></g>"#);
    }
}
