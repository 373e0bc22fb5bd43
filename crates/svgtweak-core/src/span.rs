use crate::scan;
use std::ops::Range;

/// Where a `<tag` opening begins. Offsets are only valid for the snapshot they were found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMatch {
    pub tag: String,
    pub start: usize,
}

impl ElementMatch {
    pub fn new(tag: impl Into<String>, start: usize) -> Self {
        Self {
            tag: tag.into(),
            start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    SelfClosing,
    Paired { close_start: usize },
    /// No matching close tag; the span only covers the opening tag.
    Unterminated,
}

/// The exact `[start, end)` text range of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
    pub tag: String,
    pub start: usize,
    pub end: usize,
    /// One past the `>` of the opening tag.
    pub open_end: usize,
    pub kind: SpanKind,
    pub text: String,
}

impl ElementSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }

    /// The opening tag alone, e.g. `<g id="a">`.
    pub fn open_tag(&self) -> &str {
        &self.text[..self.open_end - self.start]
    }

    pub fn is_self_closing(&self) -> bool {
        matches!(self.kind, SpanKind::SelfClosing)
    }

    /// `true` when `other` lies entirely within this span.
    pub fn contains(&self, other: &ElementSpan) -> bool {
        self.start <= other.start && other.end <= self.end && self.range() != other.range()
    }
}

/// Materializes the full span of the element whose opening tag starts at `m.start`.
///
/// Paired elements are closed at the matching `</tag>`, counting nested same-name openings so
/// `<g><g/></g>` and `<g><g></g></g>` both resolve to the outer group. When the close tag is
/// missing the span degrades to the opening tag only.
pub fn extract(doc: &str, m: &ElementMatch) -> ElementSpan {
    let Some(gt) = scan::find_tag_end(doc, m.start) else {
        return ElementSpan {
            tag: m.tag.clone(),
            start: m.start,
            end: doc.len(),
            open_end: doc.len(),
            kind: SpanKind::Unterminated,
            text: doc[m.start..].to_string(),
        };
    };
    let open_end = gt + 1;

    let (end, kind) = if scan::is_self_closing_end(doc, gt) {
        (open_end, SpanKind::SelfClosing)
    } else {
        match find_matching_close(doc, &m.tag, open_end) {
            Some((close_start, close_end)) => (close_end, SpanKind::Paired { close_start }),
            None => {
                tracing::debug!(tag = %m.tag, start = m.start, "no matching close tag");
                (open_end, SpanKind::Unterminated)
            }
        }
    };

    ElementSpan {
        tag: m.tag.clone(),
        start: m.start,
        end,
        open_end,
        kind,
        text: doc[m.start..end].to_string(),
    }
}

/// Depth-tracking close search starting just after an opening tag.
fn find_matching_close(doc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let (close_start, close_end) = scan::find_close_tag(doc, tag, pos)?;
        let next_open = scan::find_open_tag(doc, tag, pos).filter(|&o| o < close_start);

        if let Some(open) = next_open {
            let open_end = scan::find_tag_end(doc, open).map_or(doc.len(), |gt| gt + 1);
            if !scan::is_self_closing_end(doc, open_end - 1) {
                depth += 1;
            }
            pos = open_end;
            continue;
        }

        depth -= 1;
        if depth == 0 {
            return Some((close_start, close_end));
        }
        pos = close_end;
    }
}
