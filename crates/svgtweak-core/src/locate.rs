use crate::error::{Error, Result};
use crate::scan;
use crate::selector::{Selection, SelectorTerm, ShapeSet, Target};
use crate::span::{self, ElementMatch, ElementSpan};
use std::ops::Range;

/// All `<tag` openings in document order. `tag` is matched case-insensitively; the returned
/// matches carry the name as written in the document.
pub fn find_all(doc: &str, tag: &str) -> Vec<ElementMatch> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = scan::find_open_tag(doc, tag, pos) {
        let written = &doc[start + 1..start + 1 + tag.len()];
        out.push(ElementMatch::new(written, start));
        pos = start + 1;
    }
    out
}

/// Openings of any tag in `tags`, in document order.
pub fn find_any(doc: &str, tags: &[&str]) -> Vec<ElementMatch> {
    scan::open_tags(doc)
        .filter(|t| tags.iter().any(|want| want.eq_ignore_ascii_case(t.name)))
        .map(|t| ElementMatch::new(t.name, t.start))
        .collect()
}

fn candidates(doc: &str, term: &SelectorTerm, set: ShapeSet) -> Vec<ElementMatch> {
    match &term.target {
        Target::Tag(tag) => find_all(doc, tag),
        Target::All => find_any(doc, set.tags()),
    }
}

/// Resolves a selection to element matches, deduplicated and in document order.
///
/// Fails with [`Error::NoMatch`] when nothing is selected, and with [`Error::IndexOutOfRange`]
/// when the selection is a single explicit index outside the candidate list. Out-of-range
/// ordinals inside ranges or unions are skipped.
pub fn locate(doc: &str, selection: &Selection, set: ShapeSet) -> Result<Vec<ElementMatch>> {
    let mut picked: Vec<ElementMatch> = Vec::new();
    let mut total_candidates = 0usize;

    for term in &selection.terms {
        let found = candidates(doc, term, set);
        total_candidates += found.len();
        let ordinals = term.ordinals(found.len());
        tracing::debug!(
            term = %term,
            candidates = found.len(),
            picked = ordinals.len(),
            "resolved selector term"
        );

        if ordinals.is_empty() && !found.is_empty() && selection.is_single_index() {
            return Err(Error::IndexOutOfRange {
                selector: term.to_string(),
                count: found.len(),
            });
        }
        picked.extend(ordinals.into_iter().map(|i| found[i].clone()));
    }

    if total_candidates == 0 || picked.is_empty() {
        return Err(Error::NoMatch {
            selector: selection.label(),
        });
    }

    picked.sort_by_key(|m| m.start);
    picked.dedup_by_key(|m| m.start);
    Ok(picked)
}

/// [`locate`] followed by span extraction against the same snapshot.
pub fn locate_spans(doc: &str, selection: &Selection, set: ShapeSet) -> Result<Vec<ElementSpan>> {
    Ok(locate(doc, selection, set)?
        .iter()
        .map(|m| span::extract(doc, m))
        .collect())
}

/// Locates the one element a single-target operation works on.
pub fn locate_single(doc: &str, selection: &Selection, set: ShapeSet) -> Result<ElementSpan> {
    selection.require_single()?;
    let matches = locate(doc, selection, set)?;
    let m = matches.first().ok_or_else(|| Error::NoMatch {
        selector: selection.label(),
    })?;
    Ok(span::extract(doc, m))
}

/// Locates the root `<svg ...>` opening tag; the range covers just that tag.
pub fn root_open_tag(doc: &str) -> Result<Range<usize>> {
    let start = scan::find_open_tag(doc, "svg", 0).ok_or(Error::NoSvgRoot)?;
    let gt = scan::find_tag_end(doc, start).ok_or(Error::NoSvgRoot)?;
    Ok(start..gt + 1)
}

/// `true` when some element carries `id="<id>"` (either quote style).
pub fn has_id(doc: &str, id: &str) -> bool {
    scan::open_tags(doc).any(|t| {
        crate::attr::get_attribute(&doc[t.start..t.end], "id").is_some_and(|v| v == id)
    })
}
