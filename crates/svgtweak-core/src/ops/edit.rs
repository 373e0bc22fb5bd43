//! delete, edit, clone and group.

use super::Outcome;
use crate::attr::{self, AttributeSet};
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate::{self, CloneOptions, Edit};
use crate::num::fmt_number;
use crate::selector::{Index, Selection, ShapeSet, Target};

/// Removes every selected element.
pub fn delete(doc: &str, selection: &Selection) -> Result<Outcome> {
    let spans = locate::locate_spans(doc, selection, ShapeSet::Editable)?;
    let (out, removed) = mutate::remove_spans(doc, &spans);
    Ok(Outcome::changed(
        out,
        format!("Deleted {} {} element(s)", removed.len(), selection.label()),
    ))
}

/// `true` for the bare `svg` selector, which addresses the root element only.
fn is_root_selector(selection: &Selection) -> bool {
    matches!(
        selection.terms.as_slice(),
        [t] if t.index == Index::Every && matches!(&t.target, Target::Tag(n) if n.eq_ignore_ascii_case("svg"))
    )
}

/// Sets (`Some`) or removes (`None`) one attribute on every selected element.
pub fn edit(doc: &str, selection: &Selection, name: &str, value: Option<&str>) -> Result<Outcome> {
    let ranges = if is_root_selector(selection) {
        vec![locate::root_open_tag(doc)?]
    } else {
        locate::locate_spans(doc, selection, ShapeSet::Editable)?
            .iter()
            .map(|s| s.start..s.open_end)
            .collect()
    };

    let edits = ranges
        .iter()
        .map(|r| {
            let open = &doc[r.clone()];
            let rewritten = match value {
                Some(v) => attr::set_attribute(open, name, v),
                None => attr::remove_attribute(open, name),
            };
            Edit::replace(r.clone(), rewritten)
        })
        .collect::<Vec<_>>();
    let out = mutate::apply_edits(doc, edits)?;

    let message = match value {
        Some(v) => format!(
            "Modified {} {} element(s): {name}=\"{v}\"",
            ranges.len(),
            selection.label()
        ),
        None => format!(
            "Removed {name} from {} {} element(s)",
            ranges.len(),
            selection.label()
        ),
    };
    Ok(Outcome::changed(out, message))
}

/// Inserts offset copies of one element right after it.
pub fn clone(doc: &str, selection: &Selection, opts: &CloneOptions) -> Result<Outcome> {
    let span = locate::locate_single(doc, selection, ShapeSet::Editable)?;
    let out = mutate::clone_with_offset(doc, &span, opts);

    let (dx, dy) = (fmt_number(opts.dx), fmt_number(opts.dy));
    let message = if opts.count == 1 {
        let mut m = format!("Cloned {selection}");
        if opts.dx != 0.0 || opts.dy != 0.0 {
            m.push_str(&format!(" with offset ({dx}, {dy})"));
        }
        m
    } else {
        format!(
            "Created {} clones of {selection} with offset ({dx}, {dy}) each",
            opts.count
        )
    };
    Ok(Outcome::changed(out, message))
}

/// Moves the selected elements into a new group appended to the end of the document.
pub fn group(doc: &str, selection: &Selection, id: &str, attrs: &AttributeSet) -> Result<Outcome> {
    if id.trim().is_empty() {
        return Err(Error::usage("Group id must not be empty"));
    }
    let spans = locate::locate_spans(doc, selection, ShapeSet::Groupable)?;
    let out = mutate::wrap_in_group(doc, &spans, id, attrs)?;
    let grouped = spans
        .iter()
        .filter(|s| !spans.iter().any(|o| o.contains(s)))
        .count();
    Ok(Outcome::changed(
        out,
        format!("Created group \"{id}\" with {grouped} element(s)"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<svg viewBox="0 0 100 100"><rect id="bg" width="100" height="100"/><circle r="1"/><circle r="2"/><circle r="3"/></svg>"#;

    fn sel(s: &str) -> Selection {
        Selection::parse(s).unwrap()
    }

    #[test]
    fn delete_reports_count() {
        let out = delete(DOC, &sel("circle:0-1")).unwrap();
        assert_eq!(out.messages, vec!["Deleted 2 circle element(s)"]);
        assert!(!out.document.contains(r#"r="1""#));
        assert!(out.document.contains(r#"<circle r="3"/>"#));
    }

    #[test]
    fn edit_root_only_touches_the_svg_tag() {
        let out = edit(DOC, &sel("svg"), "width", Some("200mm")).unwrap();
        assert!(out.document.starts_with(r#"<svg viewBox="0 0 100 100" width="200mm">"#));
        assert!(out.document.contains(r#"<rect id="bg" width="100""#));
    }

    #[test]
    fn edit_all_circles() {
        let out = edit(DOC, &sel("circle"), "fill", Some("red")).unwrap();
        assert_eq!(out.document.matches(r#"fill="red""#).count(), 3);
        assert_eq!(
            out.messages,
            vec![r#"Modified 3 circle element(s): fill="red""#]
        );
    }

    #[test]
    fn edit_remove() {
        let out = edit(DOC, &sel("rect:0"), "id", None).unwrap();
        assert!(out.document.contains(r#"<rect width="100" height="100"/>"#));
    }

    #[test]
    fn clone_needs_an_index() {
        assert!(matches!(
            clone(DOC, &sel("circle"), &CloneOptions::default()),
            Err(Error::Usage { .. })
        ));
    }

    #[test]
    fn clone_message_mentions_offset() {
        let opts = CloneOptions {
            dx: 5.0,
            ..CloneOptions::default()
        };
        let out = clone(DOC, &sel("circle:-1"), &opts).unwrap();
        assert_eq!(out.messages, vec!["Cloned circle:-1 with offset (5, 0)"]);
        assert!(out.document.contains(r#"<circle r="3" transform="translate(5 0)"/>"#));
    }

    #[test]
    fn group_collects_selection() {
        let out = group(DOC, &sel("circle:0,circle:2"), "dots", &AttributeSet::new()).unwrap();
        assert_eq!(out.messages, vec![r#"Created group "dots" with 2 element(s)"#]);
        assert!(out.document.contains("<g id=\"dots\">\n<circle r=\"1\"/>\n<circle r=\"3\"/>\n</g>\n</svg>"));
    }
}
