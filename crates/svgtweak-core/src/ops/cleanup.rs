//! Removal of animations and of definitions.

use super::Outcome;
use crate::attr;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate::{self, Edit};
use crate::scan;
use crate::span::{self, ElementSpan};
use regex::Regex;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::OnceLock;

const ANIMATION_TAGS: &[&str] = &["animate", "animateTransform", "animateMotion", "set"];

/// Presentation attributes that may point at a definition through `url(#id)`.
const REFERENCE_ATTRS: &[&str] = &["filter", "mask", "clip-path", "fill", "stroke"];

/// Removes every SMIL animation element.
pub fn remove_animations(doc: &str) -> Result<Outcome> {
    let spans: Vec<ElementSpan> = locate::find_any(doc, ANIMATION_TAGS)
        .iter()
        .map(|m| span::extract(doc, m))
        .collect();
    let message = format!("Removed {} animation element(s)", spans.len());
    if spans.is_empty() {
        return Ok(Outcome::unchanged(doc, message));
    }
    let (out, _) = mutate::remove_spans(doc, &spans);
    Ok(Outcome::changed(out, message))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefsKind {
    Gradients,
    Filters,
    Patterns,
    Markers,
    Masks,
    ClipPaths,
}

impl DefsKind {
    pub const ALL: [DefsKind; 6] = [
        Self::Gradients,
        Self::Filters,
        Self::Patterns,
        Self::Markers,
        Self::Masks,
        Self::ClipPaths,
    ];

    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Gradients => &["linearGradient", "radialGradient"],
            Self::Filters => &["filter"],
            Self::Patterns => &["pattern"],
            Self::Markers => &["marker"],
            Self::Masks => &["mask"],
            Self::ClipPaths => &["clipPath"],
        }
    }
}

impl FromStr for DefsKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "gradients" => Self::Gradients,
            "filters" => Self::Filters,
            "patterns" => Self::Patterns,
            "markers" => Self::Markers,
            "masks" => Self::Masks,
            "clip-paths" => Self::ClipPaths,
            other => return Err(Error::invalid_option("remove-defs", other)),
        })
    }
}

fn url_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*url\(\s*['"]?#([^'")\s]+)['"]?\s*\)"#).expect("valid regex")
    })
}

/// `true` when `id` is referenced through `url(#id)` or `href="#id"` anywhere in `doc`.
fn is_referenced(doc: &str, id: &str) -> bool {
    let id = regex::escape(id);
    let pattern = format!(
        r#"url\(\s*['"]?#{id}['"]?\s*\)|href\s*=\s*["']#{id}["']"#
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(doc))
}

fn all_ids(doc: &str) -> HashSet<String> {
    scan::open_tags(doc)
        .filter_map(|t| attr::get_attribute(&doc[t.start..t.end], "id"))
        .collect()
}

/// Drops `url(#…)` paint and effect references whose target no longer exists.
fn strip_dangling_references(doc: &str) -> Result<String> {
    let ids = all_ids(doc);
    let mut edits = Vec::new();
    for tag in scan::open_tags(doc) {
        let open = &doc[tag.start..tag.end];
        let mut rewritten = open.to_string();
        for &name in REFERENCE_ATTRS {
            let Some(value) = attr::get_attribute(&rewritten, name) else {
                continue;
            };
            let dangling = url_ref_regex()
                .captures(&value)
                .is_some_and(|caps| !ids.contains(&caps[1]));
            if dangling {
                tracing::debug!(attribute = name, %value, "dropping dangling reference");
                rewritten = attr::remove_attribute(&rewritten, name);
            }
        }
        if rewritten != open {
            edits.push(Edit::replace(tag.start..tag.end, rewritten));
        }
    }
    mutate::apply_edits(doc, edits)
}

/// Removes `<defs>` containers that have no element children left.
fn drop_empty_defs(doc: &str) -> String {
    let empty: Vec<ElementSpan> = locate::find_all(doc, "defs")
        .iter()
        .map(|m| span::extract(doc, m))
        .filter(|s| scan::open_tags(&s.text).nth(1).is_none())
        .collect();
    mutate::remove_spans(doc, &empty).0
}

/// Removes id-bearing definitions of the given kinds (every kind when `kinds` is empty).
///
/// With `unused_only`, definitions still referenced by `url(#id)` or `href="#id"` are kept.
/// Afterwards references to ids that no longer exist are stripped and empty `<defs>` dropped.
pub fn remove_defs(doc: &str, kinds: &[DefsKind], unused_only: bool) -> Result<Outcome> {
    let kinds: &[DefsKind] = if kinds.is_empty() { &DefsKind::ALL } else { kinds };
    let mut out = doc.to_string();
    let mut removed = Vec::new();

    for tag in kinds.iter().flat_map(|k| k.tags().iter().copied()) {
        let doomed: Vec<ElementSpan> = locate::find_all(&out, tag)
            .iter()
            .map(|m| span::extract(&out, m))
            .filter(|s| {
                attr::get_attribute(s.open_tag(), "id")
                    .is_some_and(|id| !unused_only || !is_referenced(&out, &id))
            })
            .collect();
        if doomed.is_empty() {
            continue;
        }
        tracing::debug!(tag, count = doomed.len(), "removing definitions");
        removed.push(format!("{} {tag}(s)", doomed.len()));
        out = mutate::remove_spans(&out, &doomed).0;
    }

    let out = drop_empty_defs(&strip_dangling_references(&out)?);
    if removed.is_empty() {
        return Ok(if out == doc {
            Outcome::unchanged(doc, "No definitions removed")
        } else {
            Outcome::changed(out, "No definitions removed")
        });
    }
    Ok(Outcome::changed(out, format!("Removed {}", removed.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<svg><defs><linearGradient id="a"/><radialGradient id="b"/><filter id="blur"><feGaussianBlur stdDeviation="2"/></filter></defs><rect fill="url(#a)" filter="url(#blur)"/><circle stroke="url(#b)"/></svg>"##;

    #[test]
    fn removes_every_animation_kind() {
        let doc = r#"<svg><rect><animate attributeName="x"/><set to="1"/></rect><g><animateTransform type="rotate"/><animateMotion/></g></svg>"#;
        let out = remove_animations(doc).unwrap();
        assert_eq!(out.document, "<svg><rect></rect><g></g></svg>");
        assert_eq!(out.messages, vec!["Removed 4 animation element(s)"]);
    }

    #[test]
    fn nothing_to_remove_is_a_no_op() {
        let out = remove_animations("<svg><rect/></svg>").unwrap();
        assert!(!out.changed);
    }

    #[test]
    fn remove_all_strips_references_and_empty_defs() {
        let out = remove_defs(DOC, &[], false).unwrap();
        assert_eq!(out.document, "<svg><rect/><circle/></svg>");
        assert_eq!(
            out.messages,
            vec!["Removed 1 linearGradient(s), 1 radialGradient(s), 1 filter(s)"]
        );
    }

    #[test]
    fn only_the_chosen_kind() {
        let out = remove_defs(DOC, &[DefsKind::Filters], false).unwrap();
        assert!(out.document.contains(r#"<linearGradient id="a"/>"#));
        assert!(out.document.contains(r##"<rect fill="url(#a)"/>"##));
        assert_eq!(out.messages, vec!["Removed 1 filter(s)"]);
    }

    #[test]
    fn unused_keeps_referenced_definitions() {
        let doc = r##"<svg><defs><linearGradient id="used"/><linearGradient id="spare"/><linearGradient id="base"/><linearGradient id="child" href="#base"/></defs><rect fill="url(#used)"/><rect fill="url(#child)"/></svg>"##;
        let out = remove_defs(doc, &[], true).unwrap();
        assert!(out.document.contains(r#"id="used""#));
        assert!(out.document.contains(r#"id="base""#));
        assert!(!out.document.contains(r#"id="spare""#));
        assert_eq!(out.messages, vec!["Removed 1 linearGradient(s)"]);
    }

    #[test]
    fn definitions_without_id_stay() {
        let doc = "<svg><defs><pattern/></defs></svg>";
        let out = remove_defs(doc, &[], false).unwrap();
        assert!(!out.changed);
        assert_eq!(out.messages, vec!["No definitions removed"]);
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("clip-paths".parse::<DefsKind>().unwrap(), DefsKind::ClipPaths);
        assert!("fonts".parse::<DefsKind>().is_err());
    }
}
