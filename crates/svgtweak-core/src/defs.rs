//! Locates (or lazily creates) the document's `<defs>` container.

use crate::error::{Error, Result};
use crate::locate;
use crate::mutate;
use crate::scan;
use crate::span::{self, ElementMatch};

/// Where new definitions go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefsAnchor {
    /// Just past `<defs …>`, or just past the root `<svg …>` when there is no container yet.
    pub offset: usize,
    pub needs_wrapper: bool,
}

/// Finds the insertion point for definitions without modifying the document.
pub fn resolve_defs_anchor(doc: &str) -> Result<DefsAnchor> {
    if let Some(start) = scan::find_open_tag(doc, "defs", 0) {
        let gt = scan::find_tag_end(doc, start).ok_or(Error::NoSvgRoot)?;
        if !scan::is_self_closing_end(doc, gt) {
            return Ok(DefsAnchor {
                offset: gt + 1,
                needs_wrapper: false,
            });
        }
    }
    let root = locate::root_open_tag(doc)?;
    Ok(DefsAnchor {
        offset: root.end,
        needs_wrapper: true,
    })
}

/// Inserts `content` into the defs container, creating one after the root opening tag when the
/// document has none. A self-closing `<defs/>` is first turned into a paired container.
pub fn insert_definition(doc: &str, content: &str) -> Result<String> {
    if let Some(start) = scan::find_open_tag(doc, "defs", 0) {
        let defs = span::extract(doc, &ElementMatch::new("defs", start));
        if defs.is_self_closing() {
            tracing::debug!(start, "expanding self-closing <defs/>");
            let inner = format!("\n{content}\n");
            return Ok(mutate::convert_self_closing_to_paired(doc, &defs, &inner));
        }
    }

    let anchor = resolve_defs_anchor(doc)?;
    let text = if anchor.needs_wrapper {
        format!("\n<defs>\n{content}\n</defs>")
    } else {
        format!("\n{content}")
    };
    Ok(mutate::insert_at(doc, anchor.offset, &text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAD: &str = r#"<linearGradient id="g1"/>"#;

    #[test]
    fn anchor_after_existing_defs() {
        let doc = r#"<svg><defs id="d"></defs><rect/></svg>"#;
        let anchor = resolve_defs_anchor(doc).unwrap();
        assert_eq!(anchor.offset, r#"<svg><defs id="d">"#.len());
        assert!(!anchor.needs_wrapper);
    }

    #[test]
    fn creates_defs_after_root_open_tag() {
        let doc = r#"<svg width="10"><rect/></svg>"#;
        let out = insert_definition(doc, GRAD).unwrap();
        assert_eq!(
            out,
            format!("<svg width=\"10\">\n<defs>\n{GRAD}\n</defs><rect/></svg>")
        );
    }

    #[test]
    fn appends_into_existing_defs() {
        let doc = "<svg><defs><clipPath id=\"c\"/></defs></svg>";
        let out = insert_definition(doc, GRAD).unwrap();
        assert_eq!(
            out,
            format!("<svg><defs>\n{GRAD}<clipPath id=\"c\"/></defs></svg>")
        );
    }

    #[test]
    fn expands_self_closing_defs() {
        let doc = "<svg><defs/><rect/></svg>";
        let out = insert_definition(doc, GRAD).unwrap();
        assert_eq!(out, format!("<svg><defs>\n{GRAD}\n</defs><rect/></svg>"));
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(matches!(
            insert_definition("<g></g>", GRAD),
            Err(Error::NoSvgRoot)
        ));
    }
}
