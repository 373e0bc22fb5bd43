use super::Outcome;
use crate::error::Result;
use crate::layer::{self, LayerAction, LayerOutcome};
use crate::locate;
use crate::selector::{Selection, ShapeSet};

/// Changes the paint order of one indexed element.
pub fn layer(doc: &str, selection: &Selection, action: LayerAction) -> Result<Outcome> {
    let target = locate::locate_single(doc, selection, ShapeSet::Paintable)?;
    Ok(match layer::reorder(doc, &target, action)? {
        LayerOutcome::Moved(out) => Outcome::changed(out, format!("Moved {selection} {action}")),
        LayerOutcome::Unchanged { reason } => Outcome::unchanged(doc, reason),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_move_and_no_op() {
        let doc = r#"<svg><rect/><circle/></svg>"#;
        let moved = layer(doc, &Selection::parse("rect:0").unwrap(), LayerAction::Front).unwrap();
        assert!(moved.changed);
        assert_eq!(moved.messages, vec!["Moved rect:0 front"]);
        assert_eq!(moved.document, "<svg><circle/><rect/></svg>");

        let same = layer(doc, &Selection::parse("circle:0").unwrap(), LayerAction::Up).unwrap();
        assert!(!same.changed);
        assert_eq!(same.document, doc);
        assert_eq!(same.messages, vec!["Element is already at front"]);
    }
}
