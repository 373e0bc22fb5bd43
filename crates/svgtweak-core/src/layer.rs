//! Paint-order changes (front/back/up/down).
//!
//! Paint order is whatever document order the paintable elements currently have; it is derived
//! from the text on every call and never cached.

use crate::error::{Error, Result};
use crate::locate;
use crate::mutate;
use crate::scan;
use crate::selector::ShapeSet;
use crate::span::{self, ElementSpan};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAction {
    Front,
    Back,
    Up,
    Down,
}

impl LayerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for LayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(Error::usage(format!(
                "Unknown action: {other}\nValid actions: front, back, up, down"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    Moved(String),
    /// The element already sits at the requested extreme; the document is unchanged.
    Unchanged { reason: &'static str },
}

/// Spans of every paintable element of `doc`, in document order.
fn paint_order(doc: &str) -> Vec<ElementSpan> {
    locate::find_any(doc, ShapeSet::Paintable.tags())
        .iter()
        .map(|m| span::extract(doc, m))
        .collect()
}

/// Moves `target` (a span of `doc`) to a new paint position.
pub fn reorder(doc: &str, target: &ElementSpan, action: LayerAction) -> Result<LayerOutcome> {
    let removed_at = target.start;
    let (rest, _) = mutate::remove_spans(doc, std::slice::from_ref(target));
    let shapes = paint_order(&rest);

    let insert_at = match action {
        LayerAction::Front => scan::rfind_close_tag(&rest, "svg").ok_or(Error::NoSvgRoot)?,
        LayerAction::Back => match shapes.first() {
            Some(first) => first.end,
            None => match scan::find_close_tag(&rest, "defs", 0) {
                Some((_, defs_end)) => defs_end,
                None => locate::root_open_tag(&rest)?.end,
            },
        },
        LayerAction::Up => match shapes.iter().find(|s| s.start >= removed_at) {
            Some(next) => next.end,
            None => {
                return Ok(LayerOutcome::Unchanged {
                    reason: "Element is already at front",
                });
            }
        },
        LayerAction::Down => {
            let before: Vec<&ElementSpan> = shapes.iter().filter(|s| s.end <= removed_at).collect();
            let outer: Vec<&ElementSpan> = before
                .iter()
                .copied()
                .filter(|s| !before.iter().any(|o| o.contains(s)))
                .collect();
            match outer.as_slice() {
                [.., _, last] => last.start,
                _ => {
                    return Ok(LayerOutcome::Unchanged {
                        reason: "Element is already at back (after background)",
                    });
                }
            }
        }
    };

    tracing::debug!(action = %action, from = removed_at, to = insert_at, "reorder");
    Ok(LayerOutcome::Moved(mutate::insert_at(
        &rest,
        insert_at,
        &target.text,
    )))
}
