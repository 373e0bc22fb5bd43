#![forbid(unsafe_code)]

//! Structural editing of SVG documents as text.
//!
//! Elements are located by selector (`circle:0`, `path:-1`, `rect:1-3`, `all`) and rewritten in
//! place: only the bytes of the targeted elements change, everything else (formatting,
//! comments, unknown markup) is preserved verbatim. No DOM is built.
//!
//! Layers, bottom up:
//! - [`scan`]: tag-level scanning primitives
//! - [`span`], [`locate`], [`selector`]: resolving selectors to exact element spans
//! - [`attr`], [`mutate`], [`defs`], [`layer`]: text rewrites over one snapshot
//! - [`ops`]: the user-facing operations, each returning an [`ops::Outcome`]
//!
//! File access lives in [`document`]; everything else works on `&str`.

pub mod attr;
pub mod defs;
pub mod document;
pub mod error;
pub mod layer;
pub mod locate;
pub mod mutate;
pub mod num;
pub mod ops;
pub mod options;
pub mod scan;
pub mod selector;
pub mod span;

pub use attr::AttributeSet;
pub use document::Document;
pub use error::{Error, Result};
pub use layer::{LayerAction, LayerOutcome};
pub use mutate::{CloneOptions, Edit};
pub use ops::Outcome;
pub use options::OptionPairs;
pub use selector::{Selection, ShapeSet};
pub use span::{ElementMatch, ElementSpan, SpanKind};

#[cfg(test)]
mod tests;
