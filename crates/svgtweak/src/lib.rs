#![forbid(unsafe_code)]

//! `svgtweak` edits SVG documents structurally, as text, without building a DOM.
//!
//! Every operation resolves a selector (`circle:0`, `path:-1`, `rect:1-3`, `all`) to exact byte
//! spans and rewrites only those; the rest of the file stays byte-for-byte identical. See
//! [`ops`] for the available operations.
//!
//! # Features
//!
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion
//!
//! ```
//! use svgtweak::{Selection, ops};
//!
//! let doc = r#"<svg viewBox="0 0 10 10"><circle r="1"/><circle r="2"/></svg>"#;
//! let out = ops::edit(doc, &Selection::parse("circle:-1").unwrap(), "fill", Some("red")).unwrap();
//! assert_eq!(out.document, r#"<svg viewBox="0 0 10 10"><circle r="1"/><circle r="2" fill="red"/></svg>"#);
//! ```

pub use svgtweak_core::*;

#[cfg(feature = "raster")]
pub mod raster;
