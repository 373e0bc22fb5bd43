use super::Outcome;
use crate::defs;
use crate::error::{Error, Result};
use crate::locate;
use crate::num::fmt_number;
use crate::options::OptionPairs;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Arrow,
    ArrowReverse,
    Dot,
    Square,
    Diamond,
    CircleOpen,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::ArrowReverse => "arrow-reverse",
            Self::Dot => "dot",
            Self::Square => "square",
            Self::Diamond => "diamond",
            Self::CircleOpen => "circle-open",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "arrow" => Self::Arrow,
            "arrow-reverse" => Self::ArrowReverse,
            "dot" => Self::Dot,
            "square" => Self::Square,
            "diamond" => Self::Diamond,
            "circle-open" => Self::CircleOpen,
            other => {
                return Err(Error::usage(format!(
                    "Unknown marker type: {other}\nValid types: arrow, arrow-reverse, dot, square, diamond, circle-open"
                )));
            }
        })
    }
}

/// `size=6 fill=#000 stroke=none`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub size: f64,
    pub fill: String,
    pub stroke: String,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            size: 6.0,
            fill: "#000".to_string(),
            stroke: "none".to_string(),
        }
    }
}

impl MarkerOptions {
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let mut opts = Self::default();
        if let Some(size) = pairs.take_number("size")? {
            if size <= 0.0 {
                return Err(Error::invalid_option("size", &fmt_number(size)));
            }
            opts.size = size;
        }
        if let Some(fill) = pairs.take("fill") {
            opts.fill = fill;
        }
        if let Some(stroke) = pairs.take("stroke") {
            opts.stroke = stroke;
        }
        pairs.finish()?;
        Ok(opts)
    }
}

/// The shape drawn inside the marker box, and the box's reference point.
fn marker_shape(kind: MarkerKind, opts: &MarkerOptions) -> (String, f64, f64) {
    let size = opts.size;
    let half = size / 2.0;
    let (s, h) = (fmt_number(size), fmt_number(half));
    let paint = format!(r#"fill="{}" stroke="{}""#, opts.fill, opts.stroke);

    match kind {
        MarkerKind::Arrow => (
            format!(r#"<path d="M0,0 L{s},{h} L0,{s} Z" {paint}/>"#),
            size,
            half,
        ),
        MarkerKind::ArrowReverse => (
            format!(r#"<path d="M{s},0 L0,{h} L{s},{s} Z" {paint}/>"#),
            0.0,
            half,
        ),
        MarkerKind::Dot => (
            format!(r#"<circle cx="{h}" cy="{h}" r="{h}" {paint}/>"#),
            half,
            half,
        ),
        MarkerKind::Square => (
            format!(r#"<rect x="0" y="0" width="{s}" height="{s}" {paint}/>"#),
            half,
            half,
        ),
        MarkerKind::Diamond => (
            format!(r#"<path d="M{h},0 L{s},{h} L{h},{s} L0,{h} Z" {paint}/>"#),
            half,
            half,
        ),
        // Drawn as a ring in the fill color.
        MarkerKind::CircleOpen => (
            format!(
                r#"<circle cx="{h}" cy="{h}" r="{}" fill="none" stroke="{}" stroke-width="1"/>"#,
                fmt_number(half - 1.0),
                opts.fill
            ),
            half,
            half,
        ),
    }
}

/// Adds a `<marker>` to `<defs>`, oriented along the path and scaled with its stroke width.
pub fn add_marker(doc: &str, kind: MarkerKind, id: &str, opts: &MarkerOptions) -> Result<Outcome> {
    if id.is_empty() {
        return Err(Error::usage("Marker id must not be empty"));
    }
    if locate::has_id(doc, id) {
        tracing::warn!(id, "an element with this id already exists");
    }
    let (shape, ref_x, ref_y) = marker_shape(kind, opts);
    let s = fmt_number(opts.size);
    let marker = format!(
        r#"<marker id="{id}" markerWidth="{s}" markerHeight="{s}" refX="{}" refY="{}" orient="auto" markerUnits="strokeWidth">{shape}</marker>"#,
        fmt_number(ref_x),
        fmt_number(ref_y)
    );
    let out = defs::insert_definition(doc, &marker)?;

    Ok(Outcome::changed(
        out,
        format!("Added {kind} marker \"{id}\" (size: {s}, fill: {})", opts.fill),
    )
    .with_message(format!(
        r#"Apply with: marker-end="url(#{id})" or marker-start="url(#{id})""#
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_points_along_the_path() {
        let doc = "<svg><path d=\"M0 0 L10 10\"/></svg>";
        let out = add_marker(doc, MarkerKind::Arrow, "head", &MarkerOptions::default()).unwrap();
        assert_eq!(
            out.document,
            "<svg>\n<defs>\n<marker id=\"head\" markerWidth=\"6\" markerHeight=\"6\" refX=\"6\" refY=\"3\" orient=\"auto\" markerUnits=\"strokeWidth\"><path d=\"M0,0 L6,3 L0,6 Z\" fill=\"#000\" stroke=\"none\"/></marker>\n</defs><path d=\"M0 0 L10 10\"/></svg>"
        );
        assert_eq!(
            out.messages,
            vec![
                r#"Added arrow marker "head" (size: 6, fill: #000)"#,
                r#"Apply with: marker-end="url(#head)" or marker-start="url(#head)""#
            ]
        );
    }

    #[test]
    fn reverse_arrow_references_its_tip() {
        let opts = MarkerOptions {
            size: 10.0,
            ..Default::default()
        };
        let (shape, ref_x, ref_y) = marker_shape(MarkerKind::ArrowReverse, &opts);
        assert_eq!((ref_x, ref_y), (0.0, 5.0));
        assert!(shape.starts_with(r#"<path d="M10,0 L0,5 L10,10 Z""#));
    }

    #[test]
    fn open_circle_strokes_with_the_fill_color() {
        let opts = MarkerOptions::from_pairs(OptionPairs::from_pairs([
            ("size", "8"),
            ("fill", "red"),
        ]))
        .unwrap();
        let (shape, ..) = marker_shape(MarkerKind::CircleOpen, &opts);
        assert_eq!(
            shape,
            r#"<circle cx="4" cy="4" r="3" fill="none" stroke="red" stroke-width="1"/>"#
        );
    }

    #[test]
    fn diamond_and_square_are_centred() {
        let opts = MarkerOptions::default();
        let (diamond, x, y) = marker_shape(MarkerKind::Diamond, &opts);
        assert_eq!((x, y), (3.0, 3.0));
        assert!(diamond.contains(r#"d="M3,0 L6,3 L3,6 L0,3 Z""#));
        let (square, ..) = marker_shape(MarkerKind::Square, &opts);
        assert!(square.contains(r#"width="6" height="6""#));
    }

    #[test]
    fn options_are_validated() {
        let bad = OptionPairs::from_pairs([("size", "0")]);
        assert!(MarkerOptions::from_pairs(bad).is_err());
        let unknown = OptionPairs::from_pairs([("colour", "red")]);
        assert!(matches!(
            MarkerOptions::from_pairs(unknown),
            Err(Error::UnknownOption { .. })
        ));
        assert!("star".parse::<MarkerKind>().is_err());
    }
}
