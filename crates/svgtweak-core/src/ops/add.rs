//! Appends new elements just before the root closing tag.

use super::Outcome;
use crate::attr::AttributeSet;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate;
use crate::num::{fmt_number, round_to};
use crate::options::TextOptions;
use std::f64::consts::PI;

const SHAPE_FILL: &str = "#E53935";
const RECT_FILL: &str = "#1E88E5";
const INK: &str = "#212121";

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// `points` as written, e.g. `"0,0 10,0 5,8"`.
    Polygon { points: String },
    /// `sides` vertices on a circle of radius `r`, the first one straight up.
    RegularPolygon { cx: f64, cy: f64, r: f64, sides: usize },
    Path { d: String },
}

impl Shape {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Rect { .. } => "rect",
            Self::Ellipse { .. } => "ellipse",
            Self::Line { .. } => "line",
            Self::Polygon { .. } | Self::RegularPolygon { .. } => "polygon",
            Self::Path { .. } => "path",
        }
    }

    /// Paint attributes used unless the caller overrides them.
    pub fn default_paint(&self) -> AttributeSet {
        let pairs: &[(&str, &str)] = match self {
            Self::Rect { .. } => &[("fill", RECT_FILL)],
            Self::Line { .. } => &[("stroke", INK), ("stroke-width", "2")],
            Self::Path { .. } => &[("fill", "none"), ("stroke", INK), ("stroke-width", "2")],
            _ => &[("fill", SHAPE_FILL)],
        };
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    fn geometry(&self) -> Result<Vec<(&'static str, String)>> {
        let n = fmt_number;
        Ok(match self {
            Self::Circle { cx, cy, r } => vec![("cx", n(*cx)), ("cy", n(*cy)), ("r", n(*r))],
            Self::Rect {
                x,
                y,
                width,
                height,
            } => vec![
                ("x", n(*x)),
                ("y", n(*y)),
                ("width", n(*width)),
                ("height", n(*height)),
            ],
            Self::Ellipse { cx, cy, rx, ry } => vec![
                ("cx", n(*cx)),
                ("cy", n(*cy)),
                ("rx", n(*rx)),
                ("ry", n(*ry)),
            ],
            Self::Line { x1, y1, x2, y2 } => vec![
                ("x1", n(*x1)),
                ("y1", n(*y1)),
                ("x2", n(*x2)),
                ("y2", n(*y2)),
            ],
            Self::Polygon { points } => {
                if points.trim().is_empty() {
                    return Err(Error::usage("Polygon needs at least one point"));
                }
                vec![("points", points.trim().to_string())]
            }
            Self::RegularPolygon { cx, cy, r, sides } => {
                vec![("points", regular_polygon_points(*cx, *cy, *r, *sides)?)]
            }
            Self::Path { d } => {
                if d.trim().is_empty() {
                    return Err(Error::usage("Path data must not be empty"));
                }
                vec![("d", d.clone())]
            }
        })
    }

    fn describe(&self) -> String {
        let n = fmt_number;
        match self {
            Self::Circle { cx, cy, r } => {
                format!("Added circle at ({}, {}) r={}", n(*cx), n(*cy), n(*r))
            }
            Self::Rect {
                x,
                y,
                width,
                height,
            } => format!(
                "Added rect at ({}, {}) {}x{}",
                n(*x),
                n(*y),
                n(*width),
                n(*height)
            ),
            Self::Ellipse { cx, cy, rx, ry } => format!(
                "Added ellipse at ({},{}) rx={} ry={}",
                n(*cx),
                n(*cy),
                n(*rx),
                n(*ry)
            ),
            Self::Line { x1, y1, x2, y2 } => format!(
                "Added line ({},{}) to ({},{})",
                n(*x1),
                n(*y1),
                n(*x2),
                n(*y2)
            ),
            Self::Polygon { points } => {
                format!("Added polygon with {} points", points.split_whitespace().count())
            }
            Self::RegularPolygon { cx, cy, r, sides } => {
                let name = match sides {
                    3 => "triangle".to_string(),
                    4 => "square".to_string(),
                    5 => "pentagon".to_string(),
                    6 => "hexagon".to_string(),
                    8 => "octagon".to_string(),
                    other => format!("{other}-gon"),
                };
                format!("Added {name} at ({},{}) r={}", n(*cx), n(*cy), n(*r))
            }
            Self::Path { .. } => "Added path".to_string(),
        }
    }
}

fn regular_polygon_points(cx: f64, cy: f64, r: f64, sides: usize) -> Result<String> {
    if sides < 3 {
        return Err(Error::invalid_option("sides", &sides.to_string()));
    }
    let points: Vec<String> = (0..sides)
        .map(|i| {
            let angle = (i as f64 / sides as f64) * PI * 2.0 - PI / 2.0;
            let x = round_to(cx + r * angle.cos(), 3);
            let y = round_to(cy + r * angle.sin(), 3);
            format!("{},{}", fmt_number(x), fmt_number(y))
        })
        .collect();
    Ok(points.join(" "))
}

/// Renders `name="value"` pairs; a `None` value drops the attribute.
pub(super) fn push_attributes(el: &mut String, attrs: &AttributeSet) {
    for (name, value) in attrs {
        if let Some(value) = value {
            el.push_str(&format!(r#" {name}="{value}""#));
        }
    }
}

/// Appends a shape. `attrs` override the shape's default paint, in the order given.
pub fn add_shape(doc: &str, shape: &Shape, attrs: AttributeSet) -> Result<Outcome> {
    let mut paint = shape.default_paint();
    paint.extend(attrs);
    let no_stroke = paint.get("stroke").and_then(|v| v.as_deref()) == Some("none");
    if matches!(shape, Shape::Path { .. }) && no_stroke {
        paint.shift_remove("stroke");
        paint.shift_remove("stroke-width");
    }

    let mut el = format!("<{}", shape.tag());
    for (name, value) in shape.geometry()? {
        el.push_str(&format!(r#" {name}="{value}""#));
    }
    push_attributes(&mut el, &paint);
    el.push_str("/>\n");

    let out = mutate::insert_before_root_close(doc, &el)?;
    Ok(Outcome::changed(out, shape.describe()))
}

/// Appends a `<text>` element; the content is escaped.
pub fn add_text(doc: &str, x: f64, y: f64, content: &str, opts: &TextOptions) -> Result<Outcome> {
    let (x, y) = (fmt_number(x), fmt_number(y));
    let mut el = format!(r#"<text x="{x}" y="{y}""#);
    push_attributes(&mut el, &opts.attributes);
    if let Some(angle) = opts.rotate {
        el.push_str(&format!(
            r#" transform="rotate({} {x} {y})""#,
            fmt_number(angle)
        ));
    }
    el.push('>');
    el.push_str(&htmlize::escape_text(content));
    el.push_str("</text>\n");

    let out = mutate::insert_before_root_close(doc, &el)?;
    Ok(Outcome::changed(
        out,
        format!("Added text \"{content}\" at ({x}, {y})"),
    ))
}

/// Appends a `<use href="#id">` instance. A missing target is only warned about.
pub fn add_use(doc: &str, id: &str, x: f64, y: f64, attrs: &AttributeSet) -> Result<Outcome> {
    let id = id.trim_start_matches('#');
    if id.is_empty() {
        return Err(Error::usage("add-use needs the id of the element to reference"));
    }
    if !locate::has_id(doc, id) {
        tracing::warn!(id, "no element with this id; the <use> will render nothing");
    }

    let (x, y) = (fmt_number(x), fmt_number(y));
    let mut el = format!(r##"<use href="#{id}" x="{x}" y="{y}""##);
    push_attributes(&mut el, attrs);
    el.push_str("/>\n");

    let out = mutate::insert_before_root_close(doc, &el)?;
    Ok(Outcome::changed(
        out,
        format!("Added <use> referencing \"#{id}\" at ({x}, {y})"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionPairs;

    const DOC: &str = "<svg viewBox=\"0 0 100 100\">\n<rect width=\"100\" height=\"100\"/>\n</svg>\n";

    fn attrs(pairs: &[(&str, &str)]) -> AttributeSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    #[test]
    fn circle_with_default_fill() {
        let shape = Shape::Circle {
            cx: 50.0,
            cy: 50.0,
            r: 10.5,
        };
        let out = add_shape(DOC, &shape, AttributeSet::new()).unwrap();
        assert_eq!(
            out.document,
            "<svg viewBox=\"0 0 100 100\">\n<rect width=\"100\" height=\"100\"/>\n<circle cx=\"50\" cy=\"50\" r=\"10.5\" fill=\"#E53935\"/>\n</svg>\n"
        );
        assert_eq!(out.messages, vec!["Added circle at (50, 50) r=10.5"]);
    }

    #[test]
    fn overrides_replace_defaults_in_place() {
        let shape = Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 3.0,
        };
        let out = add_shape(DOC, &shape, attrs(&[("opacity", "0.5"), ("fill", "red")])).unwrap();
        assert!(out.document.contains(
            r#"<rect x="0" y="0" width="4" height="3" fill="red" opacity="0.5"/>"#
        ));
        assert_eq!(out.messages, vec!["Added rect at (0, 0) 4x3"]);
    }

    #[test]
    fn line_gets_ink_stroke() {
        let shape = Shape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        let out = add_shape(DOC, &shape, AttributeSet::new()).unwrap();
        assert!(out.document.contains(
            r##"<line x1="0" y1="0" x2="10" y2="10" stroke="#212121" stroke-width="2"/>"##
        ));
    }

    #[test]
    fn path_without_stroke() {
        let shape = Shape::Path {
            d: "M0 0 L10 10".to_string(),
        };
        let out = add_shape(DOC, &shape, attrs(&[("stroke", "none")])).unwrap();
        assert!(out.document.contains(r#"<path d="M0 0 L10 10" fill="none"/>"#));
        assert_eq!(out.messages, vec!["Added path"]);
    }

    #[test]
    fn regular_polygon_vertices() {
        let shape = Shape::RegularPolygon {
            cx: 50.0,
            cy: 50.0,
            r: 10.0,
            sides: 4,
        };
        let out = add_shape(DOC, &shape, AttributeSet::new()).unwrap();
        assert!(out.document.contains(r#"points="50,40 60,50 50,60 40,50""#));
        assert_eq!(out.messages, vec!["Added square at (50,50) r=10"]);

        let bad = Shape::RegularPolygon {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
            sides: 2,
        };
        assert!(add_shape(DOC, &bad, AttributeSet::new()).is_err());
    }

    #[test]
    fn polygon_counts_points() {
        let shape = Shape::Polygon {
            points: "0,0 10,0 5,8".to_string(),
        };
        let out = add_shape(DOC, &shape, AttributeSet::new()).unwrap();
        assert_eq!(out.messages, vec!["Added polygon with 3 points"]);
    }

    #[test]
    fn text_is_escaped_and_rotated() {
        let opts = TextOptions::from_pairs(OptionPairs::from_pairs([
            ("rotate", "30"),
            ("font-size", "24"),
        ]))
        .unwrap();
        let out = add_text(DOC, 10.0, 20.0, "a < b & c", &opts).unwrap();
        assert!(out.document.contains(
            r##"<text x="10" y="20" font-size="24" font-family="sans-serif" fill="#000" transform="rotate(30 10 20)">a &lt; b &amp; c</text>"##
        ));
        assert_eq!(out.messages, vec![r#"Added text "a < b & c" at (10, 20)"#]);
    }

    #[test]
    fn use_references_id() {
        let doc = r#"<svg><circle id="dot" r="2"/></svg>"#;
        let out = add_use(doc, "#dot", 5.0, 6.0, &attrs(&[("opacity", "0.5")])).unwrap();
        assert_eq!(
            out.document,
            "<svg><circle id=\"dot\" r=\"2\"/><use href=\"#dot\" x=\"5\" y=\"6\" opacity=\"0.5\"/>\n</svg>"
        );
        assert_eq!(out.messages, vec![r##"Added <use> referencing "#dot" at (5, 6)"##]);
    }

    #[test]
    fn use_with_missing_target_still_inserts() {
        let out = add_use(DOC, "ghost", 0.0, 0.0, &AttributeSet::new()).unwrap();
        assert!(out.document.contains(r##"<use href="#ghost" x="0" y="0"/>"##));
    }

    #[test]
    fn no_root_is_an_error() {
        let shape = Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        };
        assert!(matches!(
            add_shape("<g/>", &shape, AttributeSet::new()),
            Err(Error::NoSvgRoot)
        ));
    }
}
