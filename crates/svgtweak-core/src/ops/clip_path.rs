use super::Outcome;
use super::canvas::canvas_size;
use crate::defs;
use crate::error::{Error, Result};
use crate::locate;
use crate::num::{fmt_number, parse_number};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipShape {
    Circle,
    Ellipse,
    Rect,
    /// A rectangle inset from the canvas edges by `top right bottom left`.
    Inset,
    Polygon,
    Path,
}

impl ClipShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Rect => "rect",
            Self::Inset => "inset",
            Self::Polygon => "polygon",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for ClipShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "rect" => Self::Rect,
            "inset" => Self::Inset,
            "polygon" => Self::Polygon,
            "path" => Self::Path,
            other => {
                return Err(Error::usage(format!(
                    "Unknown clip shape: {other}\nValid shapes: circle, rect, ellipse, polygon, path, inset"
                )));
            }
        })
    }
}

fn clip_content<S: AsRef<str>>(doc: &str, shape: ClipShape, args: &[S]) -> Result<String> {
    let arg = |i: usize, default: &str| -> String {
        args.get(i)
            .map(|a| a.as_ref().to_string())
            .unwrap_or_else(|| default.to_string())
    };
    Ok(match shape {
        ClipShape::Circle => format!(
            r#"<circle cx="{}" cy="{}" r="{}"/>"#,
            arg(0, "200"),
            arg(1, "200"),
            arg(2, "100")
        ),
        ClipShape::Ellipse => format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}"/>"#,
            arg(0, "200"),
            arg(1, "200"),
            arg(2, "150"),
            arg(3, "100")
        ),
        ClipShape::Rect => {
            let mut el = format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                arg(0, "0"),
                arg(1, "0"),
                arg(2, "400"),
                arg(3, "400")
            );
            if let Some(rx) = args.get(4) {
                el.push_str(&format!(r#" rx="{}""#, rx.as_ref()));
            }
            if let Some(ry) = args.get(5) {
                el.push_str(&format!(r#" ry="{}""#, ry.as_ref()));
            }
            el.push_str("/>");
            el
        }
        ClipShape::Inset => {
            let edge = |i: usize, name: &str| -> Result<f64> {
                args.get(i)
                    .map(|a| parse_number(name, a.as_ref()))
                    .unwrap_or(Ok(0.0))
            };
            let (top, right) = (edge(0, "top")?, edge(1, "right")?);
            let (bottom, left) = (edge(2, "bottom")?, edge(3, "left")?);
            let (w, h) = canvas_size(doc);
            let mut el = format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                fmt_number(left),
                fmt_number(top),
                fmt_number(w - left - right),
                fmt_number(h - top - bottom)
            );
            if let Some(rx) = args.get(4) {
                let rx = rx.as_ref();
                el.push_str(&format!(r#" rx="{rx}" ry="{rx}""#));
            }
            el.push_str("/>");
            el
        }
        ClipShape::Polygon => {
            format!(r#"<polygon points="{}"/>"#, arg(0, "200,0 400,400 0,400"))
        }
        ClipShape::Path => format!(r#"<path d="{}"/>"#, arg(0, "M0,0 L400,0 L400,400 L0,400 Z")),
    })
}

/// Adds a `<clipPath>` holding one shape to `<defs>`. Missing shape arguments take defaults
/// sized for a 400×400 canvas.
pub fn add_clip_path<S: AsRef<str>>(
    doc: &str,
    shape: ClipShape,
    id: &str,
    args: &[S],
) -> Result<Outcome> {
    if id.is_empty() {
        return Err(Error::usage("Clip path id must not be empty"));
    }
    if locate::has_id(doc, id) {
        tracing::warn!(id, "an element with this id already exists");
    }
    let content = clip_content(doc, shape, args)?;
    let out = defs::insert_definition(doc, &format!(r#"<clipPath id="{id}">{content}</clipPath>"#))?;

    Ok(
        Outcome::changed(out, format!("Added {shape} clip path \"{id}\""))
            .with_message(format!(r#"Apply with: clip-path="url(#{id})""#)),
    )
}
