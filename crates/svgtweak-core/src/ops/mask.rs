use super::Outcome;
use super::canvas::canvas_size;
use crate::defs;
use crate::error::{Error, Result};
use crate::locate;
use crate::num::{fmt_number, parse_number};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    Circle,
    Rect,
    Ellipse,
    /// Opaque centre fading out towards a circle's edge.
    RadialFade,
    /// Fade across the canvas along an angle in degrees.
    LinearFade,
    /// Opaque inset rectangle softened towards the edges.
    Vignette,
}

impl MaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
            Self::RadialFade => "radial-fade",
            Self::LinearFade => "linear-fade",
            Self::Vignette => "vignette",
        }
    }
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "circle" => Self::Circle,
            "rect" => Self::Rect,
            "ellipse" => Self::Ellipse,
            "radial-fade" => Self::RadialFade,
            "linear-fade" => Self::LinearFade,
            "vignette" => Self::Vignette,
            other => {
                return Err(Error::usage(format!(
                    "Unknown mask type: {other}\nValid types: circle, rect, ellipse, radial-fade, linear-fade, vignette"
                )));
            }
        })
    }
}

/// White-to-black stops, reversed when inverted. `from` is the offset of the first stop.
fn fade_stops(from: f64, invert: bool) -> String {
    let (a, b) = if invert {
        ("black", "white")
    } else {
        ("white", "black")
    };
    format!(
        r#"<stop offset="{}%" stop-color="{a}"/><stop offset="100%" stop-color="{b}"/>"#,
        fmt_number(from)
    )
}

/// The optional gradient and the mask body for one mask.
fn mask_parts<S: AsRef<str>>(
    doc: &str,
    kind: MaskKind,
    id: &str,
    args: &[S],
    invert: bool,
) -> Result<(Option<String>, String)> {
    let arg = |i: usize, key: &str, default: f64| -> Result<String> {
        match args.get(i) {
            Some(a) => Ok(fmt_number(parse_number(key, a.as_ref())?)),
            None => Ok(fmt_number(default)),
        }
    };
    let (w, h) = canvas_size(doc);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let gradient_id = format!("{id}-gradient");

    Ok(match kind {
        MaskKind::Circle => (
            None,
            format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="white"/>"#,
                arg(0, "cx", cx)?,
                arg(1, "cy", cy)?,
                arg(2, "r", 100.0)?
            ),
        ),
        MaskKind::Rect => (
            None,
            format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="white"/>"#,
                arg(0, "x", 0.0)?,
                arg(1, "y", 0.0)?,
                arg(2, "width", w)?,
                arg(3, "height", h)?
            ),
        ),
        MaskKind::Ellipse => (
            None,
            format!(
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="white"/>"#,
                arg(0, "cx", cx)?,
                arg(1, "cy", cy)?,
                arg(2, "rx", 150.0)?,
                arg(3, "ry", 100.0)?
            ),
        ),
        MaskKind::RadialFade => (
            Some(format!(
                r#"<radialGradient id="{gradient_id}" cx="50%" cy="50%" r="50%">{}</radialGradient>"#,
                fade_stops(0.0, invert)
            )),
            format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="url(#{gradient_id})"/>"#,
                arg(0, "cx", cx)?,
                arg(1, "cy", cy)?,
                arg(2, "r", w.min(h) / 2.0)?
            ),
        ),
        MaskKind::LinearFade => {
            let angle = match args.first() {
                Some(a) => parse_number("angle", a.as_ref())?,
                None => 0.0,
            };
            let (sin, cos) = angle.to_radians().sin_cos();
            let pct = |v: f64| fmt_number(v.round());
            (
                Some(format!(
                    r#"<linearGradient id="{gradient_id}" x1="{}%" y1="{}%" x2="{}%" y2="{}%">{}</linearGradient>"#,
                    pct(50.0 - cos * 50.0),
                    pct(50.0 - sin * 50.0),
                    pct(50.0 + cos * 50.0),
                    pct(50.0 + sin * 50.0),
                    fade_stops(0.0, invert)
                )),
                format!(
                    r#"<rect x="0" y="0" width="{}" height="{}" fill="url(#{gradient_id})"/>"#,
                    fmt_number(w),
                    fmt_number(h)
                ),
            )
        }
        MaskKind::Vignette => {
            let inset = match args.first() {
                Some(a) => parse_number("inset", a.as_ref())?,
                None => 20.0,
            };
            let softness = match args.get(1) {
                Some(a) => parse_number("softness", a.as_ref())?,
                None => 30.0,
            };
            (
                Some(format!(
                    r#"<radialGradient id="{gradient_id}" cx="50%" cy="50%" r="70%">{}</radialGradient>"#,
                    fade_stops(100.0 - softness, invert)
                )),
                format!(
                    r#"<rect x="{i}" y="{i}" width="{}" height="{}" fill="url(#{gradient_id})"/>"#,
                    fmt_number(w - 2.0 * inset),
                    fmt_number(h - 2.0 * inset),
                    i = fmt_number(inset)
                ),
            )
        }
    })
}

/// Adds a `<mask>` to `<defs>`. Shape masks are solid white; the fade kinds also define a
/// `<id>-gradient` next to the mask. Missing arguments are derived from the canvas size.
pub fn add_mask<S: AsRef<str>>(
    doc: &str,
    kind: MaskKind,
    id: &str,
    args: &[S],
    invert: bool,
) -> Result<Outcome> {
    if id.is_empty() {
        return Err(Error::usage("Mask id must not be empty"));
    }
    if locate::has_id(doc, id) {
        tracing::warn!(id, "an element with this id already exists");
    }
    let (gradient, content) = mask_parts(doc, kind, id, args, invert)?;
    let mask = format!(r#"<mask id="{id}">{content}</mask>"#);
    let definition = match gradient {
        Some(gradient) => format!("{gradient}\n{mask}"),
        None => mask,
    };
    let out = defs::insert_definition(doc, &definition)?;

    Ok(
        Outcome::changed(out, format!("Added {kind} mask \"{id}\""))
            .with_message(format!(r#"Apply with: mask="url(#{id})""#)),
    )
}
