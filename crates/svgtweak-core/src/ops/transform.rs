use super::Outcome;
use crate::attr;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate::{self, Edit};
use crate::num::{fmt_number, parse_number};
use crate::selector::{Selection, ShapeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Rotate { angle: f64, center: Option<(f64, f64)> },
    Scale { sx: f64, sy: Option<f64> },
    Translate { tx: f64, ty: f64 },
    SkewX(f64),
    SkewY(f64),
    /// Mirror across the x axis, the y axis, or both.
    Flip { x: bool, y: bool },
    Reset,
}

impl Transform {
    /// Builds a transform from its command-line name and arguments. Missing arguments take the
    /// identity value (`rotate 0`, `scale 1`, `translate 0 0`).
    pub fn parse<S: AsRef<str>>(kind: &str, args: &[S]) -> Result<Self> {
        let arg = |i: usize, default: f64| -> Result<f64> {
            match args.get(i) {
                Some(v) => parse_number(kind, v.as_ref()),
                None => Ok(default),
            }
        };
        Ok(match kind {
            "rotate" => Self::Rotate {
                angle: arg(0, 0.0)?,
                center: if args.len() >= 3 {
                    Some((arg(1, 0.0)?, arg(2, 0.0)?))
                } else {
                    None
                },
            },
            "scale" => Self::Scale {
                sx: arg(0, 1.0)?,
                sy: if args.len() >= 2 { Some(arg(1, 1.0)?) } else { None },
            },
            "translate" => Self::Translate {
                tx: arg(0, 0.0)?,
                ty: arg(1, 0.0)?,
            },
            "skewX" => Self::SkewX(arg(0, 0.0)?),
            "skewY" => Self::SkewY(arg(0, 0.0)?),
            "flip" => match args.first().map(|a| a.as_ref()).unwrap_or("x") {
                "x" => Self::Flip { x: true, y: false },
                "y" => Self::Flip { x: false, y: true },
                "both" => Self::Flip { x: true, y: true },
                other => return Err(Error::invalid_option("flip", other)),
            },
            "reset" => Self::Reset,
            other => return Err(Error::usage(format!("Unknown transform: {other}"))),
        })
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = fmt_number;
        match *self {
            Self::Rotate {
                angle,
                center: Some((cx, cy)),
            } => write!(f, "rotate({} {} {})", n(angle), n(cx), n(cy)),
            Self::Rotate { angle, center: None } => write!(f, "rotate({})", n(angle)),
            Self::Scale { sx, sy: Some(sy) } => write!(f, "scale({} {})", n(sx), n(sy)),
            Self::Scale { sx, sy: None } => write!(f, "scale({})", n(sx)),
            Self::Translate { tx, ty } => write!(f, "translate({} {})", n(tx), n(ty)),
            Self::SkewX(a) => write!(f, "skewX({})", n(a)),
            Self::SkewY(a) => write!(f, "skewY({})", n(a)),
            Self::Flip { x, y } => write!(
                f,
                "scale({} {})",
                if x { "-1" } else { "1" },
                if y { "-1" } else { "1" }
            ),
            Self::Reset => Ok(()),
        }
    }
}

/// Appends `transform` to the `transform` attribute of every selected element, or removes the
/// attribute for [`Transform::Reset`].
pub fn apply_transform(doc: &str, selection: &Selection, transform: Transform) -> Result<Outcome> {
    let spans = locate::locate_spans(doc, selection, ShapeSet::Transformable)?;
    let text = transform.to_string();

    let edits = spans
        .iter()
        .map(|span| {
            let open = span.open_tag();
            let rewritten = match (transform, attr::get_attribute(open, "transform")) {
                (Transform::Reset, _) => attr::remove_attribute(open, "transform"),
                (_, Some(existing)) if !existing.trim().is_empty() => {
                    attr::set_attribute(open, "transform", &format!("{existing} {text}"))
                }
                _ => attr::set_attribute(open, "transform", &text),
            };
            Edit::replace(span.start..span.open_end, rewritten)
        })
        .collect();
    let out = mutate::apply_edits(doc, edits)?;

    let message = match transform {
        Transform::Reset => format!(
            "Reset transforms on {} {} element(s)",
            spans.len(),
            selection.label()
        ),
        _ => format!(
            "Applied {text} to {} {} element(s)",
            spans.len(),
            selection.label()
        ),
    };
    Ok(Outcome::changed(out, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selection {
        Selection::parse(s).unwrap()
    }

    #[test]
    fn parses_and_formats_each_kind() {
        let cases: [(&str, &[&str], &str); 7] = [
            ("rotate", &["45", "100", "100"], "rotate(45 100 100)"),
            ("rotate", &["30"], "rotate(30)"),
            ("scale", &["1.5"], "scale(1.5)"),
            ("translate", &["10"], "translate(10 0)"),
            ("skewX", &["-15"], "skewX(-15)"),
            ("flip", &["both"], "scale(-1 -1)"),
            ("flip", &[], "scale(-1 1)"),
        ];
        for (kind, args, expected) in cases {
            assert_eq!(Transform::parse(kind, args).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Transform::parse::<&str>("spin", &[]),
            Err(Error::Usage { .. })
        ));
        assert!(Transform::parse("rotate", &["abc"]).is_err());
        assert!(Transform::parse("flip", &["z"]).is_err());
    }

    #[test]
    fn appends_to_existing_transform() {
        let doc = r#"<svg><rect transform="translate(5 5)"/><line/></svg>"#;
        let t = Transform::parse("rotate", &["90"]).unwrap();
        let out = apply_transform(doc, &sel("all"), t).unwrap();
        assert_eq!(
            out.document,
            r#"<svg><rect transform="translate(5 5) rotate(90)"/><line transform="rotate(90)"/></svg>"#
        );
        assert_eq!(out.messages, vec!["Applied rotate(90) to 2 all element(s)"]);
    }

    #[test]
    fn transforms_group_and_children_independently() {
        let doc = r#"<svg><g><circle r="1"/></g></svg>"#;
        let t = Transform::parse("scale", &["2"]).unwrap();
        let out = apply_transform(doc, &sel("all"), t).unwrap();
        assert_eq!(
            out.document,
            r#"<svg><g transform="scale(2)"><circle r="1" transform="scale(2)"/></g></svg>"#
        );
    }

    #[test]
    fn reset_removes_the_attribute() {
        let doc = r#"<svg><path d="M0 0" transform="rotate(3)"/></svg>"#;
        let out = apply_transform(doc, &sel("path:0"), Transform::Reset).unwrap();
        assert_eq!(out.document, r#"<svg><path d="M0 0"/></svg>"#);
        assert_eq!(out.messages, vec!["Reset transforms on 1 path element(s)"]);
    }
}
