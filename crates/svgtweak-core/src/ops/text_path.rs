//! Text laid out along a path: an existing one, or a circle, arc or wave defined for it.

use super::Outcome;
use super::add::push_attributes;
use super::canvas::canvas_size;
use crate::attr::AttributeSet;
use crate::defs;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate;
use crate::num::{fmt_number, parse_number, round_to};
use crate::options::OptionPairs;

#[derive(Debug, Clone, PartialEq)]
pub enum TextPathMode {
    /// Follow the element with this id.
    Path(String),
    Circle { cx: f64, cy: f64, r: f64 },
    /// Clockwise from `start` to `end`, in degrees from twelve o'clock.
    Arc {
        cx: f64,
        cy: f64,
        r: f64,
        start: f64,
        end: f64,
    },
    /// A sine wave across the canvas; `frequency` is in cycles per unit.
    Wave {
        y: f64,
        amplitude: f64,
        frequency: f64,
    },
}

impl TextPathMode {
    pub fn parse<S: AsRef<str>>(mode: &str, args: &[S]) -> Result<Self> {
        let num = |i: usize, key: &str, default: f64| -> Result<f64> {
            args.get(i)
                .map(|a| parse_number(key, a.as_ref()))
                .unwrap_or(Ok(default))
        };
        Ok(match mode {
            "path" => {
                let id = args
                    .first()
                    .map(|a| a.as_ref().trim_start_matches('#').to_string())
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| Error::usage("path mode needs the id of a path"))?;
                Self::Path(id)
            }
            "circle" => Self::Circle {
                cx: num(0, "cx", 200.0)?,
                cy: num(1, "cy", 200.0)?,
                r: num(2, "r", 100.0)?,
            },
            "arc" => Self::Arc {
                cx: num(0, "cx", 200.0)?,
                cy: num(1, "cy", 200.0)?,
                r: num(2, "r", 100.0)?,
                start: num(3, "start", 0.0)?,
                end: num(4, "end", 180.0)?,
            },
            "wave" => Self::Wave {
                y: num(0, "y", 200.0)?,
                amplitude: num(1, "amplitude", 20.0)?,
                frequency: num(2, "frequency", 0.05)?,
            },
            other => {
                return Err(Error::usage(format!(
                    "Unknown mode: {other}\nValid modes: path, circle, arc, wave"
                )));
            }
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Circle { .. } => "circle",
            Self::Arc { .. } => "arc",
            Self::Wave { .. } => "wave",
        }
    }

    /// Path data for the generated modes; `None` when following an existing path.
    fn path_data(&self, canvas_width: f64) -> Option<String> {
        let n = |v: f64| fmt_number(round_to(v, 3));
        match *self {
            Self::Path(_) => None,
            Self::Circle { cx, cy, r } => Some(format!(
                "M {},{cy} A {r},{r} 0 1,1 {},{cy} A {r},{r} 0 1,1 {},{cy}",
                n(cx - r),
                n(cx + r),
                n(cx - r),
                cy = n(cy),
                r = n(r)
            )),
            Self::Arc {
                cx,
                cy,
                r,
                start,
                end,
            } => {
                let point = |deg: f64| {
                    let rad = (deg - 90.0).to_radians();
                    (n(cx + r * rad.cos()), n(cy + r * rad.sin()))
                };
                let (x1, y1) = point(start);
                let (x2, y2) = point(end);
                let large_arc = u8::from((end - start).abs() > 180.0);
                Some(format!(
                    "M {x1},{y1} A {r},{r} 0 {large_arc},1 {x2},{y2}",
                    r = n(r)
                ))
            }
            Self::Wave {
                y,
                amplitude,
                frequency,
            } => {
                let mut d = format!("M 0,{}", n(y));
                let mut x = 0.0;
                while x <= canvas_width {
                    let wy = y + amplitude * (x * frequency * std::f64::consts::TAU).sin();
                    d.push_str(&format!(" L {},{}", n(x), fmt_number(round_to(wy, 2))));
                    x += 5.0;
                }
                Some(d)
            }
        }
    }
}

/// Options for `add-text-path`. `offset`, `side` and `id` are typed; every other key becomes an
/// attribute of the `<text>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPathOptions {
    pub id: Option<String>,
    /// `startOffset` along the path, written as given (`20`, `50%`).
    pub offset: Option<String>,
    pub side: Option<String>,
    pub attributes: AttributeSet,
}

impl TextPathOptions {
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let id = pairs.take("id").filter(|id| !id.is_empty());
        let offset = pairs.take("offset").filter(|o| o.trim() != "0");
        let side = pairs.take("side");
        if let Some(side) = side.as_deref() {
            if side != "left" && side != "right" {
                return Err(Error::invalid_option("side", side));
            }
        }
        let mut attributes = text_defaults();
        attributes.extend(pairs.into_attributes());
        Ok(Self {
            id,
            offset,
            side,
            attributes,
        })
    }
}

impl Default for TextPathOptions {
    fn default() -> Self {
        Self {
            id: None,
            offset: None,
            side: None,
            attributes: text_defaults(),
        }
    }
}

fn text_defaults() -> AttributeSet {
    [("font-size", "16"), ("fill", "#000"), ("font-family", "sans-serif")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect()
}

/// First `textPath-N` id not taken in `doc`.
fn fresh_path_id(doc: &str) -> String {
    (0usize..)
        .map(|i| format!("textPath-{i}"))
        .find(|id| !locate::has_id(doc, id))
        .unwrap_or_else(|| "textPath".to_string())
}

/// Appends `<text><textPath href="#…">` before the root closing tag. Generated paths go into
/// `<defs>` as `<id>-path`, or `textPath-N` when the text has no id.
pub fn add_text_path(
    doc: &str,
    mode: &TextPathMode,
    text: &str,
    opts: &TextPathOptions,
) -> Result<Outcome> {
    if text.is_empty() {
        return Err(Error::usage("add-text-path needs some text"));
    }
    let (mut out, href) = match mode {
        TextPathMode::Path(id) => {
            if !locate::has_id(doc, id) {
                tracing::warn!(id, "no element with this id; the text will not render");
            }
            (doc.to_string(), id.clone())
        }
        generated => {
            let path_id = match &opts.id {
                Some(id) => format!("{id}-path"),
                None => fresh_path_id(doc),
            };
            let d = generated.path_data(canvas_size(doc).0).unwrap_or_default();
            let path = format!(r#"<path id="{path_id}" d="{d}" fill="none" stroke="none"/>"#);
            (defs::insert_definition(doc, &path)?, path_id)
        }
    };

    let mut el = String::from("<text");
    if let Some(id) = &opts.id {
        el.push_str(&format!(r#" id="{id}""#));
    }
    push_attributes(&mut el, &opts.attributes);
    el.push_str(&format!(r##"><textPath href="#{href}""##));
    if let Some(offset) = &opts.offset {
        el.push_str(&format!(r#" startOffset="{offset}""#));
    }
    if let Some(side) = &opts.side {
        el.push_str(&format!(r#" side="{side}""#));
    }
    el.push('>');
    el.push_str(&htmlize::escape_text(text));
    el.push_str("</textPath></text>\n");
    out = mutate::insert_before_root_close(&out, &el)?;

    let message = match mode {
        TextPathMode::Path(_) => format!("Added text along path \"#{href}\""),
        _ => {
            let preview: String = text.chars().take(20).collect();
            let ellipsis = if text.chars().count() > 20 { "..." } else { "" };
            format!("Added {} text path \"{preview}{ellipsis}\"", mode.name())
        }
    };
    Ok(Outcome::changed(out, message))
}
