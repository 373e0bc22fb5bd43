use super::Outcome;
use crate::defs;
use crate::error::{Error, Result};
use crate::locate;
use crate::options::{LinearGradientOptions, RadialGradientOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum GradientKind {
    Linear(LinearGradientOptions),
    Radial(RadialGradientOptions),
}

impl GradientKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Radial(_) => "radial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stop {
    color: String,
    offset: String,
}

/// Parses `red,#fff@40,blue`. Stops without `@offset` are spread evenly over 0..100.
fn parse_stops(colors: &str) -> Result<Vec<Stop>> {
    let parts: Vec<&str> = colors.split(',').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(Error::invalid_option("colors", colors));
    }
    let last = parts.len().saturating_sub(1).max(1) as f64;
    Ok(parts
        .iter()
        .enumerate()
        .map(|(i, part)| match part.split_once('@') {
            Some((color, offset)) => Stop {
                color: color.to_string(),
                offset: offset.trim_end_matches('%').to_string(),
            },
            None => Stop {
                color: part.to_string(),
                offset: ((i as f64 / last) * 100.0).round().to_string(),
            },
        })
        .collect())
}

fn gradient_element(kind: &GradientKind, id: &str, stops: &[Stop]) -> String {
    let (tag, mut el) = match kind {
        GradientKind::Linear(o) => (
            "linearGradient",
            format!(
                r#"<linearGradient id="{id}" x1="{}%" y1="{}%" x2="{}%" y2="{}%""#,
                o.x1, o.y1, o.x2, o.y2
            ),
        ),
        GradientKind::Radial(o) => {
            let mut el = format!(
                r#"<radialGradient id="{id}" cx="{}%" cy="{}%" r="{}%""#,
                o.cx, o.cy, o.r
            );
            if let Some(fx) = &o.fx {
                el.push_str(&format!(r#" fx="{fx}%""#));
            }
            if let Some(fy) = &o.fy {
                el.push_str(&format!(r#" fy="{fy}%""#));
            }
            ("radialGradient", el)
        }
    };
    el.push('>');
    for stop in stops {
        el.push_str(&format!(
            r#"<stop offset="{}%" stop-color="{}"/>"#,
            stop.offset, stop.color
        ));
    }
    el.push_str(&format!("</{tag}>"));
    el
}

/// Adds a gradient definition to `<defs>`, creating the container if needed.
pub fn add_gradient(doc: &str, kind: &GradientKind, id: &str, colors: &str) -> Result<Outcome> {
    if id.is_empty() {
        return Err(Error::usage("Gradient id must not be empty"));
    }
    if locate::has_id(doc, id) {
        tracing::warn!(id, "an element with this id already exists");
    }
    let stops = parse_stops(colors)?;
    let el = gradient_element(kind, id, &stops);
    let out = defs::insert_definition(doc, &el)?;

    Ok(Outcome::changed(
        out,
        format!(
            "Added {} gradient \"{id}\" with {} color stops",
            kind.name(),
            stops.len()
        ),
    )
    .with_message(format!(
        r#"Apply with: fill="url(#{id})" or stroke="url(#{id})""#
    )))
}
