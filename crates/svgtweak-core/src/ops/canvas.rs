//! Canvas-level operations: new documents and physical size.

use super::Outcome;
use crate::attr;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate::{self, Edit};
use crate::num::fmt_number;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

pub const DEFAULT_WIDTH: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 809.0;
pub const DEFAULT_BACKGROUND: &str = "#FAFAFA";

/// Fallback viewBox extent when the root has neither a viewBox nor numeric width/height.
const FALLBACK_EXTENT: f64 = 500.0;

/// Canvas extent assumed by generated definitions when the root gives no size.
const DEFINITION_EXTENT: f64 = 400.0;

/// How content reacts to a new physical size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeMode {
    /// Leave the viewBox alone; the renderer scales uniformly.
    #[default]
    Uniform,
    /// Grow the viewBox along one axis so the aspect ratio matches, keeping content centred.
    ScaleToFit,
    /// Leave the viewBox alone and let content stretch.
    Stretch,
}

impl FromStr for SizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "scale-to-fit" => Ok(Self::ScaleToFit),
            "stretch" => Ok(Self::Stretch),
            other => Err(Error::invalid_option("mode", other)),
        }
    }
}

fn size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)([A-Za-z%]+)?$").expect("valid regex"))
}

/// The numeric part of a length such as `210mm` or `800`.
fn size_value(key: &str, value: &str) -> Result<f64> {
    size_regex()
        .captures(value.trim())
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .ok_or_else(|| Error::invalid_option(key, value))
}

fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [x, y, w, h] if w > 0.0 && h > 0.0 => Some([x, y, w, h]),
        _ => None,
    }
}

fn format_view_box(vb: [f64; 4]) -> String {
    vb.map(fmt_number).join(" ")
}

/// Width and height of the canvas: the root viewBox size, else its width/height, else 400.
pub(crate) fn canvas_size(doc: &str) -> (f64, f64) {
    let root = locate::root_open_tag(doc).ok().map(|r| &doc[r]);
    let get = |name: &str| root.and_then(|r| attr::get_attribute(r, name));

    if let Some(vb) = get("viewBox") {
        let parts: Vec<f64> = vb
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .filter_map(|p| p.parse().ok())
            .collect();
        if let [_, _, w, h] = parts[..] {
            return (w, h);
        }
    }
    let length = |name: &str| {
        get(name)
            .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
            .unwrap_or(DEFINITION_EXTENT)
    };
    (length("width"), length("height"))
}

/// Sets the root `width`/`height`, adjusting the viewBox for [`SizeMode::ScaleToFit`].
pub fn set_size(doc: &str, width: &str, height: &str, mode: SizeMode) -> Result<Outcome> {
    let new_w = size_value("width", width)?;
    let new_h = size_value("height", height)?;

    let root = locate::root_open_tag(doc)?;
    let open = &doc[root.clone()];

    let current = attr::get_attribute(open, "viewBox")
        .as_deref()
        .and_then(parse_view_box)
        .unwrap_or_else(|| {
            let length = |name: &str| {
                attr::get_attribute(open, name)
                    .and_then(|v| size_regex().captures(v.trim()).map(|c| c[1].to_string()))
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| *v > 0.0)
                    .unwrap_or(FALLBACK_EXTENT)
            };
            [0.0, 0.0, length("width"), length("height")]
        });

    let mut rewritten = attr::set_attribute(open, "width", width.trim());
    rewritten = attr::set_attribute(&rewritten, "height", height.trim());

    let mut messages = Vec::new();
    match mode {
        SizeMode::ScaleToFit => {
            let [x, y, w, h] = current;
            let current_aspect = w / h;
            let new_aspect = new_w / new_h;
            let adjusted = if new_aspect > current_aspect {
                let nw = h * new_aspect;
                [x - (nw - w) / 2.0, y, nw, h]
            } else if new_aspect < current_aspect {
                let nh = w / new_aspect;
                [x, y - (nh - h) / 2.0, w, nh]
            } else {
                current
            };
            let view_box = format_view_box(adjusted);
            rewritten = attr::set_attribute(&rewritten, "viewBox", &view_box);
            messages.push(format!("Adjusted viewBox: {view_box}"));
        }
        SizeMode::Stretch => {
            messages.push(format!(
                "Content will stretch to fit {} x {}",
                width.trim(),
                height.trim()
            ));
        }
        SizeMode::Uniform => messages.push("ViewBox unchanged (uniform scale)".to_string()),
    }
    messages.push(format!("Set size to {} x {}", width.trim(), height.trim()));

    let out = mutate::apply_edits(doc, vec![Edit::replace(root, rewritten)])?;
    Ok(Outcome {
        document: out,
        changed: true,
        messages,
    })
}

/// A fresh document of the given size. A background of `none` or `transparent` (or an empty
/// string) leaves out the background rectangle.
pub fn init(width: f64, height: f64, background: &str) -> Result<String> {
    if !(width > 0.0 && height > 0.0) {
        return Err(Error::usage("Canvas width and height must be positive"));
    }
    let (w, h) = (fmt_number(width), fmt_number(height));
    let mut doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    doc.push('\n');
    let background = background.trim();
    if !(background.is_empty()
        || background.eq_ignore_ascii_case("none")
        || background.eq_ignore_ascii_case("transparent"))
    {
        doc.push_str(&format!(
            r#"<rect width="{w}" height="{h}" fill="{background}"/>"#
        ));
        doc.push('\n');
    }
    doc.push_str("</svg>\n");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_background() {
        let doc = init(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_BACKGROUND).unwrap();
        assert_eq!(
            doc,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"500\" height=\"809\" viewBox=\"0 0 500 809\">\n<rect width=\"500\" height=\"809\" fill=\"#FAFAFA\"/>\n</svg>\n"
        );
    }

    #[test]
    fn init_transparent() {
        let doc = init(100.0, 50.0, "transparent").unwrap();
        assert!(!doc.contains("<rect"));
        assert!(init(0.0, 50.0, "none").is_err());
    }

    #[test]
    fn uniform_keeps_view_box() {
        let doc = r#"<svg viewBox="0 0 100 100" width="100" height="100"><rect/></svg>"#;
        let out = set_size(doc, "200mm", "200mm", SizeMode::Uniform).unwrap();
        assert_eq!(
            out.document,
            r#"<svg viewBox="0 0 100 100" width="200mm" height="200mm"><rect/></svg>"#
        );
        assert_eq!(
            out.messages,
            vec!["ViewBox unchanged (uniform scale)", "Set size to 200mm x 200mm"]
        );
    }

    #[test]
    fn scale_to_fit_widens_and_recentres() {
        let doc = r#"<svg viewBox="0 0 100 100"><rect/></svg>"#;
        let out = set_size(doc, "200", "100", SizeMode::ScaleToFit).unwrap();
        assert!(out.document.starts_with(
            r#"<svg viewBox="-50 0 200 100" width="200" height="100">"#
        ));
        assert_eq!(out.messages[0], "Adjusted viewBox: -50 0 200 100");
    }

    #[test]
    fn scale_to_fit_heightens_from_width_height() {
        let doc = r#"<svg width="100" height="100"></svg>"#;
        let out = set_size(doc, "50", "100", SizeMode::ScaleToFit).unwrap();
        assert!(out.document.contains(r#"viewBox="0 -50 100 200""#));
    }

    #[test]
    fn stretch_message() {
        let out = set_size("<svg></svg>", "10in", "5in", SizeMode::Stretch).unwrap();
        assert_eq!(out.messages[0], "Content will stretch to fit 10in x 5in");
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            set_size("<svg></svg>", "wide", "5", SizeMode::Uniform),
            Err(Error::InvalidOption { .. })
        ));
        assert!("squash".parse::<SizeMode>().is_err());
    }
}
