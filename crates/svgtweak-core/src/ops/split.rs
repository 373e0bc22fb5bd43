//! Splitting a drawing into one document per paint color, e.g. one per plotter pen.

use super::colors::ColorScope;
use crate::attr;
use crate::error::Result;
use crate::locate;
use crate::num::fmt_number;
use crate::scan;
use crate::span::{self, ElementMatch};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Containers whose content is never drawn directly.
const NON_RENDERED: &[&str] = &[
    "defs",
    "style",
    "linearGradient",
    "radialGradient",
    "filter",
    "pattern",
    "mask",
    "clipPath",
];

/// Elements that are copied whole into a color layer.
const DRAWABLE: &[&str] = &[
    "path", "line", "circle", "rect", "ellipse", "polygon", "polyline", "text", "use", "image",
];

const FALLBACK_EXTENT: f64 = 500.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitOptions {
    pub scope: ColorScope,
    /// Repaint each layer's own color as black.
    pub to_black: bool,
    /// Put a white background rectangle under each layer.
    pub keep_background: bool,
}

/// One output document: every element painted with `color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLayer {
    /// Normalized color, e.g. `#ff0000`.
    pub color: String,
    pub elements: usize,
    pub document: String,
}

impl ColorLayer {
    /// `<base>-<color>.svg`, with the `#` dropped and anything unsafe in a file name replaced.
    pub fn file_name(&self, base: &str) -> String {
        let suffix: String = self
            .color
            .trim_start_matches('#')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{base}-{suffix}.svg")
    }
}

fn rgb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgb\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").expect("valid regex")
    })
}

/// The bucket a paint value falls into. `none`, `transparent` and `url(…)` paints have none.
pub fn color_key(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() || value == "none" || value == "transparent" || value.starts_with("url(")
    {
        return None;
    }
    let named = match value.as_str() {
        "black" => Some("#000000"),
        "white" => Some("#ffffff"),
        "red" => Some("#ff0000"),
        "green" => Some("#008000"),
        "blue" => Some("#0000ff"),
        "yellow" => Some("#ffff00"),
        "cyan" => Some("#00ffff"),
        "magenta" => Some("#ff00ff"),
        "gray" | "grey" => Some("#808080"),
        "orange" => Some("#ffa500"),
        "pink" => Some("#ffc0cb"),
        "purple" => Some("#800080"),
        "brown" => Some("#a52a2a"),
        _ => None,
    };
    if let Some(hex) = named {
        return Some(hex.to_string());
    }

    let is_hex = |s: &str| s.bytes().all(|b| b.is_ascii_hexdigit());
    if let Some(short) = value.strip_prefix('#').filter(|h| h.len() == 3 && is_hex(h)) {
        return Some(short.chars().fold(String::from("#"), |mut out, c| {
            out.push(c);
            out.push(c);
            out
        }));
    }
    if let Some(caps) = rgb_regex().captures(&value) {
        let channel = |i: usize| caps[i].parse::<u32>().map_or(0, |v| v.min(255));
        return Some(format!(
            "#{:02x}{:02x}{:02x}",
            channel(1),
            channel(2),
            channel(3)
        ));
    }
    Some(value)
}

/// Paint and transform in effect inside an open container.
#[derive(Debug, Clone, Default)]
struct Inherited {
    end: usize,
    stroke: Option<String>,
    fill: Option<String>,
    transform: Option<String>,
}

fn compose(outer: Option<&str>, inner: Option<&str>) -> Option<String> {
    match (outer, inner) {
        (Some(o), Some(i)) => Some(format!("{o} {i}")),
        (Some(t), None) | (None, Some(t)) => Some(t.to_string()),
        (None, None) => None,
    }
}

fn is_one_of(name: &str, set: &[&str]) -> bool {
    set.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Groups the drawable elements by stroke and fill color. Paint and transforms inherited from
/// enclosing groups are written onto each copy so it renders the same on its own. Every layer
/// keeps the root size, viewBox and `<defs>` of the source.
pub fn split_by_color(doc: &str, opts: &SplitOptions) -> Result<Vec<ColorLayer>> {
    let root = locate::root_open_tag(doc)?;
    let root_open = &doc[root.clone()];

    let mut buckets: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut definitions: Vec<&str> = Vec::new();
    let mut stack: Vec<Inherited> = Vec::new();
    let mut skip_until = root.end;

    for tag in scan::open_tags(doc) {
        if tag.start < skip_until {
            continue;
        }
        while stack.last().is_some_and(|s| s.end <= tag.start) {
            stack.pop();
        }
        let element = span::extract(doc, &ElementMatch::new(tag.name, tag.start));

        if is_one_of(tag.name, NON_RENDERED) {
            if tag.name.eq_ignore_ascii_case("defs") {
                definitions.push(&doc[element.range()]);
            }
            skip_until = element.end;
            continue;
        }

        let open = &doc[tag.start..tag.end];
        let parent = stack.last().cloned().unwrap_or_default();
        let own = |name: &str| attr::get_attribute(open, name);
        let stroke = own("stroke").or(parent.stroke.clone());
        let fill = own("fill").or(parent.fill.clone());

        if !is_one_of(tag.name, DRAWABLE) {
            if !element.is_self_closing() {
                stack.push(Inherited {
                    end: element.end,
                    transform: compose(parent.transform.as_deref(), own("transform").as_deref()),
                    stroke,
                    fill,
                });
            }
            continue;
        }
        skip_until = element.end;

        let mut colors: Vec<String> = Vec::new();
        if opts.scope != ColorScope::FillOnly {
            colors.extend(stroke.as_deref().and_then(color_key));
        }
        if opts.scope != ColorScope::StrokeOnly {
            colors.extend(fill.as_deref().and_then(color_key));
        }
        colors.dedup();
        if colors.is_empty() {
            continue;
        }

        // The copy carries what it inherited.
        let mut copy_open = open.to_string();
        for (name, value) in [("stroke", &parent.stroke), ("fill", &parent.fill)] {
            if let (None, Some(value)) = (own(name), value) {
                copy_open = attr::set_attribute(&copy_open, name, value);
            }
        }
        if let Some(t) = compose(parent.transform.as_deref(), own("transform").as_deref()) {
            copy_open = attr::set_attribute(&copy_open, "transform", &t);
        }
        let rest = &doc[tag.end..element.end];

        for color in colors {
            let mut head = copy_open.clone();
            if opts.to_black {
                for name in ["stroke", "fill"] {
                    let own_color = attr::get_attribute(&head, name).and_then(|v| color_key(&v));
                    if own_color.as_deref() == Some(color.as_str()) {
                        head = attr::set_attribute(&head, name, "#000000");
                    }
                }
            }
            buckets.entry(color).or_default().push(format!("{head}{rest}"));
        }
    }

    tracing::debug!(colors = buckets.len(), "collected color layers");

    let header = layer_header(root_open);
    let background = opts.keep_background.then(|| {
        let (w, h) = super::canvas::canvas_size(doc);
        format!(
            r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
            fmt_number(w),
            fmt_number(h)
        )
    });

    Ok(buckets
        .into_iter()
        .map(|(color, elements)| {
            let mut document = header.clone();
            for part in background.iter().map(String::as_str).chain(definitions.iter().copied()) {
                document.push_str(part);
                document.push('\n');
            }
            for element in &elements {
                document.push_str(element);
                document.push('\n');
            }
            document.push_str("</svg>\n");
            ColorLayer {
                color,
                elements: elements.len(),
                document,
            }
        })
        .collect())
}

/// A fresh root keeping the source's namespaces, size and viewBox.
fn layer_header(root_open: &str) -> String {
    let get = |name: &str| attr::get_attribute(root_open, name);
    let length = |name: &str| {
        get(name).unwrap_or_else(|| {
            get("viewBox")
                .and_then(|vb| {
                    let parts: Vec<&str> = vb
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|p| !p.is_empty())
                        .collect();
                    let i = if name == "width" { 2 } else { 3 };
                    parts.get(i).map(|p| p.to_string())
                })
                .unwrap_or_else(|| fmt_number(FALLBACK_EXTENT))
        })
    };

    let mut header = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
        length("width"),
        length("height")
    );
    if let Some(vb) = get("viewBox") {
        header.push_str(&format!(r#" viewBox="{vb}""#));
    }
    if let Some(xlink) = get("xmlns:xlink") {
        header.push_str(&format!(r#" xmlns:xlink="{xlink}""#));
    }
    header.push_str(">\n");
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50">
<defs><linearGradient id="g"/></defs>
<rect width="100" height="50" fill="url(#g)"/>
<g stroke="red" transform="translate(5 5)">
  <line x1="0" y1="0" x2="10" y2="10"/>
  <circle r="3" fill="#00F" transform="scale(2)"/>
</g>
<path d="M0 0" stroke="#ff0000" fill="none"/>
<!-- <circle r="9" fill="green"/> -->
</svg>
"##;

    fn by_color(layers: &[ColorLayer]) -> Vec<(&str, usize)> {
        layers.iter().map(|l| (l.color.as_str(), l.elements)).collect()
    }

    #[test]
    fn colors_are_normalized() {
        assert_eq!(color_key("Red").as_deref(), Some("#ff0000"));
        assert_eq!(color_key("#ABC").as_deref(), Some("#aabbcc"));
        assert_eq!(color_key("rgb(255, 0, 16)").as_deref(), Some("#ff0010"));
        assert_eq!(color_key("#123456").as_deref(), Some("#123456"));
        assert_eq!(color_key("none"), None);
        assert_eq!(color_key("url(#g)"), None);
        assert_eq!(color_key("transparent"), None);
    }

    #[test]
    fn elements_land_in_every_color_they_use() {
        let layers = split_by_color(DOC, &SplitOptions::default()).unwrap();
        assert_eq!(by_color(&layers), vec![("#ff0000", 3), ("#0000ff", 1)]);

        let blue = &layers[1].document;
        assert!(blue.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50" viewBox="0 0 100 50">"#
        ));
        assert!(blue.contains(r#"<linearGradient id="g"/>"#));
        assert!(blue.contains(
            r##"<circle r="3" fill="#00F" transform="translate(5 5) scale(2)" stroke="red"/>"##
        ), "{blue}");
        assert!(!blue.contains("<line"));
    }

    #[test]
    fn scope_and_black_conversion() {
        let opts = SplitOptions {
            scope: ColorScope::StrokeOnly,
            to_black: true,
            keep_background: true,
        };
        let layers = split_by_color(DOC, &opts).unwrap();
        assert_eq!(by_color(&layers), vec![("#ff0000", 3)]);
        let red = &layers[0].document;
        assert!(red.contains(r##"<rect width="100" height="50" fill="#ffffff"/>"##));
        assert!(red.contains(r##"<path d="M0 0" stroke="#000000" fill="none"/>"##));
        assert!(red.contains(r##"fill="#00F" transform="translate(5 5) scale(2)" stroke="#000000""##));
    }

    #[test]
    fn unpainted_documents_split_into_nothing() {
        let layers = split_by_color("<svg><g><rect/></g></svg>", &SplitOptions::default()).unwrap();
        assert!(layers.is_empty());
    }

    #[test]
    fn file_names_drop_the_hash() {
        let layer = ColorLayer {
            color: "#e53935".to_string(),
            elements: 1,
            document: String::new(),
        };
        assert_eq!(layer.file_name("art"), "art-e53935.svg");
        let odd = ColorLayer {
            color: "hsl(0,50%,50%)".to_string(),
            ..layer
        };
        assert_eq!(odd.file_name("art"), "art-hsl_0_50__50__.svg");
    }
}
