//! Element inventory with the selectors other commands accept.

use crate::attr;
use crate::locate;
use crate::scan;
use crate::span::{self, ElementMatch};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;

const SHAPE_TAGS: &[&str] = &[
    "rect", "circle", "ellipse", "line", "path", "polygon", "polyline", "text", "image", "use",
];
const DEF_TAGS: &[&str] = &[
    "linearGradient",
    "radialGradient",
    "filter",
    "clipPath",
    "mask",
    "pattern",
    "marker",
    "symbol",
];
const CONTAINER_TAGS: &[&str] = &["g", "svg", "defs"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// A tag name, `defs` for definitions only, or `None`/`all` for everything.
    pub filter: Option<String>,
    pub summary: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedElement {
    pub tag: String,
    /// Ordinal among elements with the same tag.
    pub index: usize,
    pub selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(rename = "viewBox", skip_serializing_if = "Option::is_none")]
    pub view_box: Option<String>,
    pub counts: IndexMap<String, usize>,
    pub definitions: Vec<ListedElement>,
    pub elements: Vec<ListedElement>,
    /// Selector hints such as `circle:0 ... circle:3`.
    pub selectors: Vec<String>,
}

fn shorten(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// The attributes worth showing for one element.
fn key_attributes(doc: &str, m: &ElementMatch) -> IndexMap<String, String> {
    let el = span::extract(doc, m);
    let open = el.open_tag();
    let mut out = IndexMap::new();
    let mut take = |name: &str, key: &str| {
        if let Some(v) = attr::get_attribute(open, name) {
            out.insert(key.to_string(), v);
        }
    };

    for name in ["fill", "stroke"] {
        if attr::get_attribute(open, name).is_some_and(|v| v != "none") {
            take(name, name);
        }
    }
    take("opacity", "opacity");
    take("transform", "transform");
    take("filter", "filter");
    take("clip-path", "clipPath");

    match m.tag.as_str() {
        "rect" => {
            for n in ["x", "y", "width", "height"] {
                take(n, n);
            }
        }
        "circle" => {
            for n in ["cx", "cy", "r"] {
                take(n, n);
            }
        }
        "ellipse" => {
            for n in ["cx", "cy", "rx", "ry"] {
                take(n, n);
            }
        }
        "line" => {
            for n in ["x1", "y1", "x2", "y2"] {
                take(n, n);
            }
        }
        "text" => {
            take("x", "x");
            take("y", "y");
            take("font-size", "fontSize");
            let inner = &el.text[open.len()..];
            let content = inner.split('<').next().unwrap_or_default();
            if !content.trim().is_empty() {
                let decoded = htmlize::unescape(content);
                out.insert("text".to_string(), shorten(&decoded, 20));
            }
        }
        "path" => {
            if let Some(d) = attr::get_attribute(open, "d") {
                out.insert("d".to_string(), shorten(&d, 30));
            }
        }
        "use" => {
            if attr::get_attribute(open, "href").is_some() {
                take("href", "href");
            } else {
                take("xlink:href", "href");
            }
            take("x", "x");
            take("y", "y");
        }
        "linearGradient" | "radialGradient" => {
            let stops = locate::find_all(&el.text, "stop").len();
            out.insert("stops".to_string(), stops.to_string());
        }
        "filter" => {
            let effects = scan::open_tags(&el.text)
                .filter(|t| t.name.starts_with("fe"))
                .count();
            out.insert("effects".to_string(), effects.to_string());
        }
        _ => {}
    }
    out
}

/// Collects every known element in document order.
pub fn list(doc: &str) -> ListReport {
    let mut counts = IndexMap::new();
    let mut found: Vec<ListedElement> = Vec::new();
    let mut positions: Vec<usize> = Vec::new();

    for &tag in SHAPE_TAGS.iter().chain(DEF_TAGS).chain(CONTAINER_TAGS) {
        let matches = locate::find_all(doc, tag);
        if matches.is_empty() {
            continue;
        }
        counts.insert(tag.to_string(), matches.len());
        for (index, m) in matches.iter().enumerate() {
            let attributes = key_attributes(doc, m);
            let id = attr::get_attribute(&doc[m.start..], "id");
            positions.push(m.start);
            found.push(ListedElement {
                tag: tag.to_string(),
                index,
                selector: format!("{tag}:{index}"),
                id,
                attributes,
            });
        }
    }

    let mut order: Vec<usize> = (0..found.len()).collect();
    order.sort_by_key(|&i| positions[i]);
    let mut slots: Vec<Option<ListedElement>> = found.into_iter().map(Some).collect();
    let ordered: Vec<ListedElement> = order.iter().filter_map(|&i| slots[i].take()).collect();

    let root = locate::root_open_tag(doc).ok().map(|r| &doc[r]);
    let root_attr = |name: &str| root.and_then(|r| attr::get_attribute(r, name));

    let selectors = counts
        .iter()
        .filter(|(t, _)| SHAPE_TAGS.contains(&t.as_str()) || t.as_str() == "g")
        .map(|(t, &n)| match n {
            1 => format!("{t}:0"),
            n => format!("{t}:0 ... {t}:{}", n - 1),
        })
        .collect();

    let (definitions, elements): (Vec<_>, Vec<_>) = ordered
        .into_iter()
        .filter(|e| e.tag != "svg" && e.tag != "defs")
        .partition(|e| DEF_TAGS.contains(&e.tag.as_str()));

    ListReport {
        width: root_attr("width"),
        height: root_attr("height"),
        view_box: root_attr("viewBox"),
        counts,
        definitions,
        elements,
        selectors,
    }
}

impl ListReport {
    /// Keeps only elements with the given tag (or only definitions for `defs`).
    pub fn filtered(mut self, filter: Option<&str>) -> Self {
        match filter {
            None | Some("all") => {}
            Some("defs") => self.elements.clear(),
            Some(tag) => {
                self.definitions.retain(|e| e.tag == tag);
                self.elements.retain(|e| e.tag == tag);
            }
        }
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering used by the CLI.
    pub fn to_text(&self, file: &str, opts: &ListOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "File: {file}");
        if let (Some(w), Some(h)) = (&self.width, &self.height) {
            let _ = writeln!(out, "Size: {w} × {h}");
        }
        if let Some(vb) = &self.view_box {
            let _ = writeln!(out, "ViewBox: {vb}");
        }
        out.push('\n');

        if opts.summary {
            self.write_summary(&mut out);
            return out;
        }

        let filter = opts.filter.as_deref();
        if !self.definitions.is_empty() {
            out.push_str("Definitions:\n");
            for el in &self.definitions {
                let id = el.id.as_deref().map(|i| format!("#{i}")).unwrap_or_default();
                let _ = writeln!(out, "  {}{id}", el.tag);
                if opts.verbose && !el.attributes.is_empty() {
                    let _ = writeln!(out, "    {}", join_attrs(&el.attributes));
                }
            }
            out.push('\n');
        }

        let shapes: Vec<&ListedElement> = self
            .elements
            .iter()
            .filter(|e| SHAPE_TAGS.contains(&e.tag.as_str()) || e.tag == "g")
            .collect();
        if !shapes.is_empty() && filter != Some("defs") {
            out.push_str("Elements:\n");
            for el in shapes {
                let _ = writeln!(out, "  {}", element_line(el, opts.verbose));
                if opts.verbose && !el.attributes.is_empty() {
                    let _ = writeln!(out, "    {}", join_attrs(&el.attributes));
                }
            }
            out.push('\n');
        }

        out.push_str("Selectors for other commands:\n");
        for hint in &self.selectors {
            let _ = writeln!(out, "  {hint}");
        }
        out
    }

    fn write_summary(&self, out: &mut String) {
        out.push_str("Element counts:\n");
        let groups: [(&str, Vec<&str>); 3] = [
            ("Shapes", SHAPE_TAGS.to_vec()),
            ("Definitions", DEF_TAGS.to_vec()),
            ("Containers", vec!["g", "defs"]),
        ];
        for (title, tags) in groups {
            let present: Vec<(&str, usize)> = tags
                .into_iter()
                .filter_map(|t| self.counts.get(t).map(|&n| (t, n)))
                .collect();
            if present.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{title}:");
            for (t, n) in present {
                let _ = writeln!(out, "  {t}: {n}");
            }
        }
        let total: usize = self
            .counts
            .iter()
            .filter(|(t, _)| t.as_str() != "svg")
            .map(|(_, n)| n)
            .sum();
        let _ = writeln!(out, "\nTotal: {total} elements");
    }
}

fn join_attrs(attrs: &IndexMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn element_line(el: &ListedElement, verbose: bool) -> String {
    let a = |k: &str| el.attributes.get(k).map(String::as_str).unwrap_or("?");
    let mut line = el.selector.clone();
    if let Some(id) = &el.id {
        let _ = write!(line, " #{id}");
    }
    match el.tag.as_str() {
        "circle" if el.attributes.contains_key("cx") => {
            let _ = write!(line, " ({}, {}) r={}", a("cx"), a("cy"), a("r"));
        }
        "rect" if el.attributes.contains_key("x") => {
            let _ = write!(line, " ({}, {}) {}×{}", a("x"), a("y"), a("width"), a("height"));
        }
        "line" => {
            let _ = write!(line, " ({},{})→({},{})", a("x1"), a("y1"), a("x2"), a("y2"));
        }
        "text" if el.attributes.contains_key("text") => {
            let _ = write!(line, " \"{}\"", a("text"));
        }
        "use" if el.attributes.contains_key("href") => {
            let _ = write!(line, " → {}", a("href"));
        }
        _ => {}
    }

    if !verbose {
        let mut style = Vec::new();
        if let Some(fill) = el.attributes.get("fill").filter(|f| f.as_str() != "#000") {
            style.push(format!("fill:{fill}"));
        }
        if let Some(stroke) = el.attributes.get("stroke") {
            style.push(format!("stroke:{stroke}"));
        }
        if let Some(opacity) = el.attributes.get("opacity") {
            style.push(format!("opacity:{opacity}"));
        }
        if !style.is_empty() {
            let _ = write!(line, " [{}]", style.join(", "));
        }
    }
    line
}
