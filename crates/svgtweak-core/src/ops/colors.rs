use super::Outcome;
use crate::attr;
use crate::error::{Error, Result};
use crate::mutate::{self, Edit};
use crate::scan;
use std::str::FromStr;

/// Which paint attributes a conversion touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorScope {
    #[default]
    All,
    StrokeOnly,
    FillOnly,
}

impl ColorScope {
    fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::All => &["stroke", "fill"],
            Self::StrokeOnly => &["stroke"],
            Self::FillOnly => &["fill"],
        }
    }
}

impl FromStr for ColorScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "stroke-only" => Ok(Self::StrokeOnly),
            "fill-only" => Ok(Self::FillOnly),
            other => Err(Error::invalid_option("scope", other)),
        }
    }
}

/// Basic color names resolved to hex; anything else is written as given.
pub fn normalize_color(color: &str) -> String {
    match color.trim().to_ascii_lowercase().as_str() {
        "black" => "#000000".to_string(),
        "white" => "#ffffff".to_string(),
        "red" => "#ff0000".to_string(),
        "green" => "#00ff00".to_string(),
        "blue" => "#0000ff".to_string(),
        "gray" | "grey" => "#808080".to_string(),
        _ => color.trim().to_string(),
    }
}

fn is_white(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "#fff" | "#ffffff" | "white"
    )
}

fn should_skip(value: &str, keep_white: bool) -> bool {
    let value = value.trim();
    value.is_empty()
        || value == "none"
        || value.starts_with("url(")
        || (keep_white && is_white(value))
}

/// Rewrites every `stroke`/`fill` value in scope to `color`. `none`, `url(…)` references and,
/// with `keep_white`, white are left alone.
pub fn convert_colors(
    doc: &str,
    color: &str,
    scope: ColorScope,
    keep_white: bool,
) -> Result<Outcome> {
    if color.trim().is_empty() {
        return Err(Error::usage("convert-colors needs a target color"));
    }
    let target = normalize_color(color);
    let (mut strokes, mut fills) = (0usize, 0usize);
    let mut edits = Vec::new();

    for tag in scan::open_tags(doc) {
        let open = &doc[tag.start..tag.end];
        let mut rewritten = open.to_string();
        for &name in scope.attributes() {
            let Some(value) = attr::get_attribute(&rewritten, name) else {
                continue;
            };
            if should_skip(&value, keep_white) {
                continue;
            }
            rewritten = attr::set_attribute(&rewritten, name, &target);
            match name {
                "stroke" => strokes += 1,
                _ => fills += 1,
            }
        }
        if rewritten != open {
            edits.push(Edit::replace(tag.start..tag.end, rewritten));
        }
    }

    let mut parts = Vec::new();
    if strokes > 0 {
        parts.push(format!("{strokes} stroke(s)"));
    }
    if fills > 0 {
        parts.push(format!("{fills} fill(s)"));
    }
    if parts.is_empty() {
        return Ok(Outcome::unchanged(doc, "No colors converted"));
    }
    let out = mutate::apply_edits(doc, edits)?;
    Ok(Outcome::changed(
        out,
        format!("Converted {} to {target}", parts.join(" and ")),
    ))
}
