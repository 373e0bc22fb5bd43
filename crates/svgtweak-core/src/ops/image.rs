//! `<image>` elements, optionally embedding the picture as a data URI.

use super::Outcome;
use super::add::push_attributes;
use crate::attr::AttributeSet;
use crate::error::{Error, Result};
use crate::mutate;
use crate::num::fmt_number;
use crate::options::OptionPairs;
use base64::Engine as _;
use std::path::Path;

/// How the picture fits its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fit {
    #[default]
    Meet,
    Slice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    /// `none` stretches; otherwise an alignment such as `xMidYMid`.
    pub preserve: String,
    pub fit: Fit,
    pub embed: bool,
    /// Passed through to the element (`id`, `opacity`, `clip-path`, ...).
    pub attributes: AttributeSet,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            preserve: "xMidYMid".to_string(),
            fit: Fit::Meet,
            embed: false,
            attributes: AttributeSet::new(),
        }
    }
}

impl ImageOptions {
    /// Parses `meet`/`slice` words and `key=value` pairs.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let (words, mut pairs) = OptionPairs::split(args);
        let mut opts = Self::default();
        for word in words {
            opts.fit = match word.as_str() {
                "meet" => Fit::Meet,
                "slice" => Fit::Slice,
                other => return Err(Error::invalid_option("fit", other)),
            };
        }
        if let Some(preserve) = pairs.take("preserve") {
            opts.preserve = preserve;
        }
        if let Some(embed) = pairs.take("embed") {
            opts.embed = match embed.as_str() {
                "true" => true,
                "false" => false,
                other => return Err(Error::invalid_option("embed", other)),
            };
        }
        opts.attributes = pairs.into_attributes();
        Ok(opts)
    }

    fn preserve_aspect_ratio(&self) -> String {
        if self.preserve == "none" {
            return "none".to_string();
        }
        let fit = match self.fit {
            Fit::Meet => "meet",
            Fit::Slice => "slice",
        };
        format!("{} {fit}", self.preserve)
    }
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Reads `path` into a base64 `data:` URI, the MIME type taken from the extension.
pub fn data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{encoded}", mime_type(path)))
}

/// The `href` to write for `src`. With `embed`, local files (resolved against `base_dir`) become
/// data URIs; URLs and existing data URIs are kept. An unreadable file falls back to the plain
/// reference.
pub fn image_href(src: &str, base_dir: Option<&Path>, embed: bool) -> String {
    if !embed || src.starts_with("http") || src.starts_with("data:") {
        return src.to_string();
    }
    let path = Path::new(src);
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    match data_uri(&path) {
        Ok(uri) => uri,
        Err(err) => {
            tracing::warn!(%err, "could not embed image; using the path reference instead");
            src.to_string()
        }
    }
}

/// Appends an `<image>` before the root closing tag.
pub fn add_image(
    doc: &str,
    href: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    opts: &ImageOptions,
) -> Result<Outcome> {
    if href.is_empty() {
        return Err(Error::usage("add-image needs an image source"));
    }
    let (x, y) = (fmt_number(x), fmt_number(y));
    let (w, h) = (fmt_number(width), fmt_number(height));
    let mut el = format!(
        r#"<image href="{}" x="{x}" y="{y}" width="{w}" height="{h}" preserveAspectRatio="{}""#,
        htmlize::escape_attribute(href),
        opts.preserve_aspect_ratio()
    );
    push_attributes(&mut el, &opts.attributes);
    el.push_str("/>\n");

    let out = mutate::insert_before_root_close(doc, &el)?;
    let embedded = if href.starts_with("data:") {
        " (embedded)"
    } else {
        ""
    };
    Ok(Outcome::changed(
        out,
        format!("Added image at ({x}, {y}) {w}x{h}{embedded}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const DOC: &str = "<svg viewBox=\"0 0 100 100\">\n</svg>\n";
    const NONE: &[&str] = &[];

    #[test]
    fn reference_with_default_fit() {
        let opts = ImageOptions::parse(NONE).unwrap();
        let out = add_image(DOC, "photo.jpg", 5.0, 5.0, 50.0, 40.0, &opts).unwrap();
        assert_eq!(
            out.document,
            "<svg viewBox=\"0 0 100 100\">\n<image href=\"photo.jpg\" x=\"5\" y=\"5\" width=\"50\" height=\"40\" preserveAspectRatio=\"xMidYMid meet\"/>\n</svg>\n"
        );
        assert_eq!(out.messages, vec!["Added image at (5, 5) 50x40"]);
    }

    #[test]
    fn options_and_pass_through_attributes() {
        let opts = ImageOptions::parse(&["slice", "preserve=xMinYMin", "opacity=0.5", "id=bg"])
            .unwrap();
        assert_eq!(opts.preserve_aspect_ratio(), "xMinYMin slice");
        let out = add_image(DOC, "bg.png", 0.0, 0.0, 100.0, 100.0, &opts).unwrap();
        assert!(out.document.contains(
            r#"preserveAspectRatio="xMinYMin slice" opacity="0.5" id="bg"/>"#
        ));

        let stretch = ImageOptions::parse(&["preserve=none", "slice"]).unwrap();
        assert_eq!(stretch.preserve_aspect_ratio(), "none");
        assert!(ImageOptions::parse(&["stretch"]).is_err());
    }

    #[test]
    fn embedding_reads_relative_to_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("dot.gif")).unwrap();
        file.write_all(b"GIF89a").unwrap();

        let href = image_href("dot.gif", Some(dir.path()), true);
        assert_eq!(href, "data:image/gif;base64,R0lGODlh");

        let out = add_image(DOC, &href, 1.0, 2.0, 3.0, 4.0, &ImageOptions::default()).unwrap();
        assert_eq!(out.messages, vec!["Added image at (1, 2) 3x4 (embedded)"]);
    }

    #[test]
    fn unreadable_or_remote_sources_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(image_href("missing.png", Some(dir.path()), true), "missing.png");
        assert_eq!(
            image_href("https://example.com/a.png", None, true),
            "https://example.com/a.png"
        );
        assert_eq!(image_href("a.png", None, false), "a.png");
        assert!(matches!(
            data_uri(&dir.path().join("missing.png")),
            Err(Error::Io { .. })
        ));
    }
}
