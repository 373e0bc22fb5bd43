#![forbid(unsafe_code)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use svgtweak_core::OptionPairs;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Options(#[from] svgtweak_core::Error),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("SVG has an empty canvas ({width}x{height})")]
    EmptyCanvas { width: f32, height: f32 },
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color: {0}")]
    Background(String),
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
    Pdf,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }

    /// Guesses the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for RasterFormat {
    type Err = svgtweak_core::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(svgtweak_core::Error::invalid_option("format", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub format: RasterFormat,
    /// Multiplier applied to the document's intrinsic size.
    pub scale: f32,
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            format: RasterFormat::Png,
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

impl RasterOptions {
    /// Reads `format=`, `scale=`, `background=` and `quality=`; other keys are rejected.
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let mut out = Self::default();
        if let Some(format) = pairs.take("format") {
            out.format = format.parse()?;
        }
        if let Some(scale) = pairs.take_number("scale")? {
            if scale <= 0.0 {
                return Err(svgtweak_core::Error::invalid_option("scale", &scale.to_string()).into());
            }
            out.scale = scale as f32;
        }
        out.background = pairs.take("background");
        if let Some(q) = pairs.take("quality") {
            out.jpeg_quality = q
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| svgtweak_core::Error::invalid_option("quality", &q))?;
        }
        pairs.finish()?;
        Ok(out)
    }
}

/// `input` with its extension replaced by the format's (`art.svg` → `art.png`).
pub fn default_output_path(input: &Path, format: RasterFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Renders `svg` in the format chosen by `options`.
pub fn render(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    match options.format {
        RasterFormat::Png => svg_to_png(svg, options),
        RasterFormat::Jpeg => svg_to_jpeg(svg, options),
        RasterFormat::Pdf => svg_to_pdf(svg),
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let color = parse_tiny_skia_color(bg).ok_or_else(|| RasterError::Background(bg.to_string()))?;
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // Opaque fill underneath means every alpha byte is 255.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "sans-serif".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    tracing::debug!(
        width = tree.size().width(),
        height = tree.size().height(),
        "converting to PDF"
    );

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

/// Rasterizes at the document's intrinsic size (root `width`/`height`, else the viewBox size)
/// times `scale`.
fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "sans-serif".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    let size = tree.size();
    let (width, height) = (size.width(), size.height());
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(RasterError::EmptyCanvas { width, height });
    }

    let width_px = (width * scale).round().max(1.0) as u32;
    let height_px = (height * scale).round().max(1.0) as u32;
    tracing::debug!(width_px, height_px, scale, "rasterizing");

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;
    if let Some(bg) = background {
        let color =
            parse_tiny_skia_color(bg).ok_or_else(|| RasterError::Background(bg.to_string()))?;
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// `transparent`, `white`, `black`, or `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`.
fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" | "none" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::WHITE),
        "black" => return Some(tiny_skia::Color::BLACK),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let channels: Vec<u8> = match digits.len() {
        3 | 4 => digits.iter().map(|d| (d << 4) | d).collect(),
        6 | 8 => digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect(),
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;

    #[test]
    fn png_signature() {
        let bytes = svg_to_png(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn jpeg_signature_and_transparent_rejection() {
        let opts = RasterOptions {
            format: RasterFormat::Jpeg,
            ..RasterOptions::default()
        };
        let bytes = render(SQUARE, &opts).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));

        let clear = RasterOptions {
            background: Some("transparent".to_string()),
            ..opts
        };
        assert!(matches!(
            render(SQUARE, &clear),
            Err(RasterError::JpegOpaqueBackgroundRequired)
        ));
    }

    #[test]
    fn pdf_signature() {
        let bytes = svg_to_pdf(SQUARE).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn scale_multiplies_intrinsic_size() {
        let pixmap = svg_to_pixmap(SQUARE, 2.5, None).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (25, 25));
    }

    #[test]
    fn broken_svg_is_a_parse_error() {
        assert!(matches!(
            svg_to_png("<svg", &RasterOptions::default()),
            Err(RasterError::SvgParse)
        ));
    }

    #[test]
    fn colors() {
        let c = parse_tiny_skia_color("#ff000080").unwrap();
        assert_eq!(c.to_color_u8().alpha(), 0x80);
        assert_eq!(
            parse_tiny_skia_color("#0f0").unwrap().to_color_u8().green(),
            255
        );
        assert!(parse_tiny_skia_color("#12345").is_none());
        assert!(parse_tiny_skia_color("teal").is_none());
    }

    #[test]
    fn options_from_pairs() {
        let opts = RasterOptions::from_pairs(OptionPairs::from_pairs([
            ("format", "PDF"),
            ("scale", "2"),
            ("background", "#fff"),
        ]))
        .unwrap();
        assert_eq!(opts.format, RasterFormat::Pdf);
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.background.as_deref(), Some("#fff"));

        assert!(RasterOptions::from_pairs(OptionPairs::from_pairs([("dpi", "300")])).is_err());
        assert!(RasterOptions::from_pairs(OptionPairs::from_pairs([("scale", "0")])).is_err());
    }

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("out/art.svg"), RasterFormat::Jpeg),
            PathBuf::from("out/art.jpg")
        );
        assert_eq!(
            RasterFormat::from_path(Path::new("a.PDF")),
            Some(RasterFormat::Pdf)
        );
    }
}
