use std::path::{Path, PathBuf};
use svgtweak::document::Document;
use svgtweak::num::{parse_count, parse_number};
use svgtweak::ops::{
    self, ClipShape, ColorScope, DefsKind, GradientKind, ImageOptions, ListOptions, MarkerKind,
    MarkerOptions, MaskKind, Outcome, Shape, SizeMode, SplitOptions, TextPathMode,
    TextPathOptions, Transform,
};
use svgtweak::options::{AnimateOptions, LinearGradientOptions, RadialGradientOptions, TextOptions};
use svgtweak::raster::{self, RasterError, RasterFormat, RasterOptions};
use svgtweak::{AttributeSet, CloneOptions, LayerAction, OptionPairs, Selection};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(String),
    Io(std::io::Error),
    Svg(svgtweak::Error),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Svg(err) => write!(f, "Error: {err}"),
            CliError::Raster(err) => write!(f, "Render error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<svgtweak::Error> for CliError {
    fn from(value: svgtweak::Error) -> Self {
        Self::Svg(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// One operation that rewrites an existing document in place.
#[derive(Debug)]
enum FileOp {
    Delete {
        selection: Selection,
    },
    Edit {
        selection: Selection,
        name: String,
        value: Option<String>,
    },
    Clone {
        selection: Selection,
        opts: CloneOptions,
    },
    Group {
        selection: Selection,
        id: String,
        attrs: AttributeSet,
    },
    Transform {
        selection: Selection,
        transform: Transform,
    },
    Animate {
        selection: Selection,
        kind: String,
        values: String,
        dur: String,
        opts: AnimateOptions,
    },
    Layer {
        selection: Selection,
        action: LayerAction,
    },
    AddShape {
        shape: Shape,
        attrs: AttributeSet,
    },
    AddText {
        x: f64,
        y: f64,
        text: String,
        opts: TextOptions,
    },
    AddUse {
        id: String,
        x: f64,
        y: f64,
        attrs: AttributeSet,
    },
    AddGradient {
        kind: GradientKind,
        id: String,
        colors: String,
    },
    AddClipPath {
        shape: ClipShape,
        id: String,
        args: Vec<String>,
    },
    AddMask {
        kind: MaskKind,
        id: String,
        args: Vec<String>,
        invert: bool,
    },
    AddMarker {
        kind: MarkerKind,
        id: String,
        opts: MarkerOptions,
    },
    AddImage {
        src: String,
        /// Relative sources are embedded from here.
        base_dir: Option<PathBuf>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        opts: ImageOptions,
    },
    AddTextPath {
        mode: TextPathMode,
        text: String,
        opts: TextPathOptions,
    },
    RemoveAnimations,
    RemoveDefs {
        kinds: Vec<DefsKind>,
        unused: bool,
    },
    SetSize {
        width: String,
        height: String,
        mode: SizeMode,
    },
    ConvertColors {
        color: String,
        scope: ColorScope,
        keep_white: bool,
    },
}

impl FileOp {
    fn apply(&self, doc: &str) -> svgtweak::Result<Outcome> {
        match self {
            FileOp::Delete { selection } => ops::delete(doc, selection),
            FileOp::Edit {
                selection,
                name,
                value,
            } => ops::edit(doc, selection, name, value.as_deref()),
            FileOp::Clone { selection, opts } => ops::clone(doc, selection, opts),
            FileOp::Group {
                selection,
                id,
                attrs,
            } => ops::group(doc, selection, id, attrs),
            FileOp::Transform {
                selection,
                transform,
            } => ops::apply_transform(doc, selection, *transform),
            FileOp::Animate {
                selection,
                kind,
                values,
                dur,
                opts,
            } => ops::animate(doc, selection, kind, values, dur, opts),
            FileOp::Layer { selection, action } => ops::layer(doc, selection, *action),
            FileOp::AddShape { shape, attrs } => ops::add_shape(doc, shape, attrs.clone()),
            FileOp::AddText { x, y, text, opts } => ops::add_text(doc, *x, *y, text, opts),
            FileOp::AddUse { id, x, y, attrs } => ops::add_use(doc, id, *x, *y, attrs),
            FileOp::AddGradient { kind, id, colors } => ops::add_gradient(doc, kind, id, colors),
            FileOp::AddClipPath { shape, id, args } => {
                ops::add_clip_path(doc, *shape, id, args.as_slice())
            }
            FileOp::AddMask {
                kind,
                id,
                args,
                invert,
            } => ops::add_mask(doc, *kind, id, args.as_slice(), *invert),
            FileOp::AddMarker { kind, id, opts } => ops::add_marker(doc, *kind, id, opts),
            FileOp::AddImage {
                src,
                base_dir,
                x,
                y,
                width,
                height,
                opts,
            } => {
                let href = ops::image_href(src, base_dir.as_deref(), opts.embed);
                ops::add_image(doc, &href, *x, *y, *width, *height, opts)
            }
            FileOp::AddTextPath { mode, text, opts } => ops::add_text_path(doc, mode, text, opts),
            FileOp::RemoveAnimations => ops::remove_animations(doc),
            FileOp::RemoveDefs { kinds, unused } => ops::remove_defs(doc, kinds, *unused),
            FileOp::SetSize {
                width,
                height,
                mode,
            } => ops::set_size(doc, width, height, *mode),
            FileOp::ConvertColors {
                color,
                scope,
                keep_white,
            } => ops::convert_colors(doc, color, *scope, *keep_white),
        }
    }
}

#[derive(Debug)]
enum Command {
    Help(String),
    Apply {
        file: PathBuf,
        op: FileOp,
    },
    List {
        file: PathBuf,
        opts: ListOptions,
        json: bool,
    },
    Init {
        out: PathBuf,
        width: f64,
        height: f64,
        background: String,
    },
    Render {
        file: PathBuf,
        out: Option<PathBuf>,
        opts: RasterOptions,
    },
    Split {
        file: PathBuf,
        opts: SplitOptions,
    },
}

fn usage() -> &'static str {
    "svgtweak\n\
\n\
USAGE:\n\
  svgtweak delete <file> <selector>\n\
  svgtweak edit <file> <selector> <attr> <value>\n\
  svgtweak edit <file> <selector> <attr> --remove\n\
  svgtweak clone <file> <selector> [dx=N] [dy=N] [count=N] [attr=value ...]\n\
  svgtweak group <file> <selector> <group-id> [attr=value ...]\n\
  svgtweak transform <file> <selector> <rotate|scale|translate|skewX|skewY|flip|reset> [args...]\n\
  svgtweak animate <file> <selector> <type> <values> <dur> [repeat=N|indefinite] [ease=...]\n\
  svgtweak layer <file> <selector> <front|back|up|down>\n\
  svgtweak list <file> [filter] [--summary] [--verbose] [--json]\n\
  svgtweak add-circle <file> <cx> <cy> <r> [fill] [attr=value ...]\n\
  svgtweak add-rect <file> <x> <y> <width> <height> [fill] [attr=value ...]\n\
  svgtweak add-ellipse <file> <cx> <cy> <rx> <ry> [fill] [attr=value ...]\n\
  svgtweak add-line <file> <x1> <y1> <x2> <y2> [stroke] [stroke-width] [attr=value ...]\n\
  svgtweak add-polygon <file> <points> [fill] [attr=value ...]\n\
  svgtweak add-regular-polygon <file> <cx> <cy> <r> <sides> [fill] [attr=value ...]\n\
  svgtweak add-path <file> <d> [fill] [stroke] [stroke-width] [attr=value ...]\n\
  svgtweak add-text <file> <x> <y> <text> [rotate=N] [attr=value ...]\n\
  svgtweak add-use <file> <ref-id> <x> <y> [attr=value ...]\n\
  svgtweak add-gradient <file> <linear|radial> <id> <colors> [angle=N|x1= y1= x2= y2=|cx= cy= r= fx= fy=]\n\
  svgtweak add-clip-path <file> <circle|ellipse|rect|inset|polygon|path> <id> [args...]\n\
  svgtweak add-mask <file> <circle|rect|ellipse|radial-fade|linear-fade|vignette> <id> [args...] [invert=true]\n\
  svgtweak add-marker <file> <arrow|arrow-reverse|dot|square|diamond|circle-open> <id> [size=N] [fill=COLOR] [stroke=COLOR]\n\
  svgtweak add-image <file> <src> <x> <y> <width> <height> [meet|slice] [preserve=ALIGN|none] [embed=true] [attr=value ...]\n\
  svgtweak add-text-path <file> <path|circle|arc|wave> <text> [args...] [offset=N] [side=left|right] [id=ID] [attr=value ...]\n\
  svgtweak remove-animations <file>\n\
  svgtweak remove-defs <file> [all|unused|gradients|filters|patterns|markers|masks|clip-paths ...]\n\
  svgtweak set-size <file> <width> <height> [uniform|scale-to-fit|stretch]\n\
  svgtweak init <output> [width] [height] [background]\n\
  svgtweak convert-colors <file> <color> [stroke-only|fill-only] [keep-white]\n\
  svgtweak split-by-color <file> [stroke-only|fill-only] [to-black] [keep-bg]\n\
  svgtweak render <file> [out] [format=png|jpg|pdf] [scale=N] [background=COLOR] [quality=1-100]\n\
\n\
SELECTORS:\n\
  tag, tag:N, tag:-N, tag:A-B, all, all:N; join with commas for a union (circle:0,rect:1)\n\
\n\
NOTES:\n\
  - The input file is rewritten in place; nothing is written when an operation changes nothing.\n\
  - split-by-color leaves the input alone and writes <name>-<color>.svg next to it.\n\
  - Colors: `a,b,c` spreads stops evenly; `a@0,b@30,c@100` sets explicit offsets.\n\
  - Log verbosity is read from SVGTWEAK_LOG (falls back to RUST_LOG, default `warn`).\n"
}

fn bad_args(command: &str) -> CliError {
    let line = usage()
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(&format!("svgtweak {command} ")))
        .unwrap_or("svgtweak --help");
    CliError::Usage(format!("Usage: {line}"))
}

fn take_flag(flags: &mut Vec<String>, name: &str) -> bool {
    let before = flags.len();
    flags.retain(|f| f != name);
    flags.len() != before
}

fn number(key: &str, value: &str) -> Result<f64, CliError> {
    Ok(parse_number(key, value)?)
}

/// Positional paint overrides (`fill`, `stroke`, ...) followed by free-form `key=value` attributes.
fn paint_attributes(
    names: &[&str],
    positional: &[String],
    pairs: OptionPairs,
) -> Option<AttributeSet> {
    if positional.len() > names.len() {
        return None;
    }
    let mut attrs: AttributeSet = names
        .iter()
        .zip(positional)
        .map(|(name, value)| (name.to_string(), Some(value.clone())))
        .collect();
    attrs.extend(pairs.into_attributes());
    Some(attrs)
}

fn apply(file: &str, op: FileOp) -> Command {
    Command::Apply {
        file: PathBuf::from(file),
        op,
    }
}

fn parse_args(argv: &[String]) -> Result<Command, CliError> {
    let Some(command) = argv.get(1).map(String::as_str) else {
        return Err(CliError::Usage(usage().to_string()));
    };
    if matches!(command, "--help" | "-h" | "help") {
        return Ok(Command::Help(usage().to_string()));
    }

    let (operands, mut flags): (Vec<String>, Vec<String>) =
        argv[2..].iter().cloned().partition(|a| !a.starts_with("--"));
    if take_flag(&mut flags, "--help") {
        return Ok(Command::Help(usage().to_string()));
    }
    let bad = || bad_args(command);

    let parsed = match command {
        "delete" => {
            let [file, selector] = operands.as_slice() else {
                return Err(bad());
            };
            apply(
                file,
                FileOp::Delete {
                    selection: selector.parse()?,
                },
            )
        }
        "edit" => {
            let remove = take_flag(&mut flags, "--remove");
            let (file, selector, name, value) = match (operands.as_slice(), remove) {
                ([f, s, n], true) => (f, s, n, None),
                ([f, s, n, v], false) => (f, s, n, Some(v.clone())),
                _ => return Err(bad()),
            };
            apply(
                file,
                FileOp::Edit {
                    selection: selector.parse()?,
                    name: name.clone(),
                    value,
                },
            )
        }
        "clone" => {
            let [file, selector, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::Clone {
                    selection: selector.parse()?,
                    opts: CloneOptions::from_pairs(pairs)?,
                },
            )
        }
        "group" => {
            let [file, selector, id, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::Group {
                    selection: selector.parse()?,
                    id: id.clone(),
                    attrs: pairs.into_attributes(),
                },
            )
        }
        "transform" => {
            let [file, selector, kind, args @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            apply(
                file,
                FileOp::Transform {
                    selection: selector.parse()?,
                    transform: Transform::parse(kind, args)?,
                },
            )
        }
        "animate" => {
            let [file, selector, kind, values, dur, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::Animate {
                    selection: selector.parse()?,
                    kind: kind.clone(),
                    values: values.clone(),
                    dur: dur.clone(),
                    opts: AnimateOptions::from_pairs(pairs)?,
                },
            )
        }
        "layer" => {
            let [file, selector, action] = operands.as_slice() else {
                return Err(bad());
            };
            apply(
                file,
                FileOp::Layer {
                    selection: selector.parse()?,
                    action: action.parse()?,
                },
            )
        }
        "list" => {
            let (file, filter) = match operands.as_slice() {
                [file] => (file, None),
                [file, filter] => (file, Some(filter.clone())),
                _ => return Err(bad()),
            };
            Command::List {
                file: PathBuf::from(file),
                opts: ListOptions {
                    filter,
                    summary: take_flag(&mut flags, "--summary"),
                    verbose: take_flag(&mut flags, "--verbose"),
                },
                json: take_flag(&mut flags, "--json"),
            }
        }
        "add-circle" => {
            let [file, cx, cy, r, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::Circle {
                cx: number("cx", cx)?,
                cy: number("cy", cy)?,
                r: number("r", r)?,
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-ellipse" => {
            let [file, cx, cy, rx, ry, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::Ellipse {
                cx: number("cx", cx)?,
                cy: number("cy", cy)?,
                rx: number("rx", rx)?,
                ry: number("ry", ry)?,
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-rect" => {
            let [file, x, y, w, h, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::Rect {
                x: number("x", x)?,
                y: number("y", y)?,
                width: number("width", w)?,
                height: number("height", h)?,
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-line" => {
            let [file, x1, y1, x2, y2, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs =
                paint_attributes(&["stroke", "stroke-width"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::Line {
                x1: number("x1", x1)?,
                y1: number("y1", y1)?,
                x2: number("x2", x2)?,
                y2: number("y2", y2)?,
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-polygon" => {
            let [file, points, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::Polygon {
                points: points.clone(),
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-regular-polygon" => {
            let [file, cx, cy, r, sides, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill"], &extra, pairs).ok_or_else(bad)?;
            let shape = Shape::RegularPolygon {
                cx: number("cx", cx)?,
                cy: number("cy", cy)?,
                r: number("r", r)?,
                sides: parse_count("sides", sides)?,
            };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-path" => {
            let [file, d, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let attrs = paint_attributes(&["fill", "stroke", "stroke-width"], &extra, pairs)
                .ok_or_else(bad)?;
            let shape = Shape::Path { d: d.clone() };
            apply(file, FileOp::AddShape { shape, attrs })
        }
        "add-text" => {
            let [file, x, y, text, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::AddText {
                    x: number("x", x)?,
                    y: number("y", y)?,
                    text: text.clone(),
                    opts: TextOptions::from_pairs(pairs)?,
                },
            )
        }
        "add-use" => {
            let [file, id, x, y, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::AddUse {
                    id: id.clone(),
                    x: number("x", x)?,
                    y: number("y", y)?,
                    attrs: pairs.into_attributes(),
                },
            )
        }
        "add-gradient" => {
            let [file, kind, id, colors, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            let kind = match kind.as_str() {
                "linear" => GradientKind::Linear(LinearGradientOptions::from_pairs(pairs)?),
                "radial" => GradientKind::Radial(RadialGradientOptions::from_pairs(pairs)?),
                other => {
                    return Err(CliError::Usage(format!(
                        "Unknown gradient type: {other} (expected linear or radial)"
                    )));
                }
            };
            apply(
                file,
                FileOp::AddGradient {
                    kind,
                    id: id.clone(),
                    colors: colors.clone(),
                },
            )
        }
        "add-clip-path" => {
            let [file, shape, id, args @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            apply(
                file,
                FileOp::AddClipPath {
                    shape: shape.parse()?,
                    id: id.clone(),
                    args: args.to_vec(),
                },
            )
        }
        "add-mask" => {
            let [file, kind, id, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (args, mut pairs) = OptionPairs::split(rest);
            let invert = match pairs.take("invert").as_deref() {
                None | Some("false") => false,
                Some("true") => true,
                Some(other) => return Err(svgtweak::Error::invalid_option("invert", other).into()),
            };
            pairs.finish()?;
            apply(
                file,
                FileOp::AddMask {
                    kind: kind.parse()?,
                    id: id.clone(),
                    args,
                    invert,
                },
            )
        }
        "add-marker" => {
            let [file, kind, id, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            if !extra.is_empty() {
                return Err(bad());
            }
            apply(
                file,
                FileOp::AddMarker {
                    kind: kind.parse()?,
                    id: id.clone(),
                    opts: MarkerOptions::from_pairs(pairs)?,
                },
            )
        }
        "add-image" => {
            let [file, src, x, y, w, h, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            apply(
                file,
                FileOp::AddImage {
                    src: src.clone(),
                    base_dir: Path::new(file).parent().map(Path::to_path_buf),
                    x: number("x", x)?,
                    y: number("y", y)?,
                    width: number("width", w)?,
                    height: number("height", h)?,
                    opts: ImageOptions::parse(rest)?,
                },
            )
        }
        "add-text-path" => {
            let [file, mode, text, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (args, pairs) = OptionPairs::split(rest);
            apply(
                file,
                FileOp::AddTextPath {
                    mode: TextPathMode::parse(mode, &args)?,
                    text: text.clone(),
                    opts: TextPathOptions::from_pairs(pairs)?,
                },
            )
        }
        "remove-animations" => {
            let [file] = operands.as_slice() else {
                return Err(bad());
            };
            apply(file, FileOp::RemoveAnimations)
        }
        "remove-defs" => {
            let [file, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let mut kinds: Vec<DefsKind> = Vec::new();
            let mut unused = false;
            for word in rest {
                match word.as_str() {
                    "all" => {}
                    "unused" => unused = true,
                    other => kinds.push(other.parse()?),
                }
            }
            apply(file, FileOp::RemoveDefs { kinds, unused })
        }
        "set-size" => {
            let (file, width, height, mode) = match operands.as_slice() {
                [f, w, h] => (f, w, h, SizeMode::default()),
                [f, w, h, m] => (f, w, h, m.parse::<SizeMode>()?),
                _ => return Err(bad()),
            };
            apply(
                file,
                FileOp::SetSize {
                    width: width.clone(),
                    height: height.clone(),
                    mode,
                },
            )
        }
        "convert-colors" => {
            let [file, color, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let mut scope = ColorScope::All;
            let mut keep_white = false;
            for word in rest {
                match word.as_str() {
                    "keep-white" => keep_white = true,
                    other => scope = other.parse()?,
                }
            }
            apply(
                file,
                FileOp::ConvertColors {
                    color: color.clone(),
                    scope,
                    keep_white,
                },
            )
        }
        "split-by-color" => {
            let [file, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let mut opts = SplitOptions::default();
            for word in rest {
                match word.as_str() {
                    "to-black" => opts.to_black = true,
                    "keep-bg" => opts.keep_background = true,
                    other => opts.scope = other.parse()?,
                }
            }
            Command::Split {
                file: PathBuf::from(file),
                opts,
            }
        }
        "init" => {
            let [out, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            if rest.len() > 3 {
                return Err(bad());
            }
            let width = match rest.first() {
                Some(w) => number("width", w)?,
                None => ops::canvas::DEFAULT_WIDTH,
            };
            let height = match rest.get(1) {
                Some(h) => number("height", h)?,
                None => ops::canvas::DEFAULT_HEIGHT,
            };
            Command::Init {
                out: PathBuf::from(out),
                width,
                height,
                background: rest
                    .get(2)
                    .cloned()
                    .unwrap_or_else(|| ops::canvas::DEFAULT_BACKGROUND.to_string()),
            }
        }
        "render" => {
            let [file, rest @ ..] = operands.as_slice() else {
                return Err(bad());
            };
            let (extra, pairs) = OptionPairs::split(rest);
            let out = match extra.as_slice() {
                [] => None,
                [out] => Some(PathBuf::from(out)),
                _ => return Err(bad()),
            };
            let explicit_format = pairs.get("format").is_some();
            let mut opts = RasterOptions::from_pairs(pairs)?;
            if !explicit_format {
                if let Some(format) = out.as_deref().and_then(RasterFormat::from_path) {
                    opts.format = format;
                }
            }
            Command::Render {
                file: PathBuf::from(file),
                out,
                opts,
            }
        }
        other => {
            return Err(CliError::Usage(format!(
                "Unknown command: {other}\n\n{}",
                usage()
            )));
        }
    };

    finish(parsed, &flags)
}

fn finish(command: Command, leftover_flags: &[String]) -> Result<Command, CliError> {
    match leftover_flags.first() {
        Some(flag) => Err(CliError::Usage(format!("Unknown flag: {flag}"))),
        None => Ok(command),
    }
}

fn report(messages: &[String]) {
    for line in messages {
        println!("{line}");
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Help(text) => print!("{text}"),
        Command::Apply { file, op } => {
            let mut doc = Document::load(&file)?;
            let outcome = op.apply(doc.text())?;
            if outcome.changed {
                doc.set_text(outcome.document);
                doc.save()?;
            } else {
                tracing::debug!(path = %file.display(), "document unchanged, not rewriting");
            }
            report(&outcome.messages);
        }
        Command::List { file, opts, json } => {
            let doc = Document::load(&file)?;
            let listing = ops::list(doc.text()).filtered(opts.filter.as_deref());
            if json {
                println!("{}", listing.to_json()?);
            } else {
                print!("{}", listing.to_text(&file.display().to_string(), &opts));
            }
        }
        Command::Init {
            out,
            width,
            height,
            background,
        } => {
            let mut doc = Document::new(ops::init(width, height, &background)?);
            doc.save_as(&out)?;
            println!("Created: {}", out.display());
        }
        Command::Render { file, out, opts } => {
            let doc = Document::load(&file)?;
            let bytes = raster::render(doc.text(), &opts)?;
            let out = out.unwrap_or_else(|| raster::default_output_path(&file, opts.format));
            write_bytes(&out, &bytes)?;
            println!("Rendered: {}", out.display());
        }
        Command::Split { file, opts } => {
            let doc = Document::load(&file)?;
            let layers = ops::split_by_color(doc.text(), &opts)?;
            let base = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "split".to_string());
            let dir = file.parent().unwrap_or_else(|| Path::new(""));

            println!("Found {} unique color(s)", layers.len());
            let created = layers.len();
            for layer in layers {
                let name = layer.file_name(&base);
                println!("  {}: {} element(s) -> {name}", layer.color, layer.elements);
                Document::new(layer.document).save_as(dir.join(&name))?;
            }
            println!("Created {created} file(s)");
        }
    }
    Ok(())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SVGTWEAK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let argv: Vec<String> = std::env::args().collect();
    if let Err(err) = parse_args(&argv).and_then(run) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
