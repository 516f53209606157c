use radmap::render::raster::{self, RasterError, RasterOptions};
use radmap::render::{HeadlessError, RenderOptions};
use radmap::{GenerateRequest, MindMapDocument, RadmapConfig, TemplateGenerator, TreeSource};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Radmap(radmap::Error),
    Render(HeadlessError),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Radmap(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<radmap::Error> for CliError {
    fn from(value: radmap::Error) -> Self {
        Self::Radmap(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
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

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Generate,
    Layout,
    #[default]
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    topic: Option<String>,
    depth: Option<u32>,
    branches: Option<u32>,
    pretty: bool,
    verbosity: u8,
    config_path: Option<String>,
    overrides: Vec<(&'static str, Value)>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "radmap-cli\n\
\n\
USAGE:\n\
  radmap-cli generate [--depth <1-5>] [--branches <1-8>] [--pretty] <topic>\n\
  radmap-cli layout [--pretty] [LAYOUT OPTIONS] [<path>|-]\n\
  radmap-cli [render] [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--out <path>] [LAYOUT OPTIONS] [<path>|-]\n\
\n\
LAYOUT OPTIONS:\n\
  --config <file.json>     layered over the built-in defaults\n\
  --width <w> --height <h> surface size (default 800x600)\n\
  --base-radius <r>        radius of the first ring (default 200)\n\
  --decay <f>              per-level radius factor (default 0.7)\n\
  --id <diagram-id>        root SVG id\n\
  --topic <text>           generate the tree from a topic instead of reading JSON\n\
  --depth <n> --branches <n>  generation parameters for --topic\n\
\n\
GLOBAL:\n\
  -v, --verbose            more logging on stderr (repeatable); RADMAP_LOG overrides\n\
\n\
NOTES:\n\
  - Input is a JSON document `{\"root\": {\"text\": ..., \"children\": [...]}}`.\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG/PDF output defaults to writing next to the input file (or ./out.<ext> for stdin).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    next_value(it)?
        .parse::<f64>()
        .map_err(|_| CliError::Usage(usage()))
}

fn next_u32<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<u32, CliError> {
    next_value(it)?
        .parse::<u32>()
        .map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    // Only the first positional argument can name a command; later ones are inputs or topics.
    let mut saw_positional = false;
    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let command = match a.as_str() {
            "generate" => Some(Command::Generate),
            "layout" => Some(Command::Layout),
            "render" => Some(Command::Render),
            _ => None,
        };
        if let Some(command) = command.filter(|_| !saw_positional) {
            args.command = command;
            saw_positional = true;
            continue;
        }

        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "-v" | "--verbose" => args.verbosity = args.verbosity.saturating_add(1),
            "-vv" => args.verbosity = args.verbosity.saturating_add(2),
            "--config" => args.config_path = Some(next_value(&mut it)?.clone()),
            "--width" => args
                .overrides
                .push(("surface.width", Value::from(next_f64(&mut it)?))),
            "--height" => args
                .overrides
                .push(("surface.height", Value::from(next_f64(&mut it)?))),
            "--base-radius" => args
                .overrides
                .push(("layout.baseRadius", Value::from(next_f64(&mut it)?))),
            "--decay" => args
                .overrides
                .push(("layout.decay", Value::from(next_f64(&mut it)?))),
            "--id" => args
                .overrides
                .push(("render.diagramId", Value::from(next_value(&mut it)?.clone()))),
            "--topic" => args.topic = Some(next_value(&mut it)?.clone()),
            "--depth" => args.depth = Some(next_u32(&mut it)?),
            "--branches" => args.branches = Some(next_u32(&mut it)?),
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                saw_positional = true;
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env("RADMAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // stdout carries SVG/JSON; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn generate_request(args: &Args, topic: &str) -> GenerateRequest {
    let mut request = GenerateRequest::new(topic);
    if let Some(depth) = args.depth {
        request.depth = depth;
    }
    if let Some(branches) = args.branches {
        request.branches = branches;
    }
    request
}

fn load_config(args: &Args) -> Result<RadmapConfig, CliError> {
    let mut config = RadmapConfig::defaults();
    if let Some(path) = args.config_path.as_deref() {
        let file = RadmapConfig::from_json_str(&std::fs::read_to_string(path)?)?;
        config.deep_merge(file.as_value());
        tracing::info!(path, "loaded config file");
    }
    for (key, value) in &args.overrides {
        config.set_value(key, value.clone());
    }
    Ok(config)
}

fn load_document(args: &Args) -> Result<MindMapDocument, CliError> {
    match args.topic.as_deref() {
        Some(topic) => Ok(TemplateGenerator.generate(&generate_request(args, topic))?),
        None => Ok(MindMapDocument::from_json_str(&read_input(
            args.input.as_deref(),
        )?)?),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Generate => {
            let Some(topic) = args.input.as_deref().or(args.topic.as_deref()) else {
                return Err(CliError::Usage(usage()));
            };
            let doc = TemplateGenerator.generate(&generate_request(&args, topic))?;
            write_json(&doc, args.pretty)
        }
        Command::Layout => {
            let options = RenderOptions::from_config(&load_config(&args)?)?;
            let doc = load_document(&args)?;
            let snapshot = radmap::render::layout_snapshot(&doc, &options)?;
            write_json(&snapshot, args.pretty)
        }
        Command::Render => {
            let options = RenderOptions::from_config(&load_config(&args)?)?;
            let doc = load_document(&args)?;
            let raster_options = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..Default::default()
            };

            let format = args.render_format;
            let bytes = match format {
                RenderFormat::Svg => {
                    let mut options = options;
                    if args.background.is_some() {
                        options.svg.background = args.background.clone();
                    }
                    let svg = radmap::render::layout_and_render_svg(&doc, &options)?;
                    match args.out.as_deref() {
                        None => print!("{svg}"),
                        Some(path) => write_bytes(svg.as_bytes(), path)?,
                    }
                    return Ok(());
                }
                RenderFormat::Png => raster::render_png(&doc, &options, &raster_options)?,
                RenderFormat::Jpeg => raster::render_jpeg(&doc, &options, &raster_options)?,
                RenderFormat::Pdf => raster::render_pdf(&doc, &options)?,
            };

            let input = if args.topic.is_some() {
                None
            } else {
                args.input.as_deref()
            };
            let out = args.out.clone().unwrap_or_else(|| {
                default_raster_out_path(input, format.extension())
                    .to_string_lossy()
                    .to_string()
            });
            tracing::info!(out = %out, bytes = bytes.len(), "wrote raster output");
            write_bytes(&bytes, &out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(args.verbosity);

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
