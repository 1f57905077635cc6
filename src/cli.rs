use crate::catalog;
use crate::config::{Config, LayoutMode, load_config};
use crate::ir::{Direction, Topology};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_topology;
use crate::render::{render_svg, write_output_svg};
use crate::{RenderOptions, simulate_statuses};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "subwaymap",
    version,
    about = "Render service topology subway maps to SVG or PNG"
)]
pub struct Args {
    /// Topology document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "builtin")]
    pub input: Option<PathBuf>,

    /// Render a bundled topology instead of reading input (mag7, dataflow)
    #[arg(long = "builtin")]
    pub builtin: Option<String>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (camelCase theme/layout/render/status sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Layout mode, overriding the config file
    #[arg(long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,

    /// Rank direction for layered layout
    #[arg(long = "direction", value_enum)]
    pub direction: Option<DirectionArg>,

    /// Seed for the status simulator
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Give every service a random status before rendering
    #[arg(long = "randomize")]
    pub randomize: bool,

    /// Number of simulated status frames to embed as animation
    #[arg(long = "frames", value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: Option<u32>,

    /// Omit the legend column
    #[arg(long = "no-legend")]
    pub no_legend: bool,

    /// Omit the minimap overlay
    #[arg(long = "no-minimap")]
    pub no_minimap: bool,

    /// Width of the PNG viewport
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height of the PNG viewport
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LayoutArg {
    Auto,
    Manual,
    Preset,
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutMode::Auto,
            LayoutArg::Manual => LayoutMode::Manual,
            LayoutArg::Preset => LayoutMode::Preset,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    Lr,
    Td,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Lr => Direction::LeftRight,
            DirectionArg::Td => Direction::TopDown,
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let options = apply_args(config, &args);
    let mut topology = load_topology(&args)?;
    tracing::info!(
        title = %topology.title,
        nodes = topology.nodes.len(),
        edges = topology.edges.len(),
        "loaded topology"
    );

    let frames = simulate_statuses(&mut topology, &options);
    let layout = compute_layout(&topology, &options.theme, &options.layout);
    tracing::debug!(width = layout.width, height = layout.height, manual = layout.manual, "layout done");

    match args.output_format {
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &layout, &topology, &frames)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &topology, &frames, &options.theme, &options.render, &options.status);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &topology, &frames, &options.theme, &options.render, &options.status);
            write_png(&svg, &output, &options)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, options: &RenderOptions) -> Result<()> {
    crate::render::write_output_png(svg, output, &options.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _options: &RenderOptions) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn apply_args(config: Config, args: &Args) -> RenderOptions {
    let mut options = RenderOptions::from_config(config);
    if let Some(mode) = args.layout {
        options.layout.mode = mode.into();
    }
    if let Some(direction) = args.direction {
        options.layout.direction = Some(direction.into());
    }
    if let Some(seed) = args.seed {
        options.status.seed = Some(seed);
    }
    if let Some(frames) = args.frames {
        options.status.frames = frames as usize;
    }
    if let Some(width) = args.width {
        options.render.width = width;
    }
    if let Some(height) = args.height {
        options.render.height = height;
    }
    options.randomize = args.randomize;
    options.render.show_legend &= !args.no_legend;
    options.render.show_minimap &= !args.no_minimap;
    options
}

fn load_topology(args: &Args) -> Result<Topology> {
    if let Some(path) = args.input.as_deref() {
        let input = read_input(path)?;
        return parse_topology(&input).with_context(|| format!("parsing {}", path.display()));
    }
    let name = args.builtin.as_deref().unwrap_or("mag7");
    catalog::builtin(name)?.ok_or_else(|| {
        anyhow::anyhow!(
            "unknown built-in `{name}` (available: {})",
            catalog::builtin_names().join(", ")
        )
    })
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("subwaymap").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn args_override_config() {
        let args = parse(&[
            "--layout",
            "auto",
            "--direction",
            "td",
            "--seed",
            "7",
            "--frames",
            "4",
            "--randomize",
            "--no-legend",
            "-w",
            "800",
        ]);
        let options = apply_args(Config::default(), &args);
        assert_eq!(options.layout.mode, LayoutMode::Auto);
        assert_eq!(options.layout.direction, Some(Direction::TopDown));
        assert_eq!(options.status.seed, Some(7));
        assert_eq!(options.status.frames, 4);
        assert!(options.randomize);
        assert!(!options.render.show_legend);
        assert!(options.render.show_minimap);
        assert_eq!(options.render.width, 800.0);
    }

    #[test]
    fn rejects_zero_frames_and_mixed_sources() {
        let argv = |extra: &[&str]| {
            Args::try_parse_from(std::iter::once("subwaymap").chain(extra.iter().copied()))
        };
        assert!(argv(&["--frames", "0"]).is_err());
        assert!(argv(&["-i", "x.json", "--builtin", "mag7"]).is_err());
    }

    #[test]
    fn defaults_to_mag7_and_reports_unknown_builtins() {
        let topology = load_topology(&parse(&[])).unwrap();
        assert!(topology.nodes.contains_key("ubs"));
        let err = load_topology(&parse(&["--builtin", "nope"])).unwrap_err();
        assert!(err.to_string().contains("mag7, dataflow"));
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("map.png")), "png").unwrap(),
            PathBuf::from("map.png")
        );
    }
}
