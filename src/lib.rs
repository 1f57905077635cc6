pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod status;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

use config::{Config, LayoutConfig, RenderConfig, StatusConfig};
use ir::Topology;
use status::{StatusFrame, StatusSimulator};
use theme::Theme;

/// Everything needed to turn a topology document into SVG without the CLI.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub status: StatusConfig,
    /// Draw a uniform random status for every service before simulating.
    pub randomize: bool,
}

impl RenderOptions {
    pub fn subway() -> Self {
        Self::default()
    }

    pub fn midnight() -> Self {
        Self {
            theme: Theme::midnight(),
            ..Self::default()
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            status: config.status,
            randomize: false,
        }
    }
}

/// Apply the configured randomization and simulate `options.status.frames` frames.
///
/// The topology is left holding the statuses of frame zero.
pub fn simulate_statuses(topology: &mut Topology, options: &RenderOptions) -> Vec<StatusFrame> {
    let count = options.status.frames.max(1);
    if !options.randomize && count == 1 {
        return vec![StatusFrame::capture(topology, 0)];
    }
    let mut simulator = StatusSimulator::new(options.status.clone());
    if options.randomize {
        simulator.randomize_all(topology);
    }
    let frames = simulator.frames(topology, count);
    if let Some(first) = frames.first() {
        for (id, status) in &first.statuses {
            if let Some(node) = topology.nodes.get_mut(id) {
                node.status = *status;
            }
        }
    }
    frames
}

/// Parse, simulate, lay out and render a topology document in one call.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let mut topology = parser::parse_topology(input)?;
    Ok(render_topology(&mut topology, &options))
}

pub fn render_topology(topology: &mut Topology, options: &RenderOptions) -> String {
    let frames = simulate_statuses(topology, options);
    let layout = layout::compute_layout(topology, &options.theme, &options.layout);
    render::render_svg(
        &layout,
        topology,
        &frames,
        &options.theme,
        &options.render,
        &options.status,
    )
}
