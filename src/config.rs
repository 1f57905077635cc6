use crate::ir::{Direction, NodeKind};
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Layered layout; stored positions are ignored.
    Auto,
    /// Stored positions win; unpositioned nodes take their layered position.
    Manual,
    /// Manual when every node carries a position, otherwise auto.
    Preset,
}

impl LayoutMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "auto" | "layered" => Some(Self::Auto),
            "manual" => Some(Self::Manual),
            "preset" => Some(Self::Preset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Minimum drawn size per node kind, plus the footprint each kind reserves
/// inside cluster boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSizeConfig {
    pub service: NodeSize,
    pub engine: NodeSize,
    pub router: NodeSize,
    pub service_footprint: NodeSize,
    pub engine_footprint: NodeSize,
    pub router_footprint: NodeSize,
}

impl NodeSizeConfig {
    pub fn size(&self, kind: NodeKind) -> NodeSize {
        match kind {
            NodeKind::Service => self.service,
            NodeKind::Engine => self.engine,
            NodeKind::Router => self.router,
        }
    }

    pub fn footprint(&self, kind: NodeKind) -> NodeSize {
        match kind {
            NodeKind::Service => self.service_footprint,
            NodeKind::Engine => self.engine_footprint,
            NodeKind::Router => self.router_footprint,
        }
    }
}

impl Default for NodeSizeConfig {
    fn default() -> Self {
        Self {
            service: NodeSize::new(80.0, 60.0),
            engine: NodeSize::new(250.0, 200.0),
            router: NodeSize::new(200.0, 100.0),
            service_footprint: NodeSize::new(150.0, 80.0),
            engine_footprint: NodeSize::new(250.0, 200.0),
            router_footprint: NodeSize::new(200.0, 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub direction: Option<Direction>,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin: f32,
    pub cluster_padding: f32,
    pub order_passes: usize,
    pub edge_detour: f32,
    pub label_line_height: f32,
    pub label_padding: f32,
    pub fast_text_metrics: bool,
    pub sizes: NodeSizeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Preset,
            direction: None,
            node_spacing: 120.0,
            rank_spacing: 120.0,
            margin: 40.0,
            cluster_padding: 50.0,
            order_passes: 4,
            edge_detour: 40.0,
            label_line_height: 1.3,
            label_padding: 16.0,
            fast_text_metrics: true,
            sizes: NodeSizeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub show_legend: bool,
    pub show_minimap: bool,
    pub legend_width: f32,
    pub minimap_width: f32,
    pub animate_edges: bool,
    pub edge_dash: String,
    pub corner_radius: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            show_legend: true,
            show_minimap: true,
            legend_width: 300.0,
            minimap_width: 220.0,
            animate_edges: true,
            edge_dash: "6 4".to_string(),
            corner_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    pub interval_ms: u64,
    pub change_probability: f64,
    /// Draw weights for healthy, warning and critical.
    pub weights: [f64; 3],
    pub frames: usize,
    pub seed: Option<u64>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            change_probability: 0.2,
            weights: [0.7, 0.2, 0.1],
            frames: 1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub status: StatusConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    line_color: Option<String>,
    infrastructure_color: Option<String>,
    engine_fill: Option<String>,
    router_fill: Option<String>,
    panel_background: Option<String>,
    panel_border: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    mode: Option<String>,
    direction: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    margin: Option<f32>,
    cluster_padding: Option<f32>,
    order_passes: Option<usize>,
    edge_detour: Option<f32>,
    label_line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
    service_size: Option<[f32; 2]>,
    engine_size: Option<[f32; 2]>,
    router_size: Option<[f32; 2]>,
    service_footprint_size: Option<[f32; 2]>,
    engine_footprint_size: Option<[f32; 2]>,
    router_footprint_size: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    show_legend: Option<bool>,
    show_minimap: Option<bool>,
    legend_width: Option<f32>,
    minimap_width: Option<f32>,
    animate_edges: Option<bool>,
    edge_dash: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StatusConfigFile {
    interval_ms: Option<u64>,
    change_probability: Option<f64>,
    weights: Option<[f64; 3]>,
    frames: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    status: Option<StatusConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme preset, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.infrastructure_color {
            config.theme.infrastructure_color = v;
        }
        if let Some(v) = vars.engine_fill {
            config.theme.engine_fill = v;
        }
        if let Some(v) = vars.router_fill {
            config.theme.router_fill = v;
        }
        if let Some(v) = vars.panel_background {
            config.theme.panel_background = v;
        }
        if let Some(v) = vars.panel_border {
            config.theme.panel_border = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.mode {
            config.layout.mode = LayoutMode::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("unknown layout mode `{v}`"))?;
        }
        if let Some(v) = layout.direction {
            config.layout.direction = Some(
                Direction::from_token(&v)
                    .ok_or_else(|| anyhow::anyhow!("unknown direction `{v}`"))?,
            );
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
        if let Some(v) = layout.cluster_padding {
            config.layout.cluster_padding = v;
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
        if let Some(v) = layout.edge_detour {
            config.layout.edge_detour = v;
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
        if let Some([w, h]) = layout.service_size {
            config.layout.sizes.service = NodeSize::new(w, h);
        }
        if let Some([w, h]) = layout.engine_size {
            config.layout.sizes.engine = NodeSize::new(w, h);
        }
        if let Some([w, h]) = layout.router_size {
            config.layout.sizes.router = NodeSize::new(w, h);
        }
        if let Some([w, h]) = layout.service_footprint_size {
            config.layout.sizes.service_footprint = NodeSize::new(w, h);
        }
        if let Some([w, h]) = layout.engine_footprint_size {
            config.layout.sizes.engine_footprint = NodeSize::new(w, h);
        }
        if let Some([w, h]) = layout.router_footprint_size {
            config.layout.sizes.router_footprint = NodeSize::new(w, h);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.show_legend {
            config.render.show_legend = v;
        }
        if let Some(v) = render.show_minimap {
            config.render.show_minimap = v;
        }
        if let Some(v) = render.legend_width {
            config.render.legend_width = v;
        }
        if let Some(v) = render.minimap_width {
            config.render.minimap_width = v;
        }
        if let Some(v) = render.animate_edges {
            config.render.animate_edges = v;
        }
        if let Some(v) = render.edge_dash {
            config.render.edge_dash = v;
        }
    }

    if let Some(status) = parsed.status {
        if let Some(v) = status.interval_ms {
            config.status.interval_ms = v.max(1);
        }
        if let Some(v) = status.change_probability {
            config.status.change_probability = v.clamp(0.0, 1.0);
        }
        if let Some(v) = status.weights {
            if v.iter().any(|w| *w < 0.0) || v.iter().sum::<f64>() <= 0.0 {
                return Err(anyhow::anyhow!("status weights must be non-negative with a positive sum"));
            }
            config.status.weights = v;
        }
        if let Some(v) = status.frames {
            config.status.frames = v.max(1);
        }
        if status.seed.is_some() {
            config.status.seed = status.seed;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_sections_onto_defaults() {
        let config = parse_config(
            r##"{
                "theme": "midnight",
                "themeVariables": { "lineColor": "#123456" },
                "layout": { "mode": "auto", "direction": "TD", "rankSpacing": 80, "engineSize": [300, 220] },
                "render": { "showMinimap": false },
                "status": { "frames": 0, "seed": 7, "changeProbability": 3.0 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, Theme::midnight().background);
        assert_eq!(config.theme.line_color, "#123456");
        assert_eq!(config.layout.mode, LayoutMode::Auto);
        assert_eq!(config.layout.direction, Some(Direction::TopDown));
        assert_eq!(config.layout.rank_spacing, 80.0);
        assert_eq!(config.layout.sizes.engine, NodeSize::new(300.0, 220.0));
        assert_eq!(config.layout.node_spacing, LayoutConfig::default().node_spacing);
        assert!(!config.render.show_minimap);
        assert!(config.render.show_legend);
        assert_eq!(config.status.frames, 1);
        assert_eq!(config.status.seed, Some(7));
        assert_eq!(config.status.change_probability, 1.0);
    }

    #[test]
    fn footprints_are_separate_from_drawn_sizes() {
        let sizes = NodeSizeConfig::default();
        assert_eq!(sizes.size(NodeKind::Service), NodeSize::new(80.0, 60.0));
        assert_eq!(sizes.footprint(NodeKind::Service), NodeSize::new(150.0, 80.0));
        assert_eq!(sizes.footprint(NodeKind::Engine), NodeSize::new(250.0, 200.0));
        assert_eq!(sizes.size(NodeKind::Router), NodeSize::new(200.0, 100.0));

        let config = parse_config(
            r#"{ "layout": { "serviceFootprintSize": [120, 90], "serviceSize": [70, 50] } }"#,
        )
        .unwrap();
        assert_eq!(config.layout.sizes.service_footprint, NodeSize::new(120.0, 90.0));
        assert_eq!(config.layout.sizes.service, NodeSize::new(70.0, 50.0));
        assert_eq!(config.layout.sizes.router_footprint, NodeSize::new(200.0, 100.0));
    }

    #[test]
    fn rejects_bad_weights_and_modes() {
        assert!(parse_config(r#"{ "status": { "weights": [0, 0, 0] } }"#).is_err());
        assert!(parse_config(r#"{ "layout": { "mode": "spiral" } }"#).is_err());
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.cluster_padding, 50.0);
        assert_eq!(config.status.interval_ms, 3000);
    }
}
