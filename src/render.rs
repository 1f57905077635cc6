use crate::config::{RenderConfig, StatusConfig};
use crate::ir::{Flow, NodeKind, Status, Topology};
use crate::layout::{
    ClusterLayout, EdgeLayout, ENGINE_ICON, ICON_GAP, Layout, NodeLayout, ROUTER_ICON, TextBlock,
    text_width,
};
use crate::status::StatusFrame;
use crate::theme::Theme;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

const PANEL_PAD: f32 = 16.0;
const PANEL_GAP: f32 = 12.0;
const CLUSTER_FONT: f32 = 14.0;

#[derive(Clone, Copy)]
enum Anchor {
    Start,
    Middle,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        }
    }
}

/// Render a laid-out topology as a standalone SVG document.
///
/// `frames` holds the simulated status timeline; the first frame is the
/// static state and any further frames become a discrete fill animation on
/// each service node, one frame per `status.interval_ms`.
pub fn render_svg(
    layout: &Layout,
    topology: &Topology,
    frames: &[StatusFrame],
    theme: &Theme,
    config: &RenderConfig,
    status: &StatusConfig,
) -> String {
    let (legend, legend_height) = if config.show_legend {
        render_legend(topology, frames.first(), theme, config)
    } else {
        (String::new(), 0.0)
    };
    let offset_x = if config.show_legend { config.legend_width } else { 0.0 };
    let width = (offset_x + layout.width).max(200.0);
    let height = layout.height.max(legend_height).max(200.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    );
    let _ = write!(svg, "<title>{}</title>", escape_xml(&topology.title));
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    );

    let markers = marker_colors(&layout.edges);
    svg.push_str("<defs>");
    for (idx, color) in markers.iter().enumerate() {
        let _ = write!(
            svg,
            "<marker id=\"arrow-{idx}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
            escape_xml(color)
        );
    }
    svg.push_str("</defs>");

    let _ = write!(svg, "<g class=\"diagram\" transform=\"translate({offset_x:.2}, 0)\">");
    for cluster in &layout.clusters {
        svg.push_str(&cluster_svg(cluster, theme));
    }
    let dash_period = dash_period(&config.edge_dash);
    for edge in &layout.edges {
        let marker = markers.iter().position(|c| *c == edge.color).unwrap_or(0);
        svg.push_str(&edge_svg(edge, marker, dash_period, config));
    }
    let duration_ms = frames.len() as u64 * status.interval_ms;
    for node in layout.nodes.values() {
        svg.push_str(&node_svg(node, topology, frames, duration_ms, theme));
    }
    svg.push_str("</g>");

    svg.push_str(&legend);
    if config.show_minimap && !layout.nodes.is_empty() {
        svg.push_str(&render_minimap(layout, topology, theme, config, width, height));
    }

    svg.push_str("</svg>");
    svg
}

fn marker_colors(edges: &[EdgeLayout]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for edge in edges {
        if !colors.contains(&edge.color) {
            colors.push(edge.color.clone());
        }
    }
    colors
}

fn dash_period(dash: &str) -> f32 {
    let total: f32 = dash
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|part| part.trim().parse::<f32>().ok())
        .sum();
    if total > 0.0 { total } else { 10.0 }
}

fn cluster_svg(cluster: &ClusterLayout, theme: &Theme) -> String {
    let rect = &cluster.rect;
    let mut out = String::new();
    let _ = write!(out, "<g class=\"cluster\"><title>{}", escape_xml(&cluster.name));
    if let Some(description) = &cluster.description {
        let _ = write!(out, ": {}", escape_xml(description));
    }
    out.push_str("</title>");
    let _ = write!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{color}\" fill-opacity=\"0.03\" stroke=\"{color}\" stroke-width=\"2\" stroke-dasharray=\"8 4\"/>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        color = escape_xml(&cluster.color),
    );
    let _ = write!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{CLUSTER_FONT}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        rect.x + 10.0,
        rect.y + 20.0,
        escape_xml(&theme.font_family),
        escape_xml(&cluster.color),
        escape_xml(&cluster.name)
    );
    out.push_str("</g>");
    out
}

fn edge_svg(edge: &EdgeLayout, marker: usize, dash_period: f32, config: &RenderConfig) -> String {
    let d = smooth_step_path(&edge.points, config.corner_radius);
    let mut out = String::new();
    let _ = write!(
        out,
        "<path id=\"edge-{}\" class=\"edge\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" marker-end=\"url(#arrow-{marker})\"",
        escape_xml(&edge.id),
        escape_xml(&edge.color),
        edge.width
    );
    if config.animate_edges && edge.animated {
        let _ = write!(
            out,
            " stroke-dasharray=\"{}\"><animate attributeName=\"stroke-dashoffset\" from=\"{dash_period:.2}\" to=\"0\" dur=\"1s\" repeatCount=\"indefinite\"/></path>",
            escape_xml(&config.edge_dash)
        );
    } else {
        out.push_str("/>");
    }
    out
}

/// Orthogonal polyline with each interior corner rounded by up to `radius`.
fn smooth_step_path(points: &[(f32, f32)], radius: f32) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    for idx in 1..points.len() {
        let point = points[idx];
        let Some(next) = points.get(idx + 1) else {
            let _ = write!(d, " L {:.2} {:.2}", point.0, point.1);
            break;
        };
        let prev = points[idx - 1];
        let len_in = distance(prev, point);
        let len_out = distance(point, *next);
        let r = radius.min(len_in / 2.0).min(len_out / 2.0);
        if r <= 0.01 {
            let _ = write!(d, " L {:.2} {:.2}", point.0, point.1);
            continue;
        }
        let before = toward(point, prev, r);
        let after = toward(point, *next, r);
        let _ = write!(
            d,
            " L {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            before.0, before.1, point.0, point.1, after.0, after.1
        );
    }
    d
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn toward(from: (f32, f32), to: (f32, f32), amount: f32) -> (f32, f32) {
    let len = distance(from, to);
    if len <= f32::EPSILON {
        return from;
    }
    (
        from.0 + (to.0 - from.0) / len * amount,
        from.1 + (to.1 - from.1) / len * amount,
    )
}

fn node_tooltip(node: &NodeLayout, topology: &Topology, status: Option<Status>) -> String {
    let mut lines = Vec::new();
    let Some(source) = topology.nodes.get(&node.id) else {
        return escape_xml(&node.id);
    };
    lines.push(source.label.replace('\n', " "));
    if let Some(caption) = node.kind.caption() {
        lines.push(caption.to_string());
    }
    if let Some(group) = &source.group {
        lines.push(format!("Group: {group}"));
    }
    if let Some(description) = &source.description {
        lines.push(description.clone());
    }
    if let Some(status) = status {
        lines.push(format!("Status: {}", status.label()));
    }
    escape_xml(&lines.join("\n"))
}

fn node_svg(
    node: &NodeLayout,
    topology: &Topology,
    frames: &[StatusFrame],
    duration_ms: u64,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    let status = match node.kind {
        NodeKind::Service => Some(
            frames
                .first()
                .and_then(|frame| frame.statuses.get(&node.id).copied())
                .or_else(|| topology.nodes.get(&node.id).map(|n| n.status))
                .unwrap_or_default(),
        ),
        _ => None,
    };
    let _ = write!(
        out,
        "<g id=\"node-{}\" class=\"node {}\"><title>{}</title>",
        escape_xml(&node.id),
        kind_class(node.kind),
        node_tooltip(node, topology, status)
    );
    let (cx, cy) = node.rect().center();
    match node.kind {
        NodeKind::Service => {
            let color = status.unwrap_or_default().color();
            let r = node.width.min(node.height) / 2.0;
            let _ = write!(
                out,
                "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{color}\" stroke=\"{color}\" stroke-width=\"4\">"
            );
            if frames.len() > 1 {
                out.push_str(&status_animation(&node.id, frames, duration_ms));
            }
            out.push_str("</circle>");
            out.push_str(&text_block_svg(
                cx,
                cy - node.label.height / 2.0,
                &node.label,
                Anchor::Middle,
                &theme.font_family,
                &theme.service_label_color,
                "700",
            ));
        }
        NodeKind::Engine => {
            let _ = write!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"{}\" stroke=\"{}\" stroke-width=\"4\"/>",
                node.x,
                node.y,
                node.width,
                node.height,
                escape_xml(&theme.engine_fill),
                escape_xml(&theme.infrastructure_color)
            );
            let caption_height = node.caption.as_ref().map_or(0.0, |c| c.height);
            let content = ENGINE_ICON + ICON_GAP + node.label.height + caption_height;
            let top = node.y + (node.height - content) / 2.0;
            out.push_str(&engine_icon(cx, top + ENGINE_ICON / 2.0, theme));
            let label_top = top + ENGINE_ICON + ICON_GAP;
            out.push_str(&text_block_svg(
                cx,
                label_top,
                &node.label,
                Anchor::Middle,
                &theme.font_family,
                &theme.text_color,
                "700",
            ));
            if let Some(caption) = &node.caption {
                out.push_str(&text_block_svg(
                    cx,
                    label_top + node.label.height,
                    caption,
                    Anchor::Middle,
                    &theme.font_family,
                    &theme.muted_text_color,
                    "400",
                ));
            }
        }
        NodeKind::Router => {
            let r = node.height / 2.0;
            let _ = write!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r:.2}\" ry=\"{r:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
                node.x,
                node.y,
                node.width,
                node.height,
                escape_xml(&theme.router_fill),
                escape_xml(&theme.infrastructure_color)
            );
            let caption = node.caption.as_ref();
            let text_w = node.label.width.max(caption.map_or(0.0, |c| c.width));
            let content = ROUTER_ICON + ICON_GAP + text_w;
            let left = node.x + (node.width - content) / 2.0;
            out.push_str(&router_icon(left + ROUTER_ICON / 2.0, cy, theme));
            let text_x = left + ROUTER_ICON + ICON_GAP;
            let text_h = node.label.height + caption.map_or(0.0, |c| c.height);
            let top = cy - text_h / 2.0;
            out.push_str(&text_block_svg(
                text_x,
                top,
                &node.label,
                Anchor::Start,
                &theme.font_family,
                &theme.text_color,
                "700",
            ));
            if let Some(caption) = caption {
                out.push_str(&text_block_svg(
                    text_x,
                    top + node.label.height,
                    caption,
                    Anchor::Start,
                    &theme.font_family,
                    &theme.muted_text_color,
                    "400",
                ));
            }
        }
    }
    out.push_str("</g>");
    out
}

fn kind_class(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Service => "service",
        NodeKind::Engine => "engine",
        NodeKind::Router => "router",
    }
}

/// Discrete fill animation stepping through the node's status per frame.
fn status_animation(id: &str, frames: &[StatusFrame], duration_ms: u64) -> String {
    let count = frames.len();
    let values: Vec<&str> = frames
        .iter()
        .map(|frame| frame.statuses.get(id).copied().unwrap_or_default().color())
        .collect();
    let key_times: Vec<String> = (0..count)
        .map(|idx| format!("{:.4}", idx as f32 / count as f32))
        .collect();
    let values = values.join(";");
    let key_times = key_times.join(";");
    format!(
        "<animate attributeName=\"fill\" calcMode=\"discrete\" dur=\"{duration_ms}ms\" repeatCount=\"indefinite\" values=\"{values}\" keyTimes=\"{key_times}\"/><animate attributeName=\"stroke\" calcMode=\"discrete\" dur=\"{duration_ms}ms\" repeatCount=\"indefinite\" values=\"{values}\" keyTimes=\"{key_times}\"/>"
    )
}

fn engine_icon(cx: f32, cy: f32, theme: &Theme) -> String {
    let r = ENGINE_ICON / 2.0;
    let chip = ENGINE_ICON * 0.36;
    let mut out = format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\"/>",
        escape_xml(&theme.infrastructure_color)
    );
    let _ = write!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{chip:.2}\" height=\"{chip:.2}\" rx=\"3\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
        cx - chip / 2.0,
        cy - chip / 2.0,
        escape_xml(&theme.background)
    );
    // pins
    for offset in [-chip / 4.0, chip / 4.0] {
        let _ = write!(
            out,
            "<path d=\"M {:.2} {:.2} v -5 M {:.2} {:.2} v 5 M {:.2} {:.2} h -5 M {:.2} {:.2} h 5\" stroke=\"{}\" stroke-width=\"2\"/>",
            cx + offset,
            cy - chip / 2.0,
            cx + offset,
            cy + chip / 2.0,
            cx - chip / 2.0,
            cy + offset,
            cx + chip / 2.0,
            cy + offset,
            escape_xml(&theme.background)
        );
    }
    out
}

fn router_icon(cx: f32, cy: f32, theme: &Theme) -> String {
    let r = ROUTER_ICON / 2.0;
    let s = ROUTER_ICON * 0.22;
    format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{fill}\"/><path d=\"M {:.2} {:.2} V {:.2} H {:.2} V {:.2} M {cx:.2} {:.2} V {:.2}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
        cx - s,
        cy + s,
        cy,
        cx + s,
        cy + s,
        cy - s,
        cy,
        fill = escape_xml(&theme.infrastructure_color),
        stroke = escape_xml(&theme.background),
    )
}

/// Lines of `label` stacked from `top`, anchored at `x`.
fn text_block_svg(
    x: f32,
    top: f32,
    label: &TextBlock,
    anchor: Anchor,
    font_family: &str,
    fill: &str,
    weight: &str,
) -> String {
    if label.lines.is_empty() {
        return String::new();
    }
    let font_family = escape_xml(font_family);
    let fill = escape_xml(fill);
    let line_height = label.height / label.lines.len() as f32;
    let first_baseline = top + line_height / 2.0 + label.font_size * 0.35;
    let mut text = String::new();
    let _ = write!(
        text,
        "<text x=\"{x:.2}\" y=\"{first_baseline:.2}\" text-anchor=\"{}\" font-family=\"{font_family}\" font-size=\"{:.2}\" font-weight=\"{weight}\" fill=\"{fill}\">",
        anchor.as_str(),
        label.font_size
    );
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        let _ = write!(text, "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>", escape_xml(line));
    }
    text.push_str("</text>");
    text
}

struct PanelWriter<'a> {
    out: String,
    theme: &'a Theme,
    x: f32,
    width: f32,
    y: f32,
}

impl PanelWriter<'_> {
    fn text(&mut self, x: f32, size: f32, weight: &str, fill: &str, content: &str) {
        self.y += size * 1.4;
        let _ = write!(
            self.out,
            "<text x=\"{x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{size:.2}\" font-weight=\"{weight}\" fill=\"{fill}\">{}</text>",
            self.y - size * 0.35,
            escape_xml(&self.theme.font_family),
            escape_xml(content),
            fill = escape_xml(fill),
        );
    }

    fn dot(&mut self, x: f32, size: f32, color: &str) {
        let _ = write!(
            self.out,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"6\" fill=\"{}\"/>",
            x + 6.0,
            self.y + size * 0.7,
            escape_xml(color)
        );
    }

    fn swatch_line(&mut self, x: f32, size: f32, color: &str) {
        let cy = self.y + size * 0.7;
        let _ = write!(
            self.out,
            "<line x1=\"{x:.2}\" y1=\"{cy:.2}\" x2=\"{:.2}\" y2=\"{cy:.2}\" stroke=\"{color}\" stroke-width=\"3\"/>",
            x + 16.0,
            color = escape_xml(color)
        );
    }

    /// Wrap the content written since `start` in a panel frame.
    fn close_panel(&mut self, start: usize, top: f32) {
        self.y += PANEL_PAD;
        let frame = format!(
            "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            self.x,
            self.width,
            self.y - top,
            escape_xml(&self.theme.panel_background),
            escape_xml(&self.theme.panel_border)
        );
        self.out.insert_str(start, &frame);
        self.y += PANEL_GAP;
    }

    fn open_panel(&mut self) -> (usize, f32) {
        let top = self.y;
        self.y += PANEL_PAD - 4.0;
        (self.out.len(), top)
    }
}

/// Title card, status key, flow key and group glossary stacked in the left column.
fn render_legend(
    topology: &Topology,
    frame: Option<&StatusFrame>,
    theme: &Theme,
    config: &RenderConfig,
) -> (String, f32) {
    let x = PANEL_PAD;
    let width = (config.legend_width - PANEL_PAD * 2.0).max(80.0);
    let mut panel = PanelWriter {
        out: String::from("<g class=\"legend\">"),
        theme,
        x,
        width,
        y: PANEL_PAD,
    };
    let inner = x + PANEL_PAD;

    let (start, top) = panel.open_panel();
    panel.text(inner, 20.0, "600", &theme.text_color, &topology.title);
    if let Some(subtitle) = &topology.subtitle {
        panel.text(inner, 13.0, "400", &theme.muted_text_color, subtitle);
    }
    panel.close_panel(start, top);

    let (start, top) = panel.open_panel();
    panel.text(inner, 14.0, "600", &theme.text_color, "Service Status");
    for status in Status::ALL {
        let label = match frame {
            Some(frame) => format!("{} ({})", status.label(), frame.count(status)),
            None => status.label().to_string(),
        };
        panel.dot(inner, 13.0, status.color());
        panel.text(inner + 20.0, 13.0, "400", &theme.muted_text_color, &label);
    }
    panel.close_panel(start, top);

    let uses_flows = topology.edges.iter().any(|edge| edge.flow != Flow::Neutral);
    if uses_flows {
        let (start, top) = panel.open_panel();
        panel.text(inner, 14.0, "600", &theme.text_color, "Data Flow");
        for (flow, label) in [(Flow::Inbound, "Inbound"), (Flow::Outbound, "Outbound")] {
            if let Some(color) = flow.color() {
                panel.swatch_line(inner, 13.0, color);
                panel.text(inner + 24.0, 13.0, "400", &theme.muted_text_color, label);
            }
        }
        panel.close_panel(start, top);
    }

    if !topology.groups.is_empty() {
        let (start, top) = panel.open_panel();
        panel.text(inner, 14.0, "600", &theme.text_color, "Service Groups & Nodes");
        let max_entry = width - PANEL_PAD * 2.0 - 20.0;
        for group in &topology.groups {
            panel.y += 4.0;
            panel.dot(inner, 12.0, &group.color);
            panel.text(inner + 20.0, 12.0, "600", &theme.text_color, &group.name);
            for (code, description) in &group.entries {
                let entry = fit_text(&format!("• {code} - {description}"), max_entry, 12.0, theme);
                panel.text(inner + 20.0, 12.0, "400", &theme.muted_text_color, &entry);
            }
        }
        panel.close_panel(start, top);
    }

    panel.out.push_str("</g>");
    (panel.out, panel.y)
}

/// Truncate `text` with an ellipsis so it fits in `max_width`.
fn fit_text(text: &str, max_width: f32, font_size: f32, theme: &Theme) -> String {
    let measure = |s: &str| text_width(s, font_size, &theme.font_family, false, true);
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    "…".to_string()
}

/// Scaled overview of the whole diagram in the bottom-right corner.
fn render_minimap(
    layout: &Layout,
    topology: &Topology,
    theme: &Theme,
    config: &RenderConfig,
    canvas_width: f32,
    canvas_height: f32,
) -> String {
    let map_w = config.minimap_width;
    let scale = map_w / layout.width.max(1.0);
    let map_h = (layout.height * scale).max(20.0);
    let x0 = canvas_width - map_w - PANEL_PAD;
    let y0 = canvas_height - map_h - PANEL_PAD;
    let mut out = String::new();
    let _ = write!(
        out,
        "<g class=\"minimap\"><rect x=\"{x0:.2}\" y=\"{y0:.2}\" width=\"{map_w:.2}\" height=\"{map_h:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        escape_xml(&theme.minimap_background),
        escape_xml(&theme.minimap_border)
    );
    for cluster in &layout.clusters {
        let _ = write!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.6\" stroke-opacity=\"0.6\"/>",
            x0 + cluster.rect.x * scale,
            y0 + cluster.rect.y * scale,
            cluster.rect.width * scale,
            cluster.rect.height * scale,
            escape_xml(&cluster.color)
        );
    }
    for node in layout.nodes.values() {
        let color = match topology.nodes.get(&node.id) {
            Some(source) if source.is_infrastructure() => theme.infrastructure_color.clone(),
            Some(source) => topology.node_accent(source),
            None => Status::Healthy.color().to_string(),
        };
        let _ = write!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"1\" fill=\"{color}\"/>",
            x0 + node.x * scale,
            y0 + node.y * scale,
            (node.width * scale).max(1.5),
            (node.height * scale).max(1.5),
            color = escape_xml(&color)
        );
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
