mod cluster;
mod position;
mod ranking;
mod routing;
mod text;
mod types;

pub use cluster::cluster_box;
pub(crate) use text::text_width;
pub use types::*;

use crate::config::{LayoutConfig, LayoutMode, NodeSize};
use crate::ir::{NodeKind, Topology};
use crate::theme::Theme;
use std::collections::{BTreeMap, HashMap};

use position::assign_positions;
use ranking::{compute_ranks, order_rank_nodes};
use routing::route_edge;
use text::measure_label;

pub const ENGINE_ICON: f32 = 64.0;
pub const ROUTER_ICON: f32 = 40.0;
pub const ICON_GAP: f32 = 12.0;

pub fn compute_layout(topology: &Topology, theme: &Theme, config: &LayoutConfig) -> Layout {
    let direction = config.direction.unwrap_or(topology.direction);
    let manual = match config.mode {
        LayoutMode::Auto => false,
        LayoutMode::Manual => true,
        LayoutMode::Preset => topology.is_fully_positioned(),
    };

    let node_ids = topology.ordered_ids();
    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    for id in &node_ids {
        let node = &topology.nodes[id];
        nodes.insert(id.clone(), measure_node(&node.id, &node.label, node.kind, theme, config));
    }

    let ranks = compute_ranks(&node_ids, &topology.edges, &topology.node_order);
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for id in &node_ids {
        let rank = ranks.get(id).copied().unwrap_or(0);
        rank_nodes[rank].push(id.clone());
    }
    order_rank_nodes(
        &mut rank_nodes,
        &topology.edges,
        &topology.node_order,
        config.order_passes,
    );

    let sizes: HashMap<String, (f32, f32)> = nodes
        .iter()
        .map(|(id, node)| (id.clone(), (node.width, node.height)))
        .collect();
    let layered = assign_positions(&rank_nodes, &sizes, direction, config);

    let mut pinned = 0usize;
    for (id, node) in nodes.iter_mut() {
        node.rank = ranks.get(id).copied().unwrap_or(0);
        let stored = if manual {
            topology.nodes[id].position
        } else {
            None
        };
        let (x, y) = match stored {
            Some(pos) => {
                node.pinned = true;
                pinned += 1;
                pos
            }
            None => layered.get(id).copied().unwrap_or((config.margin, config.margin)),
        };
        node.x = x;
        node.y = y;
    }
    if manual && pinned < nodes.len() {
        tracing::warn!(
            unpositioned = nodes.len() - pinned,
            "manual layout with unpositioned nodes; using layered positions for them"
        );
    }

    let mut edges = Vec::with_capacity(topology.edges.len());
    for edge in &topology.edges {
        let (Some(source), Some(target)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
            continue;
        };
        let (points, back_edge) = route_edge(&source.rect(), &target.rect(), direction, config.edge_detour);
        let color = edge
            .color
            .clone()
            .or_else(|| edge.flow.color().map(str::to_string))
            .unwrap_or_else(|| theme.line_color.clone());
        edges.push(EdgeLayout {
            id: edge.id.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            flow: edge.flow,
            points,
            color,
            width: edge.width,
            animated: edge.animated,
            back_edge,
        });
    }

    let footprints: BTreeMap<String, Rect> = nodes
        .iter()
        .map(|(id, node)| (id.clone(), footprint_rect(node, config)))
        .collect();
    let mut clusters = Vec::new();
    for cluster in &topology.clusters {
        let padding = cluster.padding.unwrap_or(config.cluster_padding);
        let rect = cluster_box(&footprints, &cluster.nodes, padding);
        if rect.is_empty() {
            tracing::debug!(cluster = %cluster.name, "cluster has no laid out members; skipped");
            continue;
        }
        clusters.push(ClusterLayout {
            name: cluster.name.clone(),
            color: cluster.color.clone(),
            description: cluster.description.clone(),
            nodes: cluster.nodes.clone(),
            rect,
            label: measure_label(&cluster.name, theme.font_size, &theme.font_family, true, config),
        });
    }

    let mut layout = Layout {
        direction,
        manual,
        nodes,
        edges,
        clusters,
        width: 0.0,
        height: 0.0,
        offset: (0.0, 0.0),
    };
    normalize_bounds(&mut layout, config.margin);
    tracing::debug!(
        manual,
        ranks = rank_nodes.len(),
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        clusters = layout.clusters.len(),
        width = layout.width,
        height = layout.height,
        "computed layout"
    );
    layout
}

fn measure_node(id: &str, label: &str, kind: NodeKind, theme: &Theme, config: &LayoutConfig) -> NodeLayout {
    let pad = config.label_padding;
    let base = theme.font_size;
    let (label, caption, size) = match kind {
        NodeKind::Service => {
            let label = measure_label(label, base * 1.3, &theme.font_family, true, config);
            let NodeSize { width, height } = config.sizes.service;
            let diameter = height.max(label.width + pad).max(label.height + pad);
            (label, None, (width.max(diameter), diameter))
        }
        NodeKind::Engine => {
            let label = measure_label(label, base * 1.7, &theme.font_family, true, config);
            let caption = measure_label("Engine", base * 0.95, &theme.font_family, false, config);
            let NodeSize { width, height } = config.sizes.engine;
            let w = width.max(label.width.max(caption.width) + pad * 4.0);
            let h = height.max(pad * 2.0 + ENGINE_ICON + ICON_GAP + label.height + caption.height);
            (label, Some(caption), (w, h))
        }
        NodeKind::Router => {
            let label = measure_label(label, base * 1.15, &theme.font_family, true, config);
            let caption = measure_label("Router", base * 0.85, &theme.font_family, false, config);
            let NodeSize { width, height } = config.sizes.router;
            let w = width.max(pad * 3.0 + ROUTER_ICON + ICON_GAP + label.width.max(caption.width));
            let h = height.max(pad * 2.0 + ROUTER_ICON.max(label.height + caption.height));
            (label, Some(caption), (w, h))
        }
    };
    NodeLayout {
        id: id.to_string(),
        kind,
        x: 0.0,
        y: 0.0,
        width: size.0,
        height: size.1,
        label,
        caption,
        rank: 0,
        pinned: false,
    }
}

/// Top-left anchored slot a node reserves in cluster boxes, never smaller than the drawn node.
fn footprint_rect(node: &NodeLayout, config: &LayoutConfig) -> Rect {
    let NodeSize { width, height } = config.sizes.footprint(node.kind);
    Rect::new(node.x, node.y, width.max(node.width), height.max(node.height))
}

/// Shift all geometry so the top-left extent sits at `margin`, then size the canvas.
fn normalize_bounds(layout: &mut Layout, margin: f32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut extend = |x0: f32, y0: f32, x1: f32, y1: f32| {
        min_x = min_x.min(x0);
        min_y = min_y.min(y0);
        max_x = max_x.max(x1);
        max_y = max_y.max(y1);
    };
    for node in layout.nodes.values() {
        extend(node.x, node.y, node.x + node.width, node.y + node.height);
    }
    for cluster in &layout.clusters {
        extend(cluster.rect.x, cluster.rect.y, cluster.rect.right(), cluster.rect.bottom());
    }
    for edge in &layout.edges {
        for (x, y) in &edge.points {
            extend(*x, *y, *x, *y);
        }
    }
    if !min_x.is_finite() {
        layout.width = margin * 2.0;
        layout.height = margin * 2.0;
        return;
    }

    let dx = margin - min_x;
    let dy = margin - min_y;
    for node in layout.nodes.values_mut() {
        node.x += dx;
        node.y += dy;
    }
    for cluster in &mut layout.clusters {
        cluster.rect.translate(dx, dy);
    }
    for edge in &mut layout.edges {
        for point in &mut edge.points {
            point.0 += dx;
            point.1 += dy;
        }
    }
    layout.offset = (dx, dy);
    layout.width = max_x - min_x + margin * 2.0;
    layout.height = max_y - min_y + margin * 2.0;
}
