use crate::ir::{Status, Topology};
use crate::layout::{Layout, Rect};
use crate::status::StatusFrame;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub title: String,
    pub direction: String,
    pub manual: bool,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub clusters: Vec<ClusterDump>,
    /// Per-frame service statuses by node id, when more than one frame was simulated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<BTreeMap<String, Status>>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub group: Option<String>,
    pub status: Status,
    pub rank: usize,
    pub pinned: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub flow: String,
    pub color: String,
    pub back_edge: bool,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct ClusterDump {
    pub name: String,
    pub color: String,
    pub nodes: Vec<String>,
    #[serde(flatten)]
    pub rect: Rect,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, topology: &Topology, frames: &[StatusFrame]) -> Self {
        let first = frames.first();
        let nodes: Vec<NodeDump> = layout
            .nodes
            .values()
            .map(|node| {
                let source = topology.nodes.get(&node.id);
                let status = first
                    .and_then(|frame| frame.statuses.get(&node.id).copied())
                    .or_else(|| source.map(|n| n.status))
                    .unwrap_or_default();
                NodeDump {
                    id: node.id.clone(),
                    kind: format!("{:?}", node.kind),
                    label: source.map(|n| n.label.clone()).unwrap_or_default(),
                    group: source.and_then(|n| n.group.clone()),
                    status,
                    rank: node.rank,
                    pinned: node.pinned,
                    x: node.x,
                    y: node.y,
                    width: node.width,
                    height: node.height,
                    label_lines: node.label.lines.clone(),
                }
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                flow: format!("{:?}", edge.flow),
                color: edge.color.clone(),
                back_edge: edge.back_edge,
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        let clusters = layout
            .clusters
            .iter()
            .map(|cluster| ClusterDump {
                name: cluster.name.clone(),
                color: cluster.color.clone(),
                nodes: cluster.nodes.clone(),
                rect: cluster.rect,
            })
            .collect();

        let frames = if frames.len() > 1 {
            frames.iter().map(|frame| frame.statuses.clone()).collect()
        } else {
            Vec::new()
        };

        LayoutDump {
            title: topology.title.clone(),
            direction: format!("{:?}", layout.direction),
            manual: layout.manual,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
            clusters,
            frames,
        }
    }
}

/// Write the dump as pretty JSON to `path`, or stdout when no path is given.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &Layout,
    topology: &Topology,
    frames: &[StatusFrame],
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, topology, frames);
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, StatusConfig};
    use crate::ir::{Cluster, Edge, Node, NodeKind};
    use crate::layout::compute_layout;
    use crate::status::StatusSimulator;
    use crate::theme::Theme;

    #[test]
    fn dump_carries_geometry_and_statuses() {
        let mut topo = Topology::new("Dump");
        topo.add_node(Node::new("hub", "Hub", NodeKind::Engine)).unwrap();
        let mut a = Node::new("a", "A", NodeKind::Service);
        a.status = Status::Critical;
        topo.add_node(a).unwrap();
        topo.add_edge(Edge::new("e-0", "hub", "a")).unwrap();
        topo.clusters.push(Cluster {
            name: "Only".to_string(),
            color: "#000".to_string(),
            nodes: vec!["a".to_string()],
            description: None,
            padding: Some(10.0),
        });
        let layout = compute_layout(&topo, &Theme::subway(), &LayoutConfig::default());

        let frames = vec![StatusFrame::capture(&topo, 0)];
        let dump = LayoutDump::from_layout(&layout, &topo, &frames);
        assert_eq!(dump.nodes.len(), 2);
        let a = dump.nodes.iter().find(|n| n.id == "a").unwrap();
        assert_eq!(a.status, Status::Critical);
        assert_eq!(dump.edges[0].points.len(), 2);
        assert!(dump.frames.is_empty());

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["clusters"][0]["name"], "Only");
        assert!(json["clusters"][0]["width"].as_f64().unwrap() > 0.0);
        assert_eq!(json["nodes"][0]["id"], "a");
        assert_eq!(json["nodes"][0]["status"], "critical");
        assert!(json.get("frames").is_none());
    }

    #[test]
    fn multi_frame_dump_lists_every_frame() {
        let mut topo = Topology::new("Frames");
        topo.add_node(Node::new("hub", "Hub", NodeKind::Engine)).unwrap();
        topo.add_node(Node::new("gw", "G", NodeKind::Router)).unwrap();
        for i in 0..5 {
            topo.add_node(Node::new(format!("s{i}"), format!("S{i}"), NodeKind::Service))
                .unwrap();
        }
        let layout = compute_layout(&topo, &Theme::subway(), &LayoutConfig::default());
        let frames = StatusSimulator::with_seed(StatusConfig::default(), 11).frames(&mut topo, 3);
        let dump = LayoutDump::from_layout(&layout, &topo, &frames);
        assert_eq!(dump.frames.len(), 3);
        assert!(dump.frames.iter().all(|row| row.len() == 5));
        assert!(dump.frames.iter().all(|row| !row.contains_key("hub") && !row.contains_key("gw")));
        let json = serde_json::to_value(&dump).unwrap();
        assert!(json["frames"][2]["s4"].is_string());
        assert!(json["frames"][0].get("hub").is_none());
    }
}
