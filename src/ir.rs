use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    LeftRight,
    TopDown,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "LR" | "LEFTRIGHT" | "HORIZONTAL" => Some(Self::LeftRight),
            "TD" | "TB" | "TOPDOWN" | "VERTICAL" => Some(Self::TopDown),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Service,
    Engine,
    Router,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "service" => Some(Self::Service),
            "engine" => Some(Self::Engine),
            "router" => Some(Self::Router),
            _ => None,
        }
    }

    pub fn caption(self) -> Option<&'static str> {
        match self {
            Self::Service => None,
            Self::Engine => Some("Engine"),
            Self::Router => Some("Router"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Healthy, Status::Warning, Status::Critical];

    pub fn color(self) -> &'static str {
        match self {
            Self::Healthy => "#10b981",
            Self::Warning => "#f59e0b",
            Self::Critical => "#ef4444",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "healthy" | "ok" => Some(Self::Healthy),
            "warning" | "warn" => Some(Self::Warning),
            "critical" | "error" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub group: Option<String>,
    pub color: Option<String>,
    pub status: Status,
    /// Top-left corner when the topology is manually positioned.
    pub position: Option<(f32, f32)>,
    pub description: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            group: None,
            color: None,
            status: Status::Healthy,
            position: None,
            description: None,
        }
    }

    /// Engines and routers are drawn in fixed colors and never change status.
    pub fn is_infrastructure(&self) -> bool {
        !matches!(self.kind, NodeKind::Service)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Inbound,
    Outbound,
    #[default]
    Neutral,
}

impl Flow {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "inbound" | "in" => Some(Self::Inbound),
            "outbound" | "out" => Some(Self::Outbound),
            "neutral" | "none" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn color(self) -> Option<&'static str> {
        match self {
            Self::Inbound => Some("#10b981"),
            Self::Outbound => Some("#ef4444"),
            Self::Neutral => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub flow: Flow,
    pub color: Option<String>,
    pub width: f32,
    pub animated: bool,
}

impl Edge {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            flow: Flow::Neutral,
            color: None,
            width: 2.0,
            animated: true,
        }
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    pub name: String,
    pub color: String,
    pub nodes: Vec<String>,
    pub description: Option<String>,
    pub padding: Option<f32>,
}

/// A legend section: a colored heading followed by `code - meaning` rows.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub color: String,
    pub entries: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    pub title: String,
    pub subtitle: Option<String>,
    pub direction: Direction,
    pub nodes: BTreeMap<String, Node>,
    pub node_order: HashMap<String, usize>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<Cluster>,
    pub groups: Vec<Group>,
}

impl Topology {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            direction: Direction::LeftRight,
            nodes: BTreeMap::new(),
            node_order: HashMap::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), TopologyError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TopologyError::DuplicateNode(node.id));
        }
        let order = self.node_order.len();
        self.node_order.insert(node.id.clone(), order);
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), TopologyError> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(TopologyError::UnknownEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Node ids in declaration order.
    pub fn ordered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.nodes.keys().cloned().collect();
        ids.sort_by_key(|id| self.node_order.get(id).copied().unwrap_or(usize::MAX));
        ids
    }

    pub fn ordered_nodes(&self) -> Vec<&Node> {
        self.ordered_ids()
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    pub fn infrastructure_ids(&self) -> Vec<String> {
        self.ordered_nodes()
            .into_iter()
            .filter(|node| node.is_infrastructure())
            .map(|node| node.id.clone())
            .collect()
    }

    pub fn is_fully_positioned(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.values().all(|node| node.position.is_some())
    }

    /// Color a node is drawn with in the minimap and legend.
    pub fn node_accent(&self, node: &Node) -> String {
        if node.is_infrastructure() {
            return "#000000".to_string();
        }
        if let Some(color) = &node.color {
            return color.clone();
        }
        if let Some(group) = &node.group {
            if let Some(found) = self.groups.iter().find(|g| &g.name == group) {
                return found.color.clone();
            }
        }
        Status::Healthy.color().to_string()
    }
}
