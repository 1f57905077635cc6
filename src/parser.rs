use crate::error::TopologyError;
use crate::ir::{Cluster, Direction, Edge, Flow, Group, Node, NodeKind, Status, Topology};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());
static FUNC_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:rgb|rgba|hsl|hsla)\(\s*-?[0-9.]+%?(?:\s*,\s*-?[0-9.]+%?){2,3}\s*\)$").unwrap()
});
static NAMED_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").unwrap());

pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    HEX_COLOR.is_match(value) || FUNC_COLOR.is_match(value) || NAMED_COLOR.is_match(value)
}

fn check_color(owner: impl FnOnce() -> String, color: &str) -> Result<(), TopologyError> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(TopologyError::InvalidColor {
            owner: owner(),
            color: color.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PositionDoc {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    id: String,
    label: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    group: Option<String>,
    color: Option<String>,
    status: Option<String>,
    position: Option<PositionDoc>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EdgeDoc {
    id: Option<String>,
    source: String,
    target: String,
    flow: Option<String>,
    color: Option<String>,
    width: Option<f32>,
    animated: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ClusterDoc {
    name: String,
    color: String,
    nodes: Vec<String>,
    description: Option<String>,
    padding: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct EntryDoc {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct GroupDoc {
    name: String,
    color: String,
    #[serde(default)]
    entries: Vec<EntryDoc>,
}

#[derive(Debug, Deserialize)]
struct TopologyDoc {
    title: Option<String>,
    subtitle: Option<String>,
    direction: Option<String>,
    nodes: Vec<NodeDoc>,
    #[serde(default)]
    edges: Vec<EdgeDoc>,
    #[serde(default)]
    clusters: Vec<ClusterDoc>,
    #[serde(default)]
    groups: Vec<GroupDoc>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DomainDoc {
    api: Vec<String>,
    confluent: Vec<String>,
    msk: Vec<String>,
    mq: Vec<String>,
    dataloader: Vec<String>,
    #[serde(rename = "inbound-ds")]
    inbound_ds: Vec<String>,
    #[serde(rename = "outbound-ds")]
    outbound_ds: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServicesDoc {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(default)]
    postgres: Vec<String>,
    domains: serde_json::Map<String, Value>,
}

/// Parse a topology document or a services fixture (JSON or JSON5).
pub fn parse_topology(input: &str) -> Result<Topology, TopologyError> {
    let value: Value = json5::from_str(input)?;
    let Value::Object(map) = &value else {
        return Err(TopologyError::UnknownShape);
    };
    if map.contains_key("nodes") {
        let doc: TopologyDoc = serde_json::from_value(value)?;
        build_topology(doc)
    } else if map.contains_key("domains") {
        let doc: ServicesDoc = serde_json::from_value(value)?;
        expand_services(doc)
    } else {
        Err(TopologyError::UnknownShape)
    }
}

fn build_topology(doc: TopologyDoc) -> Result<Topology, TopologyError> {
    let mut topo = Topology::new(doc.title.unwrap_or_else(|| "Service Topology".to_string()));
    topo.subtitle = doc.subtitle;
    if let Some(direction) = doc.direction {
        topo.direction = Direction::from_token(&direction)
            .ok_or(TopologyError::UnknownDirection(direction))?;
    }

    for raw in doc.nodes {
        let kind = match raw.kind.as_deref() {
            None => NodeKind::Service,
            Some(token) => NodeKind::from_token(token).ok_or_else(|| TopologyError::UnknownNodeKind {
                node: raw.id.clone(),
                kind: token.to_string(),
            })?,
        };
        let status = match raw.status.as_deref() {
            None => Status::Healthy,
            Some(token) => Status::from_token(token).ok_or_else(|| TopologyError::UnknownStatus {
                node: raw.id.clone(),
                status: token.to_string(),
            })?,
        };
        if let Some(color) = &raw.color {
            check_color(|| format!("node `{}`", raw.id), color)?;
        }
        let mut node = Node::new(raw.id.clone(), raw.label.unwrap_or(raw.id), kind);
        node.group = raw.group;
        node.color = raw.color;
        node.status = status;
        node.position = raw.position.map(|p| (p.x, p.y));
        node.description = raw.description;
        topo.add_node(node)?;
    }

    for (idx, raw) in doc.edges.into_iter().enumerate() {
        let id = raw.id.unwrap_or_else(|| format!("e-{idx}"));
        let flow = match raw.flow.as_deref() {
            None => Flow::Neutral,
            Some(token) => Flow::from_token(token).ok_or_else(|| TopologyError::UnknownFlow {
                edge: id.clone(),
                flow: token.to_string(),
            })?,
        };
        if let Some(color) = &raw.color {
            check_color(|| format!("edge `{id}`"), color)?;
        }
        let mut edge = Edge::new(id, raw.source, raw.target).with_flow(flow);
        edge.color = raw.color;
        if let Some(width) = raw.width {
            edge.width = width.max(0.5);
        }
        if let Some(animated) = raw.animated {
            edge.animated = animated;
        }
        topo.add_edge(edge)?;
    }

    for raw in doc.clusters {
        check_color(|| format!("cluster `{}`", raw.name), &raw.color)?;
        let missing: Vec<&String> = raw
            .nodes
            .iter()
            .filter(|id| !topo.nodes.contains_key(*id))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(cluster = %raw.name, ?missing, "cluster lists unknown nodes; they are ignored");
        }
        topo.clusters.push(Cluster {
            name: raw.name,
            color: raw.color,
            nodes: raw.nodes,
            description: raw.description,
            padding: raw.padding,
        });
    }

    for raw in doc.groups {
        check_color(|| format!("group `{}`", raw.name), &raw.color)?;
        topo.groups.push(Group {
            name: raw.name,
            color: raw.color,
            entries: raw
                .entries
                .into_iter()
                .map(|entry| (entry.code, entry.description))
                .collect(),
        });
    }

    tracing::debug!(
        nodes = topo.nodes.len(),
        edges = topo.edges.len(),
        clusters = topo.clusters.len(),
        "parsed topology document"
    );
    Ok(topo)
}

/// Stable hue in `[0, 360)` for a domain name.
pub fn domain_hue(name: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash % 360
}

fn domain_color(name: &str) -> String {
    format!("hsl({}, 70%, 60%)", domain_hue(name))
}

struct EdgeSink {
    next_id: usize,
}

impl EdgeSink {
    fn push(&mut self, topo: &mut Topology, from: &str, to: &str, flow: Flow) -> Result<(), TopologyError> {
        let id = format!("e-{}", self.next_id);
        self.next_id += 1;
        let mut edge = Edge::new(id, from, to).with_flow(flow);
        edge.color = flow.color().map(str::to_string);
        topo.add_edge(edge)
    }
}

fn engine(id: &str, label: &str) -> Node {
    Node::new(id, label, NodeKind::Engine)
}

/// Expand a services fixture into the inbound/outbound data-flow topology.
fn expand_services(doc: ServicesDoc) -> Result<Topology, TopologyError> {
    let mut topo = Topology::new(doc.title.unwrap_or_else(|| "Service Data Flow".to_string()));
    topo.subtitle = Some(
        doc.subtitle
            .unwrap_or_else(|| "Real-time service monitoring".to_string()),
    );
    topo.direction = Direction::LeftRight;

    topo.add_node(engine("api-gateway", "API Gateway"))?;
    topo.add_node(engine("director-inbound", "Director Server\n(Inbound)"))?;
    topo.add_node(engine("director-outbound", "Director Server\n(Outbound)"))?;
    topo.add_node(engine("engine", "Engine"))?;
    for db in &doc.postgres {
        topo.add_node(engine(&format!("db-{db}"), &format!("{}\nDB", db.to_uppercase())))?;
    }

    topo.groups.push(Group {
        name: "Core Infrastructure".to_string(),
        color: "#000000".to_string(),
        entries: vec![
            ("API Gateway".to_string(), "Entry/Exit point".to_string()),
            (
                "Director Server (Inbound)".to_string(),
                "Orchestrates incoming data".to_string(),
            ),
            (
                "Director Server (Outbound)".to_string(),
                "Orchestrates outgoing data".to_string(),
            ),
            ("Engine".to_string(), "Central processing hub".to_string()),
        ],
    });
    if !doc.postgres.is_empty() {
        topo.groups.push(Group {
            name: "Databases".to_string(),
            color: "#000000".to_string(),
            entries: doc
                .postgres
                .iter()
                .map(|db| (db.to_uppercase(), "PostgreSQL Database".to_string()))
                .collect(),
        });
    }

    let mut edges = EdgeSink { next_id: 0 };
    for (name, raw) in doc.domains {
        let domain: DomainDoc = serde_json::from_value(raw)?;
        let color = domain_color(&name);
        let mut members = Vec::new();
        let mut service = |topo: &mut Topology, id: String, label: String| -> Result<(), TopologyError> {
            let mut node = Node::new(id.clone(), label, NodeKind::Service);
            node.color = Some(color.clone());
            node.group = Some(name.clone());
            topo.add_node(node)?;
            members.push(id);
            Ok(())
        };

        for idx in 0..domain.api.len() {
            let api = format!("api-{name}-{idx}");
            service(&mut topo, api.clone(), format!("API\n{}", idx + 1))?;
            edges.push(&mut topo, "api-gateway", &api, Flow::Inbound)?;
        }

        for idx in 0..domain.confluent.len() {
            let conf = format!("conf-{name}-{idx}");
            service(&mut topo, conf.clone(), format!("K{}", idx + 1))?;
            if idx < domain.api.len() {
                edges.push(&mut topo, &format!("api-{name}-{idx}"), &conf, Flow::Inbound)?;
            }
            edges.push(&mut topo, &conf, "director-inbound", Flow::Inbound)?;
        }

        for idx in 0..domain.msk.len() {
            service(&mut topo, format!("msk-{name}-{idx}"), format!("MSK{}", idx + 1))?;
        }

        for idx in 0..domain.mq.len() {
            let mq = format!("mq-{name}-{idx}");
            service(&mut topo, mq.clone(), format!("MQ{}", idx + 1))?;
            if idx == 0 {
                edges.push(&mut topo, "director-inbound", &mq, Flow::Inbound)?;
                edges.push(&mut topo, &mq, "engine", Flow::Inbound)?;
                edges.push(&mut topo, "engine", &mq, Flow::Outbound)?;
                edges.push(&mut topo, &mq, "director-outbound", Flow::Outbound)?;
            }
        }

        for (idx, loader_name) in domain.dataloader.iter().enumerate() {
            let loader = format!("loader-{name}-{idx}");
            service(&mut topo, loader.clone(), format!("DL{}", idx + 1))?;
            if idx < domain.confluent.len() {
                let conf = format!("conf-{name}-{idx}");
                edges.push(&mut topo, "director-outbound", &conf, Flow::Outbound)?;
                edges.push(&mut topo, &conf, &loader, Flow::Outbound)?;
            }
            if let Some(db) = doc.postgres.iter().find(|db| loader_name.contains(db.as_str())) {
                let db_id = format!("db-{db}");
                edges.push(&mut topo, &loader, &db_id, Flow::Outbound)?;
                if idx < domain.api.len() {
                    let api = format!("api-{name}-{idx}");
                    edges.push(&mut topo, &db_id, &api, Flow::Outbound)?;
                    edges.push(&mut topo, &api, "api-gateway", Flow::Outbound)?;
                }
            }
        }

        let mut entries = Vec::new();
        let counts = [
            ("APIs", domain.api.len(), "services"),
            ("Confluent/Kafka", domain.confluent.len(), "topics"),
            ("MQ", domain.mq.len(), "queues"),
            ("MSK", domain.msk.len(), "topics"),
            ("DataLoaders", domain.dataloader.len(), "services"),
            ("Inbound DS", domain.inbound_ds.len(), "services"),
            ("Outbound DS", domain.outbound_ds.len(), "services"),
        ];
        for (label, count, unit) in counts {
            if count > 0 {
                entries.push((label.to_string(), format!("{count} {unit}")));
            }
        }
        topo.groups.push(Group {
            name: name.clone(),
            color: color.clone(),
            entries,
        });
        if !members.is_empty() {
            topo.clusters.push(Cluster {
                name: name.clone(),
                color,
                nodes: members,
                description: Some(format!("{name} domain services")),
                padding: None,
            });
        }
    }

    tracing::debug!(
        nodes = topo.nodes.len(),
        edges = topo.edges.len(),
        domains = topo.clusters.len(),
        "expanded services fixture"
    );
    Ok(topo)
}
