use std::path::Path;

use subway_map_renderer::catalog::{builtin, builtin_names};
use subway_map_renderer::config::{LayoutConfig, LayoutMode, RenderConfig, StatusConfig, parse_config};
use subway_map_renderer::ir::Topology;
use subway_map_renderer::layout::{Layout, compute_layout};
use subway_map_renderer::layout_dump::LayoutDump;
use subway_map_renderer::parser::parse_topology;
use subway_map_renderer::render::render_svg;
use subway_map_renderer::status::StatusSimulator;
use subway_map_renderer::theme::Theme;
use subway_map_renderer::{RenderOptions, render_with_options};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert_eq!(
        svg.matches("<g").count(),
        svg.matches("</g>").count(),
        "{fixture}: unbalanced groups"
    );
}

fn assert_layout_sane(layout: &Layout, topology: &Topology, fixture: &str) {
    assert_eq!(layout.nodes.len(), topology.nodes.len(), "{fixture}: node count");
    assert_eq!(layout.edges.len(), topology.edges.len(), "{fixture}: edge count");
    for node in layout.nodes.values() {
        assert!(node.x >= 0.0 && node.y >= 0.0, "{fixture}: {} off canvas", node.id);
        assert!(node.x + node.width <= layout.width + 0.01, "{fixture}: {} past width", node.id);
        assert!(node.y + node.height <= layout.height + 0.01, "{fixture}: {} past height", node.id);
    }
    for cluster in &layout.clusters {
        for id in &cluster.nodes {
            if let Some(node) = layout.nodes.get(id) {
                assert!(
                    cluster.rect.contains(&node.rect()),
                    "{fixture}: cluster {} misses {id}",
                    cluster.name
                );
            }
        }
    }
    for edge in &layout.edges {
        assert!(edge.points.len() >= 2, "{fixture}: edge {} has no route", edge.id);
    }
}

fn render_topology(mut topology: Topology, fixture: &str, config: &LayoutConfig) -> String {
    let theme = Theme::subway();
    let layout = compute_layout(&topology, &theme, config);
    assert_layout_sane(&layout, &topology, fixture);
    let status = StatusConfig::default();
    let frames = StatusSimulator::with_seed(status.clone(), 17).frames(&mut topology, 3);
    render_svg(&layout, &topology, &frames, &theme, &RenderConfig::default(), &status)
}

#[test]
fn render_all_builtins() {
    for name in builtin_names() {
        let topology = builtin(name).expect("builtin parse failed").expect("builtin missing");
        for mode in [LayoutMode::Preset, LayoutMode::Auto] {
            let config = LayoutConfig {
                mode,
                ..LayoutConfig::default()
            };
            let svg = render_topology(topology.clone(), name, &config);
            assert_valid_svg(&svg, name);
            assert!(svg.contains("calcMode=\"discrete\""), "{name}: no status animation");
        }
    }
}

#[test]
fn render_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let mut fixtures: Vec<_> = std::fs::read_dir(&root)
        .expect("fixtures dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json") | Some("json5")
            )
        })
        .collect();
    fixtures.sort();
    assert!(fixtures.len() >= 3, "expected fixtures under {}", root.display());

    for path in fixtures {
        let name = path.display().to_string();
        let input = std::fs::read_to_string(&path).expect("fixture read failed");
        let topology = parse_topology(&input).expect("parse failed");
        let svg = render_topology(topology, &name, &LayoutConfig::default());
        assert_valid_svg(&svg, &name);
    }
}

#[test]
fn chain_fixture_breaks_the_feedback_loop() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/chain.json5");
    let topology = parse_topology(&std::fs::read_to_string(root).unwrap()).unwrap();
    let layout = compute_layout(&topology, &Theme::subway(), &LayoutConfig::default());
    assert!(!layout.manual);
    assert_eq!(layout.edges.iter().filter(|e| e.back_edge).count(), 1);
    let back = layout.edges.iter().find(|e| e.back_edge).unwrap();
    assert_eq!((back.from.as_str(), back.to.as_str()), ("c", "hub"));
    assert!(layout.nodes["hub"].rank < layout.nodes["a"].rank);
    assert!(layout.nodes["a"].rank < layout.nodes["c"].rank);
}

#[test]
fn top_down_fixture_escapes_text() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/top_down.json");
    let input = std::fs::read_to_string(root).unwrap();
    let svg = render_with_options(&input, RenderOptions::default()).unwrap();
    assert!(svg.contains("Top down &lt;escaped&gt; &amp; friends"));
    assert!(svg.contains("X &amp; Y"));
    assert!(!svg.contains("<escaped>"));
}

#[test]
fn config_file_flows_into_render() {
    let config = parse_config(
        r#"{
            "theme": "midnight",
            "layout": { "mode": "auto", "direction": "TD" },
            "render": { "showLegend": false, "showMinimap": false },
            "status": { "frames": 2, "seed": 5 }
        }"#,
    )
    .unwrap();
    let options = RenderOptions::from_config(config);
    let topology = builtin("mag7").unwrap().unwrap();
    let mut topo = topology.clone();
    let svg = subway_map_renderer::render_topology(&mut topo, &options);
    assert!(svg.contains(&Theme::midnight().background));
    assert!(!svg.contains("class=\"legend\""));
    assert!(!svg.contains("class=\"minimap\""));
    assert!(svg.contains("dur=\"6000ms\""));
}

#[test]
fn layout_dump_matches_layout() {
    let topology = builtin("dataflow").unwrap().unwrap();
    let layout = compute_layout(&topology, &Theme::subway(), &LayoutConfig::default());
    let dump = LayoutDump::from_layout(&layout, &topology, &[]);
    let json = serde_json::to_value(&dump).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), topology.nodes.len());
    assert_eq!(json["clusters"].as_array().unwrap().len(), topology.clusters.len());
    assert_eq!(json["direction"], "LeftRight");
}
