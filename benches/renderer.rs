use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use subway_map_renderer::catalog::builtin_source;
use subway_map_renderer::config::{LayoutConfig, LayoutMode, RenderConfig, StatusConfig};
use subway_map_renderer::ir::Topology;
use subway_map_renderer::layout::compute_layout;
use subway_map_renderer::parser::parse_topology;
use subway_map_renderer::render::render_svg;
use subway_map_renderer::status::StatusSimulator;
use subway_map_renderer::theme::Theme;

/// A services fixture with `domains` domains of `per_domain` entries per list.
fn services_source(domains: usize, per_domain: usize) -> String {
    let list = |prefix: &str, domain: usize| {
        let items: Vec<String> = (0..per_domain)
            .map(|i| format!("\"{prefix}-{domain}-{i}\""))
            .collect();
        format!("[{}]", items.join(", "))
    };
    let mut out = String::from("{ \"postgres\": [\"main\"], \"domains\": {");
    for d in 0..domains {
        if d > 0 {
            out.push(',');
        }
        let loaders: Vec<String> = (0..per_domain).map(|i| format!("\"main-loader-{d}-{i}\"")).collect();
        out.push_str(&format!(
            "\"domain{d}\": {{ \"api\": {}, \"confluent\": {}, \"mq\": {}, \"dataloader\": [{}] }}",
            list("api", d),
            list("topic", d),
            list("queue", d),
            loaders.join(", ")
        ));
    }
    out.push_str("} }");
    out
}

fn auto_config() -> LayoutConfig {
    LayoutConfig {
        mode: LayoutMode::Auto,
        ..LayoutConfig::default()
    }
}

fn inputs() -> Vec<(String, String)> {
    let mut inputs = vec![
        ("mag7".to_string(), builtin_source("mag7").unwrap_or_default().to_string()),
        ("dataflow".to_string(), builtin_source("dataflow").unwrap_or_default().to_string()),
    ];
    for (domains, per_domain) in [(4usize, 3usize), (12, 4), (30, 5)] {
        inputs.push((
            format!("services_{domains}x{per_domain}"),
            services_source(domains, per_domain),
        ));
    }
    inputs
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input) in inputs() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let topology = parse_topology(black_box(data)).expect("parse failed");
                black_box(topology.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::subway();
    for (name, input) in inputs() {
        let topology = parse_topology(&input).expect("parse failed");
        for (mode, config) in [("preset", LayoutConfig::default()), ("auto", auto_config())] {
            group.bench_with_input(BenchmarkId::new(mode, &name), &topology, |b, topo| {
                b.iter(|| {
                    let layout = compute_layout(black_box(topo), &theme, &config);
                    black_box(layout.edges.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::subway();
    let render_cfg = RenderConfig::default();
    let status_cfg = StatusConfig::default();
    for (name, input) in inputs() {
        let mut topology: Topology = parse_topology(&input).expect("parse failed");
        let layout = compute_layout(&topology, &theme, &auto_config());
        let frames = StatusSimulator::with_seed(status_cfg.clone(), 1).frames(&mut topology, 8);
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout, |b, layout| {
            b.iter(|| {
                let svg = render_svg(
                    black_box(layout),
                    &topology,
                    &frames,
                    &theme,
                    &render_cfg,
                    &status_cfg,
                );
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_frames");
    let input = services_source(30, 5);
    let topology = parse_topology(&input).expect("parse failed");
    for frames in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(frames), &frames, |b, &count| {
            b.iter(|| {
                let mut topo = topology.clone();
                let mut sim = StatusSimulator::with_seed(StatusConfig::default(), 3);
                black_box(sim.frames(&mut topo, count).len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_render, bench_status);
criterion_main!(benches);
