use serde::Deserialize;
use subway_map_renderer::config::LayoutMode;
use subway_map_renderer::ir::Direction;
use subway_map_renderer::{RenderOptions, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubwayRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    layout: Option<String>,
    direction: Option<String>,
    seed: Option<u64>,
    frames: Option<usize>,
    randomize: Option<bool>,
    show_legend: Option<bool>,
    show_minimap: Option<bool>,
}

fn build_render_options(options: SubwayRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = match options.theme.as_deref() {
        Some("midnight") | Some("dark") => RenderOptions::midnight(),
        _ => RenderOptions::subway(),
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(mode) = options.layout {
        render_options.layout.mode =
            LayoutMode::from_token(&mode).ok_or_else(|| format!("unknown layout mode `{mode}`"))?;
    }
    if let Some(direction) = options.direction {
        render_options.layout.direction = Some(
            Direction::from_token(&direction)
                .ok_or_else(|| format!("unknown direction `{direction}`"))?,
        );
    }
    render_options.status.seed = options.seed;
    if let Some(frames) = options.frames {
        render_options.status.frames = frames.max(1);
    }
    render_options.randomize = options.randomize.unwrap_or(false);
    if let Some(show) = options.show_legend {
        render_options.render.show_legend = show;
    }
    if let Some(show) = options.show_minimap {
        render_options.render.show_minimap = show;
    }

    Ok(render_options)
}

#[wasm_bindgen]
pub fn render_subway_map_svg(topology_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SubwayRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SubwayRenderOptions::default()
    };

    let render_options = build_render_options(options).map_err(|error| JsValue::from_str(&error))?;
    render_with_options(topology_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use subway_map_renderer::render_with_options;

    use crate::{SubwayRenderOptions, build_render_options};

    #[test]
    fn renders_topology_with_clusters_and_frames() {
        let code = r##"{
            title: "Wasm",
            nodes: [
                { id: "hub", type: "engine", position: { x: 0, y: 0 } },
                { id: "a", color: "#4A90E2", position: { x: 400, y: 0 } },
                { id: "b", color: "#4A90E2", position: { x: 400, y: 150 } },
            ],
            edges: [{ source: "hub", target: "a" }, { source: "a", target: "b" }],
            clusters: [{ name: "Pair", color: "#4A90E2", nodes: ["a", "b"] }],
        }"##;

        let options: SubwayRenderOptions =
            serde_json::from_str(r#"{ "seed": 3, "frames": 4, "randomize": true }"#).unwrap();
        let svg = render_with_options(code, build_render_options(options).unwrap())
            .expect("topology should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Pair"));
        assert!(svg.contains("calcMode=\"discrete\""));
    }

    #[test]
    fn rejects_unknown_layout_mode() {
        let options = SubwayRenderOptions {
            layout: Some("spiral".to_string()),
            ..SubwayRenderOptions::default()
        };
        assert!(build_render_options(options).is_err());
    }
}
