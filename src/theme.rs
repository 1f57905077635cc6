use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub infrastructure_color: String,
    pub engine_fill: String,
    pub router_fill: String,
    pub service_label_color: String,
    pub panel_background: String,
    pub panel_border: String,
    pub minimap_background: String,
    pub minimap_border: String,
}

impl Theme {
    pub fn subway() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            text_color: "#0F172A".to_string(),
            muted_text_color: "#64748B".to_string(),
            line_color: "#94A3B8".to_string(),
            infrastructure_color: "#000000".to_string(),
            engine_fill: "rgba(255, 255, 255, 0.95)".to_string(),
            router_fill: "rgba(0, 0, 0, 0.05)".to_string(),
            service_label_color: "#FFFFFF".to_string(),
            panel_background: "rgba(255, 255, 255, 0.95)".to_string(),
            panel_border: "#E2E8F0".to_string(),
            minimap_background: "#F8FAFC".to_string(),
            minimap_border: "#E2E8F0".to_string(),
        }
    }

    pub fn midnight() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#0B1120".to_string(),
            text_color: "#E2E8F0".to_string(),
            muted_text_color: "#94A3B8".to_string(),
            line_color: "#475569".to_string(),
            infrastructure_color: "#E2E8F0".to_string(),
            engine_fill: "rgba(15, 23, 42, 0.95)".to_string(),
            router_fill: "rgba(226, 232, 240, 0.08)".to_string(),
            service_label_color: "#FFFFFF".to_string(),
            panel_background: "rgba(15, 23, 42, 0.92)".to_string(),
            panel_border: "#1E293B".to_string(),
            minimap_background: "#111827".to_string(),
            minimap_border: "#1E293B".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "subway" | "default" | "light" => Some(Self::subway()),
            "midnight" | "dark" => Some(Self::midnight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::subway()
    }
}
