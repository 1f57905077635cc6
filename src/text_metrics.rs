use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_METRICS: Lazy<Mutex<FontMetrics>> = Lazy::new(|| Mutex::new(FontMetrics::new()));

/// Width of `text` in pixels using the first installed face of `font_family`.
/// `None` when no matching face could be loaded.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_METRICS.lock().ok()?;
    let face = guard.face(font_family, bold)?;
    Some(face.width(text, font_size))
}

struct FontMetrics {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, bool), Option<FaceAdvances>>,
}

/// Horizontal advances for the ASCII range; other characters use the mean advance.
struct FaceAdvances {
    units_per_em: f32,
    ascii: [u16; 128],
    mean_advance: f32,
}

impl FaceAdvances {
    fn from_face(face: &Face<'_>) -> Self {
        let mut ascii = [0u16; 128];
        let mut total = 0u32;
        let mut count = 0u32;
        for byte in 0x20u8..0x7f {
            let Some(glyph) = face.glyph_index(byte as char) else {
                continue;
            };
            let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            ascii[byte as usize] = advance;
            if advance > 0 && byte.is_ascii_alphabetic() {
                total += u32::from(advance);
                count += 1;
            }
        }
        let units_per_em = f32::from(face.units_per_em().max(1));
        let mean_advance = if count == 0 {
            units_per_em * 0.56
        } else {
            total as f32 / count as f32
        };
        Self {
            units_per_em,
            ascii,
            mean_advance,
        }
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let units: f32 = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                let idx = ch as usize;
                if idx < 128 && self.ascii[idx] > 0 {
                    f32::from(self.ascii[idx])
                } else {
                    self.mean_advance
                }
            })
            .sum();
        units * scale
    }
}

impl FontMetrics {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, font_family: &str, bold: bool) -> Option<&FaceAdvances> {
        let key = (font_family.trim().to_string(), bold);
        if !self.faces.contains_key(&key) {
            let loaded = self.load(font_family, bold);
            tracing::debug!(family = font_family, bold, found = loaded.is_some(), "loaded font metrics");
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(|face| face.as_ref())
    }

    fn load(&mut self, font_family: &str, bold: bool) -> Option<FaceAdvances> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }
        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|face| FaceAdvances::from_face(&face))
            })
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 14.0, "sans-serif", false), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif", false), Some(0.0));
    }
}
