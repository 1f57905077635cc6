use crate::config::LayoutConfig;
use crate::text_metrics;

use super::TextBlock;

pub(super) fn measure_label(
    text: &str,
    font_size: f32,
    font_family: &str,
    bold: bool,
    config: &LayoutConfig,
) -> TextBlock {
    let lines = split_lines(text);
    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, font_family, bold, config.fast_text_metrics))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;
    TextBlock {
        lines,
        width,
        height,
        font_size,
    }
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\\n", "\n").replace("<br/>", "\n").replace("<br>", "\n");
    normalized.split('\n').map(|line| line.trim().to_string()).collect()
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, bold: bool, fast: bool) -> f32 {
    if !fast {
        if let Some(width) = text_metrics::measure_text_width(text, font_size, font_family, bold) {
            return width;
        }
    }
    let factor = if bold { 1.08 } else { 1.0 };
    text.chars().map(char_width_factor).sum::<f32>() * font_size * factor
}

// Approximate advance widths (fraction of font size) for a humanist sans.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.28,
        'i' | 'j' | 'l' | 'I' | '|' | '!' | '.' | ',' | ':' | ';' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' => 0.86,
        'M' | 'W' => 0.92,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.6,
        'a'..='z' => 0.55,
        '&' | '@' | '%' | '#' => 0.9,
        _ if ch.is_ascii() => 0.5,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_escaped_and_literal_newlines() {
        assert_eq!(split_lines("Director Server\n(Inbound)"), vec!["Director Server", "(Inbound)"]);
        assert_eq!(split_lines("API\\n1"), vec!["API", "1"]);
        assert_eq!(split_lines("a<br/>b"), vec!["a", "b"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn label_block_grows_with_lines_and_size() {
        let config = LayoutConfig::default();
        let one = measure_label("Engine", 14.0, "sans-serif", false, &config);
        let two = measure_label("Engine\nEngine", 14.0, "sans-serif", false, &config);
        let big = measure_label("Engine", 28.0, "sans-serif", false, &config);
        assert!(one.width > 0.0);
        assert!((two.height - one.height * 2.0).abs() < 0.01);
        assert!((two.width - one.width).abs() < 0.01);
        assert!((big.width - one.width * 2.0).abs() < 0.01);
    }

    #[test]
    fn bold_is_wider_on_fast_path() {
        assert!(text_width("CARMA", 14.0, "sans-serif", true, true) > text_width("CARMA", 14.0, "sans-serif", false, true));
    }
}
