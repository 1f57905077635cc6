use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::Direction;

/// Top-left coordinates for every node in `rank_nodes`.
///
/// Ranks advance along the primary axis (x for left-right, y for top-down);
/// each rank occupies a band as deep as its largest node and nodes are centred
/// inside the band. Along the secondary axis the nodes of one rank are stacked
/// with `node_spacing` between them and every rank is centred on the widest one.
pub(super) fn assign_positions(
    rank_nodes: &[Vec<String>],
    sizes: &HashMap<String, (f32, f32)>,
    direction: Direction,
    config: &LayoutConfig,
) -> HashMap<String, (f32, f32)> {
    let horizontal = direction.is_horizontal();
    let extent = |id: &String| -> (f32, f32) {
        let (w, h) = sizes.get(id).copied().unwrap_or((0.0, 0.0));
        if horizontal { (w, h) } else { (h, w) }
    };

    let band_depth: Vec<f32> = rank_nodes
        .iter()
        .map(|bucket| bucket.iter().map(|id| extent(id).0).fold(0.0, f32::max))
        .collect();
    let span: Vec<f32> = rank_nodes
        .iter()
        .map(|bucket| {
            let total: f32 = bucket.iter().map(|id| extent(id).1).sum();
            total + config.node_spacing * bucket.len().saturating_sub(1) as f32
        })
        .collect();
    let widest = span.iter().copied().fold(0.0, f32::max);

    let mut positions = HashMap::new();
    let mut band_start = config.margin;
    for (rank, bucket) in rank_nodes.iter().enumerate() {
        let depth = band_depth[rank];
        let mut cross = config.margin + (widest - span[rank]) / 2.0;
        for id in bucket {
            let (main_len, cross_len) = extent(id);
            let main = band_start + (depth - main_len) / 2.0;
            let pos = if horizontal { (main, cross) } else { (cross, main) };
            positions.insert(id.clone(), pos);
            cross += cross_len + config.node_spacing;
        }
        band_start += depth + config.rank_spacing;
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Vec<Vec<String>>, HashMap<String, (f32, f32)>) {
        let ranks = vec![
            vec!["hub".to_string()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ];
        let mut sizes = HashMap::new();
        sizes.insert("hub".to_string(), (250.0, 200.0));
        for id in ["a", "b", "c"] {
            sizes.insert(id.to_string(), (60.0, 60.0));
        }
        (ranks, sizes)
    }

    #[test]
    fn left_right_bands_do_not_overlap() {
        let (ranks, sizes) = setup();
        let config = LayoutConfig::default();
        let pos = assign_positions(&ranks, &sizes, Direction::LeftRight, &config);
        let hub_right = pos["hub"].0 + 250.0;
        for id in ["a", "b", "c"] {
            assert!(pos[id].0 >= hub_right + config.rank_spacing - 0.01);
        }
        // stacked vertically with spacing
        assert!((pos["b"].1 - (pos["a"].1 + 60.0 + config.node_spacing)).abs() < 0.01);
        assert!((pos["c"].1 - (pos["b"].1 + 60.0 + config.node_spacing)).abs() < 0.01);
        // widest rank starts at the margin, narrower one is centred on it
        assert_eq!(pos["a"].1, config.margin);
        let span = 3.0 * 60.0 + 2.0 * config.node_spacing;
        assert!((pos["hub"].1 + 100.0 - (config.margin + span / 2.0)).abs() < 0.01);
    }

    #[test]
    fn top_down_swaps_axes() {
        let (ranks, sizes) = setup();
        let config = LayoutConfig::default();
        let pos = assign_positions(&ranks, &sizes, Direction::TopDown, &config);
        let hub_bottom = pos["hub"].1 + 200.0;
        for id in ["a", "b", "c"] {
            assert!(pos[id].1 >= hub_bottom + config.rank_spacing - 0.01);
        }
        assert!(pos["b"].0 > pos["a"].0);
    }
}
