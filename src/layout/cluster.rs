use std::collections::BTreeMap;

use super::Rect;

/// Smallest rectangle covering the listed node rectangles, grown by `padding` per side.
///
/// Unknown ids are skipped. With no known member the result is [`Rect::ZERO`].
pub fn cluster_box(node_rects: &BTreeMap<String, Rect>, ids: &[String], padding: f32) -> Rect {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut found = false;

    for id in ids {
        let Some(rect) = node_rects.get(id) else {
            continue;
        };
        found = true;
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
    }

    if !found {
        return Rect::ZERO;
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y).inflate(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str, x: f32, y: f32, w: f32, h: f32) -> (String, Rect) {
        (id.to_string(), Rect::new(x, y, w, h))
    }

    #[test]
    fn box_covers_members_plus_padding() {
        let rects: BTreeMap<_, _> = [
            rect("a", 100.0, 50.0, 60.0, 60.0),
            rect("b", 300.0, -20.0, 250.0, 200.0),
            rect("outside", 1000.0, 1000.0, 60.0, 60.0),
        ]
        .into_iter()
        .collect();
        let ids = vec!["a".to_string(), "b".to_string(), "ghost".to_string()];
        let boxed = cluster_box(&rects, &ids, 50.0);
        assert_eq!(boxed, Rect::new(50.0, -70.0, 550.0, 300.0));
        for id in ["a", "b"] {
            assert!(boxed.contains(&rects[id]));
        }
        assert!(!boxed.intersects(&rects["outside"]));
    }

    #[test]
    fn single_member_and_empty_sets() {
        let rects: BTreeMap<_, _> = [rect("a", 10.0, 10.0, 60.0, 60.0)].into_iter().collect();
        assert_eq!(
            cluster_box(&rects, &["a".to_string()], 0.0),
            Rect::new(10.0, 10.0, 60.0, 60.0)
        );
        assert_eq!(cluster_box(&rects, &[], 50.0), Rect::ZERO);
        assert_eq!(cluster_box(&rects, &["nope".to_string()], 50.0), Rect::ZERO);
    }
}
