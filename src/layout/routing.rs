use crate::ir::Direction;

use super::Rect;

const MIN_STUB: f32 = 20.0;

/// Rect expressed along the layout axes: `main` follows the rank direction.
#[derive(Debug, Clone, Copy)]
struct AxisRect {
    main: f32,
    main_len: f32,
    cross: f32,
    cross_len: f32,
}

impl AxisRect {
    fn from_rect(rect: &Rect, horizontal: bool) -> Self {
        if horizontal {
            Self {
                main: rect.x,
                main_len: rect.width,
                cross: rect.y,
                cross_len: rect.height,
            }
        } else {
            Self {
                main: rect.y,
                main_len: rect.height,
                cross: rect.x,
                cross_len: rect.width,
            }
        }
    }

    fn main_end(&self) -> f32 {
        self.main + self.main_len
    }

    fn cross_mid(&self) -> f32 {
        self.cross + self.cross_len / 2.0
    }

    fn cross_end(&self) -> f32 {
        self.cross + self.cross_len
    }
}

/// Smooth-step route between the source's outgoing handle and the target's
/// incoming handle. Returns the polyline and whether the edge runs backwards.
///
/// Forward edges bend once at the midpoint between the handles. Edges whose
/// target does not lie clear ahead of the source leave forward by `detour`,
/// run past the far side of both nodes, and re-enter from behind the target.
pub(super) fn route_edge(
    source: &Rect,
    target: &Rect,
    direction: Direction,
    detour: f32,
) -> (Vec<(f32, f32)>, bool) {
    let horizontal = direction.is_horizontal();
    let src = AxisRect::from_rect(source, horizontal);
    let dst = AxisRect::from_rect(target, horizontal);

    let start = (src.main_end(), src.cross_mid());
    let end = (dst.main, dst.cross_mid());

    let (points, back_edge) = if end.0 >= start.0 + MIN_STUB {
        if (start.1 - end.1).abs() < 0.5 {
            (vec![start, end], false)
        } else {
            let mid = (start.0 + end.0) / 2.0;
            (vec![start, (mid, start.1), (mid, end.1), end], false)
        }
    } else {
        let out = start.0 + detour;
        let back = end.0 - detour;
        let lane = src.cross_end().max(dst.cross_end()) + detour;
        (
            vec![
                start,
                (out, start.1),
                (out, lane),
                (back, lane),
                (back, end.1),
                end,
            ],
            true,
        )
    };

    let points = points
        .into_iter()
        .map(|(main, cross)| if horizontal { (main, cross) } else { (cross, main) })
        .collect();
    (points, back_edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_edge_bends_at_midpoint() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        let b = Rect::new(200.0, 100.0, 60.0, 60.0);
        let (points, back) = route_edge(&a, &b, Direction::LeftRight, 40.0);
        assert!(!back);
        assert_eq!(points, vec![(60.0, 30.0), (130.0, 30.0), (130.0, 130.0), (200.0, 130.0)]);
    }

    #[test]
    fn aligned_forward_edge_is_straight() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        let b = Rect::new(200.0, 0.0, 60.0, 60.0);
        let (points, _) = route_edge(&a, &b, Direction::LeftRight, 40.0);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn back_edge_detours_below_both_nodes() {
        let a = Rect::new(300.0, 0.0, 60.0, 60.0);
        let b = Rect::new(0.0, 20.0, 250.0, 200.0);
        let (points, back) = route_edge(&a, &b, Direction::LeftRight, 40.0);
        assert!(back);
        assert_eq!(points.first(), Some(&(360.0, 30.0)));
        assert_eq!(points.last(), Some(&(0.0, 120.0)));
        assert!(points.iter().any(|p| p.1 == 260.0));
    }

    #[test]
    fn top_down_back_edge_detours_right_of_both_nodes() {
        let a = Rect::new(0.0, 300.0, 60.0, 60.0);
        let b = Rect::new(20.0, 0.0, 200.0, 100.0);
        let (points, back) = route_edge(&a, &b, Direction::TopDown, 40.0);
        assert!(back);
        assert_eq!(
            points,
            vec![
                (30.0, 360.0),
                (30.0, 400.0),
                (260.0, 400.0),
                (260.0, -40.0),
                (120.0, -40.0),
                (120.0, 0.0),
            ]
        );
        assert!(points[2].0 > a.right() && points[2].0 > b.right());
    }

    #[test]
    fn top_down_uses_bottom_and_top_handles() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 200.0, 100.0, 50.0);
        let (points, back) = route_edge(&a, &b, Direction::TopDown, 40.0);
        assert!(!back);
        assert_eq!(points, vec![(50.0, 50.0), (50.0, 200.0)]);
    }
}
