use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{Direction, Flow, NodeKind};

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn inflate(&self, padding: f32) -> Rect {
        Rect::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
    pub caption: Option<TextBlock>,
    pub rank: usize,
    /// Placed from a stored position rather than by the layered layout.
    pub pinned: bool,
}

impl NodeLayout {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub from: String,
    pub to: String,
    pub flow: Flow,
    pub points: Vec<(f32, f32)>,
    pub color: String,
    pub width: f32,
    pub animated: bool,
    pub back_edge: bool,
}

#[derive(Debug, Clone)]
pub struct ClusterLayout {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub nodes: Vec<String>,
    pub rect: Rect,
    pub label: TextBlock,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub direction: Direction,
    pub manual: bool,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub clusters: Vec<ClusterLayout>,
    pub width: f32,
    pub height: f32,
    /// Shift applied to every input coordinate by bounds normalisation.
    pub offset: (f32, f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_containment_and_padding() {
        let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
        let outer = inner.inflate(5.0);
        assert_eq!(outer, Rect::new(5.0, 5.0, 30.0, 30.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(inner.intersects(&outer));
        assert!(!inner.intersects(&Rect::new(30.0, 0.0, 5.0, 5.0)));
        assert!(Rect::ZERO.is_empty());
    }
}
