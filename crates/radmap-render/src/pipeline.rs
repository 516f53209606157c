//! Render pipeline: positioned nodes → surface calls.
//!
//! Paint order is fixed: one `clear`, then every connector, then every label. Labels therefore
//! always sit on top of the lines that join them.

use crate::layout::{PositionedNode, RadialLayout};
use radmap_core::TreeNode;
use radmap_core::geom;

/// The drawing capability the pipeline needs. Any toolkit can be adapted to these three calls.
pub trait Surface {
    /// Drops everything drawn so far.
    fn clear(&mut self);

    /// Draws a line that starts at the origin and runs `length` units along `angle` (radians,
    /// measured like `atan2`, y axis pointing down).
    fn draw_segment(&mut self, origin_x: f64, origin_y: f64, length: f64, angle: f64);

    /// Draws a label whose visual center is `(x, y)`. `level` is the node's tree depth, exposed
    /// for level-dependent styling.
    fn draw_label(&mut self, x: f64, y: f64, text: &str, level: usize);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn clear(&mut self) {
        (**self).clear();
    }

    fn draw_segment(&mut self, origin_x: f64, origin_y: f64, length: f64, angle: f64) {
        (**self).draw_segment(origin_x, origin_y, length, angle);
    }

    fn draw_label(&mut self, x: f64, y: f64, text: &str, level: usize) {
        (**self).draw_label(x, y, text, level);
    }
}

/// A label as drawn, still tied to the tree node it came from.
#[derive(Debug, Clone, Copy)]
pub struct DrawnLabel<'a> {
    pub node: &'a TreeNode,
    /// Index of the positioned node this label was drawn for.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub level: usize,
}

/// What one [`render`] call drew, kept for later inspection (e.g. mapping a click to a node).
#[derive(Debug, Clone, Default)]
pub struct RenderedScene<'a> {
    pub labels: Vec<DrawnLabel<'a>>,
    pub segment_count: usize,
}

impl<'a> RenderedScene<'a> {
    /// The topmost (last drawn) label whose center lies within `tolerance` of `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64, tolerance: f64) -> Option<&DrawnLabel<'a>> {
        let probe = geom::point(x, y);
        self.labels
            .iter()
            .rev()
            .find(|l| (geom::point(l.x, l.y) - probe).length() <= tolerance)
    }
}

pub fn render<'a, S>(surface: &mut S, layout: &RadialLayout<'a>) -> RenderedScene<'a>
where
    S: Surface + ?Sized,
{
    render_nodes(surface, layout.nodes())
}

/// Renders a pre-order positioned-node list whose `parent` fields index into `positions`.
///
/// Entries whose parent index is out of range get no connector.
pub fn render_nodes<'a, S>(surface: &mut S, positions: &[PositionedNode<'a>]) -> RenderedScene<'a>
where
    S: Surface + ?Sized,
{
    surface.clear();

    let mut segment_count = 0usize;
    for (index, pos) in positions.iter().enumerate() {
        let Some(parent_index) = pos.parent else {
            continue;
        };
        let Some(parent) = positions.get(parent_index) else {
            tracing::warn!(index, parent_index, "positioned node has a dangling parent");
            continue;
        };
        let (length, angle) = geom::segment_polar(parent.position(), pos.position());
        surface.draw_segment(parent.x, parent.y, length, angle);
        segment_count += 1;
    }

    let mut labels = Vec::with_capacity(positions.len());
    for (index, pos) in positions.iter().enumerate() {
        surface.draw_label(pos.x, pos.y, &pos.node.text, pos.level);
        labels.push(DrawnLabel {
            node: pos.node,
            index,
            x: pos.x,
            y: pos.y,
            level: pos.level,
        });
    }

    tracing::debug!(segments = segment_count, labels = labels.len(), "rendered mind map");
    RenderedScene {
        labels,
        segment_count,
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    Segment {
        origin_x: f64,
        origin_y: f64,
        length: f64,
        angle: f64,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
        level: usize,
    },
}

/// A surface that records every call in order (a display list).
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received, including `Clear`.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Calls received since the last `Clear`, i.e. what is currently visible.
    pub fn visible(&self) -> &[SurfaceOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, SurfaceOp::Clear))
            .map_or(0, |i| i + 1);
        &self.ops[start..]
    }

    pub fn segments(&self) -> impl Iterator<Item = &SurfaceOp> + '_ {
        self.visible()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Segment { .. }))
    }

    pub fn labels(&self) -> impl Iterator<Item = &SurfaceOp> + '_ {
        self.visible()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Label { .. }))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn draw_segment(&mut self, origin_x: f64, origin_y: f64, length: f64, angle: f64) {
        self.ops.push(SurfaceOp::Segment {
            origin_x,
            origin_y,
            length,
            angle,
        });
    }

    fn draw_label(&mut self, x: f64, y: f64, text: &str, level: usize) {
        self.ops.push(SurfaceOp::Label {
            x,
            y,
            text: text.to_string(),
            level,
        });
    }
}
