//! Radial layout.
//!
//! The root sits at the surface center. Each node's children are fanned over a full turn around
//! it, centered on the node's own incoming angle, at a radius that decays geometrically per level:
//!
//! ```text
//! step        = 2π / n
//! child_angle = θ + (i - (n - 1) / 2) · step
//! child       = parent + r · (cos child_angle, sin child_angle)
//! child radius = r · decay
//! ```
//!
//! A single child continues straight outward along the parent's angle. Sibling subtrees are not
//! checked for overlap, and nothing is scaled to fit the surface.

use crate::{Error, Result};
use radmap_core::geom::{self, Point, Size};
use radmap_core::{
    DEFAULT_BASE_RADIUS, DEFAULT_RADIUS_DECAY, MindMapDocument, RadmapConfig, TreeNode,
};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialLayoutOptions {
    /// Radius used to place the root's children.
    pub base_radius: f64,
    /// Factor applied to the radius at every level.
    pub decay: f64,
}

impl Default for RadialLayoutOptions {
    fn default() -> Self {
        Self {
            base_radius: DEFAULT_BASE_RADIUS,
            decay: DEFAULT_RADIUS_DECAY,
        }
    }
}

impl RadialLayoutOptions {
    pub fn from_config(config: &RadmapConfig) -> Result<Self> {
        let (base_radius, decay) = config.radius_params()?;
        Ok(Self { base_radius, decay })
    }

    /// Radius used to place the children of a node at `level`.
    pub fn radius_at(&self, level: usize) -> f64 {
        self.base_radius * self.decay.powi(level as i32)
    }

    fn validate(&self) -> Result<()> {
        require_positive_finite("base radius", self.base_radius)?;
        require_positive_finite("radius decay", self.decay)
    }
}

/// One tree node placed on the surface.
#[derive(Debug, Clone, Copy)]
pub struct PositionedNode<'a> {
    pub node: &'a TreeNode,
    pub x: f64,
    pub y: f64,
    /// Depth in the tree; the root is 0.
    pub level: usize,
    /// Index of the parent's entry in the same [`RadialLayout`]; `None` for the root.
    pub parent: Option<usize>,
    /// Angle (radians) this node was placed at relative to its parent; 0 for the root.
    pub angle: f64,
    /// Radius at which this node's children are placed.
    pub radius: f64,
}

impl PositionedNode<'_> {
    pub fn position(&self) -> Point {
        geom::point(self.x, self.y)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Result of one layout pass: every tree node exactly once, in pre-order.
#[derive(Debug, Clone)]
pub struct RadialLayout<'a> {
    nodes: Vec<PositionedNode<'a>>,
    surface: Size,
}

impl<'a> RadialLayout<'a> {
    pub fn nodes(&self) -> &[PositionedNode<'a>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn surface(&self) -> Size {
        self.surface
    }

    pub fn root(&self) -> Option<&PositionedNode<'a>> {
        self.nodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&PositionedNode<'a>> {
        self.nodes.get(index)
    }

    pub fn parent_of(&self, node: &PositionedNode<'a>) -> Option<&PositionedNode<'a>> {
        node.parent.and_then(|i| self.nodes.get(i))
    }

    /// Indices of the direct children of the entry at `index`, in source order.
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .skip(index.saturating_add(1))
            .filter(move |(_, n)| n.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// `(parent, child)` pairs in layout order.
    pub fn connectors(
        &self,
    ) -> impl Iterator<Item = (&PositionedNode<'a>, &PositionedNode<'a>)> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| self.parent_of(n).map(|p| (p, n)))
    }

    pub fn bounds(&self) -> Option<crate::model::Bounds> {
        crate::model::Bounds::from_points(self.nodes.iter().map(|n| (n.x, n.y)))
    }

    pub fn into_nodes(self) -> Vec<PositionedNode<'a>> {
        self.nodes
    }
}

struct Pending<'a> {
    node: &'a TreeNode,
    at: Point,
    angle: f64,
    radius: f64,
    level: usize,
    parent: Option<usize>,
}

/// Lays out `root` on a `surface_width` x `surface_height` surface.
///
/// Fails with an invalid-input error for non-finite or non-positive dimensions or radius
/// parameters; no partial layout is produced. Otherwise total for any finite tree.
pub fn layout<'a>(
    root: &'a TreeNode,
    surface_width: f64,
    surface_height: f64,
    options: &RadialLayoutOptions,
) -> Result<RadialLayout<'a>> {
    require_positive_finite("surface width", surface_width)?;
    require_positive_finite("surface height", surface_height)?;
    options.validate()?;

    let center = geom::point(surface_width / 2.0, surface_height / 2.0);
    let mut nodes: Vec<PositionedNode<'a>> = Vec::with_capacity(root.node_count());

    // Explicit stack instead of recursion. Children are pushed in reverse so they pop in source
    // order, which keeps the output pre-order.
    let mut stack = vec![Pending {
        node: root,
        at: center,
        angle: 0.0,
        radius: options.base_radius,
        level: 0,
        parent: None,
    }];

    while let Some(p) = stack.pop() {
        let index = nodes.len();
        nodes.push(PositionedNode {
            node: p.node,
            x: p.at.x,
            y: p.at.y,
            level: p.level,
            parent: p.parent,
            angle: p.angle,
            radius: p.radius,
        });
        tracing::trace!(index, level = p.level, x = p.at.x, y = p.at.y, "placed node");

        let n = p.node.children.len();
        if n == 0 {
            continue;
        }
        let step = TAU / n as f64;
        let mid = (n - 1) as f64 / 2.0;
        let next_radius = p.radius * options.decay;
        for (i, child) in p.node.children.iter().enumerate().rev() {
            let child_angle = p.angle + (i as f64 - mid) * step;
            stack.push(Pending {
                node: child,
                at: geom::polar(p.at, child_angle, p.radius),
                angle: child_angle,
                radius: next_radius,
                level: p.level + 1,
                parent: Some(index),
            });
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        surface_width,
        surface_height,
        base_radius = options.base_radius,
        decay = options.decay,
        "radial layout complete"
    );

    Ok(RadialLayout {
        nodes,
        surface: geom::size(surface_width, surface_height),
    })
}

/// [`layout`] for a service response; an absent root is an invalid-input error.
pub fn layout_document<'a>(
    document: &'a MindMapDocument,
    surface_width: f64,
    surface_height: f64,
    options: &RadialLayoutOptions,
) -> Result<RadialLayout<'a>> {
    let root = document.root()?;
    layout(root, surface_width, surface_height, options)
}

fn require_positive_finite(what: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "{what} must be a positive finite number, got {v}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn opts() -> RadialLayoutOptions {
        RadialLayoutOptions::default()
    }

    #[test]
    fn single_root_sits_at_center() {
        let root = TreeNode::leaf("only");
        let out = layout(&root, 800.0, 600.0, &opts()).unwrap();
        assert_eq!(out.len(), 1);
        let r = out.root().unwrap();
        assert!(close(r.x, 400.0) && close(r.y, 300.0));
        assert_eq!(r.level, 0);
        assert!(r.is_root());
        assert_eq!(r.radius, 200.0);
    }

    #[test]
    fn two_children_split_vertically() {
        let root = TreeNode::with_children("r", vec![TreeNode::leaf("a"), TreeNode::leaf("b")]);
        let out = layout(&root, 800.0, 600.0, &opts()).unwrap();
        let n = out.nodes();
        assert_eq!(n.len(), 3);
        assert!(close(n[1].x, 400.0) && close(n[1].y, 100.0));
        assert!(close(n[2].x, 400.0) && close(n[2].y, 500.0));
        assert!(close(n[1].angle, -FRAC_PI_2));
        assert!(close(n[2].angle, FRAC_PI_2));
        for child in &n[1..] {
            assert_eq!(child.level, 1);
            assert_eq!(child.parent, Some(0));
            assert!(close(child.radius, 140.0));
        }
    }

    #[test]
    fn single_child_continues_along_parent_angle() {
        let root = TreeNode::with_children(
            "r",
            vec![TreeNode::with_children("a", vec![TreeNode::leaf("b")])],
        );
        let out = layout(&root, 800.0, 600.0, &opts()).unwrap();
        let n = out.nodes();
        assert!(close(n[1].x, 600.0) && close(n[1].y, 300.0));
        assert!(close(n[2].x, 740.0) && close(n[2].y, 300.0));
        assert!(close(n[2].angle, 0.0));
    }

    #[test]
    fn children_of_and_connectors_follow_parent_indices() {
        let root = TreeNode::with_children(
            "r",
            vec![
                TreeNode::with_children("a", vec![TreeNode::leaf("a1"), TreeNode::leaf("a2")]),
                TreeNode::leaf("b"),
            ],
        );
        let out = layout(&root, 800.0, 600.0, &opts()).unwrap();
        let texts: Vec<&str> = out.nodes().iter().map(|n| n.node.text.as_str()).collect();
        assert_eq!(texts, ["r", "a", "a1", "a2", "b"]);
        assert_eq!(out.children_of(0).collect::<Vec<_>>(), [1, 4]);
        assert_eq!(out.children_of(1).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(out.children_of(4).count(), 0);
        assert_eq!(out.connectors().count(), 4);
        let parent = out.parent_of(&out.nodes()[3]).unwrap();
        assert_eq!(parent.node.text, "a");
    }

    #[test]
    fn children_of_out_of_range_index_is_empty() {
        let root = TreeNode::with_children("r", vec![TreeNode::leaf("a")]);
        let out = layout(&root, 800.0, 600.0, &opts()).unwrap();
        assert_eq!(out.children_of(out.len()).count(), 0);
        assert_eq!(out.children_of(usize::MAX).count(), 0);
    }

    #[test]
    fn rejects_bad_surface_and_radius() {
        let root = TreeNode::leaf("r");
        for (w, h) in [(0.0, 600.0), (800.0, -1.0), (f64::NAN, 600.0), (800.0, f64::INFINITY)] {
            let err = layout(&root, w, h, &opts()).unwrap_err();
            assert!(err.is_invalid_input(), "{w}x{h}: {err}");
        }
        let bad = RadialLayoutOptions {
            base_radius: 0.0,
            decay: 0.7,
        };
        assert!(layout(&root, 800.0, 600.0, &bad).unwrap_err().is_invalid_input());
        let bad = RadialLayoutOptions {
            base_radius: 200.0,
            decay: -0.5,
        };
        assert!(layout(&root, 800.0, 600.0, &bad).unwrap_err().is_invalid_input());
    }

    #[test]
    fn absent_root_is_invalid_input() {
        let doc = MindMapDocument::default();
        let err = layout_document(&doc, 800.0, 600.0, &opts()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn radius_at_matches_geometric_decay() {
        let o = opts();
        assert!(close(o.radius_at(0), 200.0));
        assert!(close(o.radius_at(1), 140.0));
        assert!(close(o.radius_at(2), 98.0));
    }
}
