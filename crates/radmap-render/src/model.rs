use crate::layout::RadialLayout;
use radmap_core::geom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.include(x, y);
        }
        Some(b)
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.include(other.min_x, other.min_y);
        self.include(other.max_x, other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub index: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub level: usize,
    pub parent: Option<usize>,
    pub angle: f64,
    pub radius: f64,
}

/// A connector in the same origin + length + rotation form the render pipeline draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: usize,
    pub to: usize,
    pub length: f64,
    pub angle: f64,
}

/// Owned, serializable snapshot of a [`RadialLayout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutedMindMap {
    pub surface_width: f64,
    pub surface_height: f64,
    pub bounds: Option<Bounds>,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutedMindMap {
    pub fn from_layout(layout: &RadialLayout<'_>) -> Self {
        let nodes = layout
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, n)| LayoutNode {
                index,
                text: n.node.text.clone(),
                x: n.x,
                y: n.y,
                level: n.level,
                parent: n.parent,
                angle: n.angle,
                radius: n.radius,
            })
            .collect();

        let edges = layout
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(to, n)| {
                let from = n.parent?;
                let parent = layout.get(from)?;
                let (length, angle) = geom::segment_polar(parent.position(), n.position());
                Some(LayoutEdge {
                    from,
                    to,
                    length,
                    angle,
                })
            })
            .collect();

        let surface = layout.surface();
        Self {
            surface_width: surface.width,
            surface_height: surface.height,
            bounds: layout.bounds(),
            nodes,
            edges,
        }
    }

    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}
