#![forbid(unsafe_code)]

//! Mind map tree model + input boundary (headless).
//!
//! Design goals:
//! - the tree shape consumed here is exactly what a generation service returns (`text` +
//!   ordered `children`); unknown fields are ignored
//! - no behavior on the tree itself: layout and drawing live in `radmap-render`
//! - every tunable is an explicit value ([`RadmapConfig`]), never a global

pub mod config;
pub mod error;
pub mod generate;
pub mod geom;
pub mod tree;

pub use config::RadmapConfig;
pub use error::{Error, Result};
pub use generate::{GenerateRequest, TemplateGenerator, TreeSource};
pub use tree::{MindMapDocument, TreeNode};

/// Default radius used to place the root's children.
pub const DEFAULT_BASE_RADIUS: f64 = 200.0;

/// Default per-level radius decay factor.
pub const DEFAULT_RADIUS_DECAY: f64 = 0.7;

/// Default surface size, matching the CLI's fallback viewport.
pub const DEFAULT_SURFACE_WIDTH: f64 = 800.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 600.0;
