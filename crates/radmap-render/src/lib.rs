#![forbid(unsafe_code)]

//! Radial layout + render pipeline for mind maps.
//!
//! - [`layout`]: tree → positioned nodes (pure; knows nothing about drawing)
//! - [`pipeline`]: positioned nodes → [`pipeline::Surface`] calls (clear, connectors, labels)
//! - [`svg`]: a [`pipeline::Surface`] that produces an SVG document
//! - [`model`]: serializable snapshot of a layout (for JSON output)

pub mod layout;
pub mod model;
pub mod pipeline;
pub mod svg;
pub mod text;

pub use layout::{PositionedNode, RadialLayout, RadialLayoutOptions, layout, layout_document};
pub use pipeline::{RecordingSurface, RenderedScene, Surface, SurfaceOp, render, render_nodes};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout input: {message}")]
    InvalidInput { message: String },
    #[error(transparent)]
    Core(#[from] radmap_core::Error),
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// True for precondition violations, whether detected here or while decoding the tree.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::Core(radmap_core::Error::InvalidInput { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
