#![forbid(unsafe_code)]

//! `radmap` renders mind map trees as radial diagrams, headless.
//!
//! The tree model and input decoding come from `radmap-core` and are re-exported at the crate
//! root.
//!
//! # Features
//!
//! - `render`: enable radial layout + SVG rendering (`radmap::render`)
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use radmap_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use radmap_render::model::LayoutedMindMap;
    pub use radmap_render::pipeline::{
        DrawnLabel, RecordingSurface, RenderedScene, Surface, SurfaceOp, render, render_nodes,
    };
    pub use radmap_render::svg::{SvgRenderOptions, SvgSurface, render_svg};
    pub use radmap_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use radmap_render::{
        PositionedNode, RadialLayout, RadialLayoutOptions, layout, layout_document,
    };

    use radmap_core::{MindMapDocument, RadmapConfig};
    use std::sync::Arc;

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Core(#[from] radmap_core::Error),
        #[error(transparent)]
        Render(#[from] radmap_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string into a conservative SVG `id` token suitable for embedding
    /// multiple mind maps in the same page.
    ///
    /// The id also scopes the embedded stylesheet, so two inlined SVGs with the same id would
    /// style each other. This helper:
    /// - trims whitespace
    /// - replaces unsupported characters with `-`
    /// - ensures the id starts with an ASCII letter by prefixing `m-` when needed
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "m-untitled".to_string();
        }

        let mut out = String::with_capacity(raw.len() + 4);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
            out.push(if ok { ch } else { '-' });
        }

        let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_ok {
            out.insert_str(0, "m-");
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() || out == "m" {
            return "m-untitled".to_string();
        }
        out.to_string()
    }

    /// Everything one layout + render pass needs, resolved from a [`RadmapConfig`].
    #[derive(Clone)]
    pub struct RenderOptions {
        pub surface_width: f64,
        pub surface_height: f64,
        pub layout: RadialLayoutOptions,
        pub svg: SvgRenderOptions,
        pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    }

    impl std::fmt::Debug for RenderOptions {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RenderOptions")
                .field("surface_width", &self.surface_width)
                .field("surface_height", &self.surface_height)
                .field("layout", &self.layout)
                .field("svg", &self.svg)
                .finish_non_exhaustive()
        }
    }

    impl Default for RenderOptions {
        fn default() -> Self {
            Self {
                surface_width: radmap_core::DEFAULT_SURFACE_WIDTH,
                surface_height: radmap_core::DEFAULT_SURFACE_HEIGHT,
                layout: RadialLayoutOptions::default(),
                svg: SvgRenderOptions::default(),
                text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            }
        }
    }

    impl RenderOptions {
        pub fn from_config(config: &RadmapConfig) -> Result<Self> {
            let (surface_width, surface_height) = config.surface_size()?;
            let mut svg = SvgRenderOptions::from_config(config);
            svg.diagram_id = svg.diagram_id.as_deref().map(sanitize_svg_id);
            Ok(Self {
                surface_width,
                surface_height,
                layout: RadialLayoutOptions::from_config(config)?,
                svg,
                ..Default::default()
            })
        }
    }

    /// Lays out `document` and returns the serializable snapshot.
    pub fn layout_snapshot(
        document: &MindMapDocument,
        options: &RenderOptions,
    ) -> Result<LayoutedMindMap> {
        let layout = layout_document(
            document,
            options.surface_width,
            options.surface_height,
            &options.layout,
        )?;
        Ok(LayoutedMindMap::from_layout(&layout))
    }

    /// Lays out `document` and renders it to an SVG string in one pass.
    pub fn layout_and_render_svg(
        document: &MindMapDocument,
        options: &RenderOptions,
    ) -> Result<String> {
        let layout = layout_document(
            document,
            options.surface_width,
            options.surface_height,
            &options.layout,
        )?;
        let svg = render_svg(&layout, options.text_measurer.as_ref(), &options.svg);
        tracing::debug!(nodes = layout.len(), bytes = svg.len(), "rendered svg");
        Ok(svg)
    }

}
