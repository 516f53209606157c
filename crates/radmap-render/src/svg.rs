//! SVG drawing surface.
//!
//! Output is appended in call order, so the pipeline's paint order (connectors, then labels) is
//! the document order and labels render above lines.

mod util;

use crate::layout::RadialLayout;
use crate::model::Bounds;
use crate::pipeline::{self, Surface};
use crate::text::{TextMeasurer, TextStyle, font_size_for_level};
use radmap_core::{RadmapConfig, geom};
use std::fmt::Write as _;
use util::{escape_xml, escape_xml_into, fmt, fmt_into};

const DEFAULT_FONT_FAMILY: &str = r#""trebuchet ms",verdana,arial,sans-serif"#;

// Root gets its own fill; deeper levels cycle through this palette.
const ROOT_FILL: &str = "hsl(240, 100%, 46.2745098039%)";
const LEVEL_FILLS: [&str; 11] = [
    "hsl(60, 100%, 73.5294117647%)",
    "hsl(80, 100%, 76.2745098039%)",
    "hsl(270, 100%, 76.2745098039%)",
    "hsl(300, 100%, 76.2745098039%)",
    "hsl(330, 100%, 76.2745098039%)",
    "hsl(0, 100%, 76.2745098039%)",
    "hsl(30, 100%, 76.2745098039%)",
    "hsl(90, 100%, 76.2745098039%)",
    "hsl(150, 100%, 76.2745098039%)",
    "hsl(180, 100%, 76.2745098039%)",
    "hsl(210, 100%, 76.2745098039%)",
];

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root `<svg id>`; also scopes the stylesheet.
    pub diagram_id: Option<String>,
    pub font_family: Option<String>,
    /// Optional CSS color painted behind the diagram.
    pub background: Option<String>,
    /// Horizontal space between a label's text and its box.
    pub label_padding_x: f64,
    /// Vertical space between a label's text and its box.
    pub label_padding_y: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            font_family: None,
            background: None,
            label_padding_x: 10.0,
            label_padding_y: 5.0,
        }
    }
}

impl SvgRenderOptions {
    pub fn from_config(config: &RadmapConfig) -> Self {
        let defaults = Self::default();
        let padding = |key: &str, fallback: f64| {
            config
                .get_f64(key)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(fallback)
        };
        Self {
            diagram_id: config.get_str("render.diagramId").map(str::to_string),
            font_family: config.get_str("render.fontFamily").map(str::to_string),
            background: config.get_str("render.background").map(str::to_string),
            label_padding_x: padding("render.labelPaddingX", defaults.label_padding_x),
            label_padding_y: padding("render.labelPaddingY", defaults.label_padding_y),
        }
    }
}

/// A [`Surface`] that accumulates SVG markup. Call [`SvgSurface::finish`] for the document.
pub struct SvgSurface<'m> {
    width: f64,
    height: f64,
    options: SvgRenderOptions,
    measurer: &'m dyn TextMeasurer,
    body: String,
    content: Option<Bounds>,
    max_level: Option<usize>,
    segment_count: usize,
    label_count: usize,
}

impl std::fmt::Debug for SvgSurface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("segment_count", &self.segment_count)
            .field("label_count", &self.label_count)
            .finish_non_exhaustive()
    }
}

impl<'m> SvgSurface<'m> {
    pub fn new(
        width: f64,
        height: f64,
        options: SvgRenderOptions,
        measurer: &'m dyn TextMeasurer,
    ) -> Self {
        Self {
            width,
            height,
            options,
            measurer,
            body: String::new(),
            content: None,
            max_level: None,
            segment_count: 0,
            label_count: 0,
        }
    }

    /// Box around everything drawn since the last clear (label boxes included). May extend past
    /// the surface; the document's viewBox stays the surface rectangle.
    pub fn content_bounds(&self) -> Option<&Bounds> {
        self.content.as_ref()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn label_count(&self) -> usize {
        self.label_count
    }

    fn diagram_id(&self) -> &str {
        self.options.diagram_id.as_deref().unwrap_or("radmap")
    }

    fn include(&mut self, b: Bounds) {
        match &mut self.content {
            Some(c) => c.union(&b),
            None => self.content = Some(b),
        }
    }

    fn css(&self) -> String {
        let id = escape_xml(self.diagram_id());
        let font = self
            .options
            .font_family
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_FONT_FAMILY);

        let mut out = String::new();
        let _ = write!(
            &mut out,
            r#"#{id}{{font-family:{font};font-size:16px;}}#{id} .connector{{stroke:#999999;stroke-width:2;fill:none;}}#{id} .node-bkg{{stroke:#666666;stroke-width:1;}}#{id} .node-label{{text-anchor:middle;dominant-baseline:central;}}"#,
            font = escape_xml(font),
        );
        let Some(max_level) = self.max_level else {
            return out;
        };
        for level in 0..=max_level {
            let (fill, label) = if level == 0 {
                (ROOT_FILL, "#ffffff")
            } else {
                (LEVEL_FILLS[(level - 1) % LEVEL_FILLS.len()], "#000000")
            };
            let _ = write!(
                &mut out,
                r#"#{id} .level-{level} .node-bkg{{fill:{fill};}}#{id} .level-{level} text{{fill:{label};font-size:{size}px;}}"#,
                size = fmt(font_size_for_level(level)),
            );
        }
        out
    }

    /// The complete SVG document for what is currently drawn.
    pub fn finish(&self) -> String {
        let id = escape_xml(self.diagram_id());
        let w = fmt(self.width);
        let h = fmt(self.height);

        let mut out = String::with_capacity(self.body.len() + 1024);
        let _ = write!(
            &mut out,
            r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="overflow: visible;" role="graphics-document document" aria-roledescription="mindmap"><style>{css}</style>"#,
            css = self.css(),
        );
        if let Some(bg) = self.options.background.as_deref() {
            let _ = write!(
                &mut out,
                r#"<rect class="background" x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
                escape_xml(bg)
            );
        }
        out.push_str(r#"<g class="mindmap">"#);
        out.push_str(&self.body);
        out.push_str("</g></svg>");
        out
    }
}

impl Surface for SvgSurface<'_> {
    fn clear(&mut self) {
        self.body.clear();
        self.content = None;
        self.max_level = None;
        self.segment_count = 0;
        self.label_count = 0;
    }

    fn draw_segment(&mut self, origin_x: f64, origin_y: f64, length: f64, angle: f64) {
        let origin = geom::point(origin_x, origin_y);
        let end = geom::polar(origin, angle, length);
        if let Some(b) = Bounds::from_points([(origin.x, origin.y), (end.x, end.y)]) {
            self.include(b);
        }

        // Horizontal line of `length` at the origin, rotated about the origin.
        let out = &mut self.body;
        out.push_str(r#"<line class="connector" x1=""#);
        fmt_into(out, origin_x);
        out.push_str(r#"" y1=""#);
        fmt_into(out, origin_y);
        out.push_str(r#"" x2=""#);
        fmt_into(out, origin_x + length);
        out.push_str(r#"" y2=""#);
        fmt_into(out, origin_y);
        out.push_str(r#"" transform="rotate("#);
        fmt_into(out, angle.to_degrees());
        out.push(' ');
        fmt_into(out, origin_x);
        out.push(' ');
        fmt_into(out, origin_y);
        out.push_str(r#")"/>"#);

        self.segment_count += 1;
    }

    fn draw_label(&mut self, x: f64, y: f64, text: &str, level: usize) {
        let font_size = font_size_for_level(level);
        let style = TextStyle {
            font_family: self.options.font_family.clone(),
            font_size,
            font_weight: None,
        };
        let metrics = self.measurer.measure(text, &style);
        let w = metrics.width + 2.0 * self.options.label_padding_x;
        let h = metrics.height + 2.0 * self.options.label_padding_y;
        self.include(Bounds {
            min_x: x - w / 2.0,
            min_y: y - h / 2.0,
            max_x: x + w / 2.0,
            max_y: y + h / 2.0,
        });
        self.max_level = Some(self.max_level.map_or(level, |m| m.max(level)));

        let out = &mut self.body;
        let _ = write!(
            out,
            r#"<g class="node level-{level}" transform="translate({}, {})"><title>"#,
            fmt(x),
            fmt(y)
        );
        escape_xml_into(out, text);
        let _ = write!(
            out,
            r#"</title><rect class="node-bkg" x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}"/><text class="node-label" x="0" y="0">"#,
            fmt(-w / 2.0),
            fmt(-h / 2.0),
            fmt(w),
            fmt(h),
            fmt(h / 2.0),
            fmt(h / 2.0),
        );

        let lines: Vec<&str> = text.split('\n').collect();
        if lines.len() == 1 {
            escape_xml_into(out, text);
        } else {
            // Stack lines around the center.
            let line_height = metrics.height / lines.len() as f64;
            let first_dy = -line_height * (lines.len() - 1) as f64 / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let dy = if i == 0 { first_dy } else { line_height };
                let _ = write!(out, r#"<tspan x="0" dy="{}">"#, fmt(dy));
                escape_xml_into(out, line);
                out.push_str("</tspan>");
            }
        }
        out.push_str("</text></g>");

        self.label_count += 1;
    }
}

/// Lays the pipeline over a fresh [`SvgSurface`] sized to the layout's surface.
pub fn render_svg(
    layout: &RadialLayout<'_>,
    measurer: &dyn TextMeasurer,
    options: &SvgRenderOptions,
) -> String {
    let surface_size = layout.surface();
    let mut surface = SvgSurface::new(
        surface_size.width,
        surface_size.height,
        options.clone(),
        measurer,
    );
    pipeline::render(&mut surface, layout);
    surface.finish()
}
