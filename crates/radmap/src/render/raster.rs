#![forbid(unsafe_code)]

use crate::render::{HeadlessError, RenderOptions, layout_and_render_svg};
use radmap_core::MindMapDocument;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("SVG has no usable viewBox")]
    MissingViewBox,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color: {0}")]
    InvalidBackground(String),
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

pub fn render_png(
    document: &MindMapDocument,
    options: &RenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    let svg = layout_and_render_svg(document, options)?;
    svg_to_png(&svg, raster)
}

pub fn render_jpeg(
    document: &MindMapDocument,
    options: &RenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    let svg = layout_and_render_svg(document, options)?;
    svg_to_jpeg(&svg, raster)
}

pub fn render_pdf(document: &MindMapDocument, options: &RenderOptions) -> Result<Vec<u8>> {
    let svg = layout_and_render_svg(document, options)?;
    svg_to_pdf(&svg)
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let Some(color) = parse_tiny_skia_color(bg) else {
        return Err(RasterError::InvalidBackground(bg.to_string()));
    };
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // The background is opaque, so every pixel has alpha 255 and RGBA -> RGB just drops it.
    let mut rgb = Vec::with_capacity((w as usize) * (h as usize) * 3);
    for px in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

fn parse_svg_viewbox(svg: &str) -> Option<(f32, f32)> {
    // Non-validating read of the root `viewBox="minX minY w h"`; our own output always has one.
    let i = svg.find("viewBox=\"")?;
    let rest = &svg[i + "viewBox=\"".len()..];
    let end = rest.find('"')?;
    let mut it = rest[..end].split_whitespace();
    let _min_x = it.next()?.parse::<f32>().ok()?;
    let _min_y = it.next()?.parse::<f32>().ok()?;
    let width = it.next()?.parse::<f32>().ok()?;
    let height = it.next()?.parse::<f32>().ok()?;
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then_some((width, height))
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    // Labels ask for a sans-serif stack; which system font wins varies by machine.
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    let (width, height) = parse_svg_viewbox(svg).ok_or(RasterError::MissingViewBox)?;

    let width_px = (width * scale).ceil().max(1.0) as u32;
    let height_px = (height * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(bg) = background {
        let color = parse_tiny_skia_color(bg)
            .ok_or_else(|| RasterError::InvalidBackground(bg.to_string()))?;
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let digit = |c: u8| (c as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let channels: Vec<u8> = match bytes.len() {
        3 | 4 => bytes
            .iter()
            .map(|&c| digit(c).map(|v| (v << 4) | v))
            .collect::<Option<_>>()?,
        6 | 8 => bytes
            .chunks_exact(2)
            .map(|p| Some((digit(p[0])? << 4) | digit(p[1])?))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use radmap_core::TreeNode;

    fn doc() -> MindMapDocument {
        MindMapDocument::new(TreeNode::with_children(
            "root",
            vec![TreeNode::leaf("a"), TreeNode::leaf("b")],
        ))
    }

    #[test]
    fn png_has_signature_and_surface_size() {
        let bytes = render_png(&doc(), &RenderOptions::default(), &RasterOptions::default())
            .unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        // IHDR width/height follow the 8-byte signature + 8-byte chunk header.
        let w = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let h = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert_eq!((w, h), (800, 600));
    }

    #[test]
    fn jpeg_requires_opaque_background() {
        let raster = RasterOptions {
            background: Some("transparent".to_string()),
            ..Default::default()
        };
        let err = render_jpeg(&doc(), &RenderOptions::default(), &raster).unwrap_err();
        assert!(matches!(err, RasterError::JpegOpaqueBackgroundRequired));

        let bytes = render_jpeg(&doc(), &RenderOptions::default(), &RasterOptions::default())
            .unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn pdf_has_signature() {
        let bytes = render_pdf(&doc(), &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn parses_css_colors() {
        let c = parse_tiny_skia_color("#fff").unwrap();
        assert_eq!(c.alpha(), 1.0);
        let c = parse_tiny_skia_color("#00000080").unwrap();
        assert!(c.alpha() < 1.0);
        assert!(parse_tiny_skia_color("#12345").is_none());
        assert!(parse_tiny_skia_color("nope").is_none());
    }

    #[test]
    fn control_character_labels_rasterize() {
        let doc = MindMapDocument::new(TreeNode::with_children(
            "bell\u{7}x",
            vec![TreeNode::leaf("form\u{C}feed")],
        ));
        let bytes = render_png(&doc, &RenderOptions::default(), &RasterOptions::default())
            .unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let bytes = render_pdf(&doc, &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn invalid_background_is_reported() {
        let raster = RasterOptions {
            background: Some("#zzz".to_string()),
            ..Default::default()
        };
        let err = render_png(&doc(), &RenderOptions::default(), &raster).unwrap_err();
        assert!(matches!(err, RasterError::InvalidBackground(_)));
    }
}
