//! File outputs: the packed print sheet and single-sticker downloads.

use std::io::{BufWriter, Cursor};

use anyhow::anyhow;
use image::{DynamicImage, GenericImageView, ImageFormat};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Px, Rgb,
};
use stickerlab_contracts::records::GeneratedSticker;

use crate::error::{StickerError, StickerResult};
use crate::imaging::{decode_data_uri, encode_jpeg, flatten_on_white};
use crate::packer::{pack, size_for_label, PageFormat, Placement};

const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;
const EXPORT_JPEG_QUALITY: u8 = 95;
const EXPORT_PDF_MARGIN_MM: f32 = 20.0;
const EXPORT_PDF_FONT_SIZE: f32 = 16.0;
const SVG_CANVAS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
    Svg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Pdf,
        ExportFormat::Svg,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "pdf" => Some(ExportFormat::Pdf),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

pub fn export_filename(sticker: &GeneratedSticker, format: ExportFormat, stamp_ms: i64) -> String {
    format!(
        "social_media_gen_{}_{stamp_ms}.{}",
        sticker.brand_id.as_str(),
        format.extension()
    )
}

pub fn print_sheet_filename(format: PageFormat, stamp_ms: i64) -> String {
    format!("print_sheet_{}_{stamp_ms}.pdf", format.as_str())
}

pub fn export_sticker(sticker: &GeneratedSticker, format: ExportFormat) -> StickerResult<Vec<u8>> {
    match format {
        ExportFormat::Png => {
            let image = decode_data_uri(&sticker.image_url)?;
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|err| StickerError::InvalidImage(err.to_string()))?;
            Ok(bytes)
        }
        ExportFormat::Jpeg => {
            let image = decode_data_uri(&sticker.image_url)?;
            encode_jpeg(&flatten_on_white(&image), EXPORT_JPEG_QUALITY)
        }
        ExportFormat::Pdf => render_single_pdf(sticker),
        ExportFormat::Svg => Ok(svg_wrapper(&sticker.image_url).into_bytes()),
    }
}

/// Raster wrapped in a fixed-size SVG container; not a vectorization.
pub fn svg_wrapper(image_url: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_CANVAS}\" height=\"{SVG_CANVAS}\" viewBox=\"0 0 {SVG_CANVAS} {SVG_CANVAS}\">\n  <image href=\"{image_url}\" width=\"{SVG_CANVAS}\" height=\"{SVG_CANVAS}\" />\n</svg>"
    )
}

/// Lays the queue out with [`pack`] and draws each image at its physical
/// print size with a light grey boundary.
pub fn render_print_sheet(
    stickers: &[GeneratedSticker],
    format: PageFormat,
) -> StickerResult<Vec<u8>> {
    if stickers.is_empty() {
        return Err(StickerError::EmptyPrintQueue);
    }
    let sizes: Vec<_> = stickers
        .iter()
        .map(|sticker| size_for_label(sticker.size_label.as_deref()))
        .collect();
    let pages = pack(&sizes, format);
    let page_size = format.size_mm();
    let (page_w, page_h) = (page_size.width as f32, page_size.height as f32);

    let title = format!("Print sheet {}", format.as_str().to_ascii_uppercase());
    let (doc, first_page, first_layer) = PdfDocument::new(
        title.as_str(),
        Mm(page_w),
        Mm(page_h),
        "Layer 1",
    );
    for (page_idx, page) in pages.iter().enumerate() {
        let layer = if page_idx == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_ref, layer_ref) = doc.add_page(Mm(page_w), Mm(page_h), "Layer 1");
            doc.get_page(page_ref).get_layer(layer_ref)
        };
        for placement in &page.placements {
            let image = decode_data_uri(&stickers[placement.index].image_url)?;
            draw_placement(&layer, &image, placement, page_h);
        }
    }
    save_pdf(doc)
}

fn draw_placement(
    layer: &PdfLayerReference,
    image: &DynamicImage,
    placement: &Placement,
    page_h: f32,
) {
    let x = placement.x_mm as f32;
    let w = placement.width_mm as f32;
    let h = placement.height_mm as f32;
    // PDF space grows upward from the bottom-left corner.
    let bottom = page_h - placement.y_mm as f32 - h;

    place_image(layer, image, x, bottom, w, h);

    let grey = 200.0 / 255.0;
    layer.set_outline_color(Color::Rgb(Rgb::new(grey, grey, grey, None)));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(bottom)), false),
            (Point::new(Mm(x + w), Mm(bottom)), false),
            (Point::new(Mm(x + w), Mm(bottom + h)), false),
            (Point::new(Mm(x), Mm(bottom + h)), false),
        ],
        is_closed: true,
    });
}

/// Draws `image` stretched to `w` x `h` millimetres with its bottom-left
/// corner at (`x`, `bottom`).
fn place_image(
    layer: &PdfLayerReference,
    image: &DynamicImage,
    x: f32,
    bottom: f32,
    w: f32,
    h: f32,
) {
    let (px_w, px_h) = image.dimensions();
    let natural_w = px_w as f32 * MM_PER_INCH / IMAGE_DPI;
    let natural_h = px_h as f32 * MM_PER_INCH / IMAGE_DPI;
    let pixels = flatten_on_white(image);

    Image::from(ImageXObject {
        width: Px(px_w as usize),
        height: Px(px_h as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: pixels.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    })
    .add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(bottom)),
            scale_x: Some(w / natural_w),
            scale_y: Some(h / natural_h),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

/// A4 page with a caption, the image at page width minus margins and the
/// generation date underneath.
fn render_single_pdf(sticker: &GeneratedSticker) -> StickerResult<Vec<u8>> {
    let image = decode_data_uri(&sticker.image_url)?;
    let page = PageFormat::A4.size_mm();
    let (page_w, page_h) = (page.width as f32, page.height as f32);
    let margin = EXPORT_PDF_MARGIN_MM;

    let title = format!("Social Media Bild {}", sticker.brand_id.as_str());
    let (doc, page_ref, layer_ref) = PdfDocument::new(
        title.as_str(),
        Mm(page_w),
        Mm(page_h),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| anyhow!("pdf font setup failed: {err}"))?;
    let layer = doc.get_page(page_ref).get_layer(layer_ref);

    let (px_w, px_h) = image.dimensions();
    let width = page_w - margin * 2.0;
    let height = px_h as f32 * width / px_w.max(1) as f32;

    layer.use_text(
        format!("Social Media Bild: {}", sticker.brand_id.as_str()),
        EXPORT_PDF_FONT_SIZE,
        Mm(margin),
        Mm(page_h - margin),
        &font,
    );
    place_image(&layer, &image, margin, page_h - (margin + 10.0) - height, width, height);
    layer.use_text(
        format!("Generated: {}", generation_date(sticker.timestamp)),
        EXPORT_PDF_FONT_SIZE,
        Mm(margin),
        Mm(page_h - (margin + height + 20.0)),
        &font,
    );
    save_pdf(doc)
}

fn generation_date(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|stamp| stamp.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

fn save_pdf(doc: PdfDocumentReference) -> StickerResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut writer = BufWriter::new(Cursor::new(&mut bytes));
        doc.save(&mut writer)
            .map_err(|err| anyhow!("pdf write failed: {err}"))?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use image::{Rgba, RgbaImage};
    use stickerlab_contracts::catalog::{AspectRatio, BrandId, StyleId};
    use stickerlab_contracts::data_uri::DataUri;

    use super::*;

    fn png_uri(width: u32, height: u32, alpha: u8) -> Result<String> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([239, 68, 68, alpha])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(DataUri::from_bytes("image/png", &bytes).to_string())
    }

    fn sticker(size_label: Option<&str>) -> Result<GeneratedSticker> {
        Ok(GeneratedSticker {
            id: "s-1".to_string(),
            image_url: png_uri(32, 32, 255)?,
            prompt: "Teufel jagt Adler".to_string(),
            timestamp: 1_700_000_000_000,
            brand_id: BrandId::RedDevils,
            style_id: StyleId::Vector,
            shape_id: None,
            enhanced_prompt: None,
            aspect_ratio: Some(AspectRatio::Square),
            size_label: size_label.map(str::to_string),
        })
    }

    #[test]
    fn filenames_carry_brand_format_and_stamp() -> Result<()> {
        let sticker = sticker(None)?;
        assert_eq!(
            export_filename(&sticker, ExportFormat::Jpeg, 42),
            "social_media_gen_RED_DEVILS_42.jpg"
        );
        assert_eq!(print_sheet_filename(PageFormat::A3, 42), "print_sheet_a3_42.pdf");
        Ok(())
    }

    #[test]
    fn empty_queue_produces_no_document() {
        assert!(matches!(
            render_print_sheet(&[], PageFormat::A4),
            Err(StickerError::EmptyPrintQueue)
        ));
    }

    #[test]
    fn print_sheet_is_a_pdf() -> Result<()> {
        let queue = vec![
            sticker(Some("Quadrat"))?,
            sticker(Some("Kreis"))?,
            sticker(Some("unknown size"))?,
        ];
        let bytes = render_print_sheet(&queue, PageFormat::A4)?;
        assert!(bytes.starts_with(b"%PDF-"));
        Ok(())
    }

    #[test]
    fn print_sheet_rejects_broken_images() -> Result<()> {
        let mut broken = sticker(Some("Quadrat"))?;
        broken.image_url = "https://example.com/not-inline.png".to_string();
        assert!(matches!(
            render_print_sheet(&[broken], PageFormat::A4),
            Err(StickerError::InvalidImage(_))
        ));
        Ok(())
    }

    #[test]
    fn jpeg_export_flattens_transparency_on_white() -> Result<()> {
        let mut clear = sticker(None)?;
        clear.image_url = png_uri(8, 8, 0)?;
        let bytes = export_sticker(&clear, ExportFormat::Jpeg)?;
        let decoded = image::load_from_memory(&bytes)?.to_rgb8();
        let pixel = decoded.get_pixel(4, 4);
        assert!(pixel.0.iter().all(|channel| *channel > 245));
        Ok(())
    }

    #[test]
    fn png_and_pdf_exports_are_well_formed() -> Result<()> {
        let sticker = sticker(None)?;
        let png = export_sticker(&sticker, ExportFormat::Png)?;
        assert_eq!(image::guess_format(&png)?, ImageFormat::Png);
        let pdf = export_sticker(&sticker, ExportFormat::Pdf)?;
        assert!(pdf.starts_with(b"%PDF-"));
        Ok(())
    }

    #[test]
    fn svg_wraps_the_data_uri_in_a_fixed_canvas() -> Result<()> {
        let sticker = sticker(None)?;
        let svg = String::from_utf8(export_sticker(&sticker, ExportFormat::Svg)?)?;
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1024\" height=\"1024\""));
        assert!(svg.contains(&format!("<image href=\"{}\"", sticker.image_url)));
        Ok(())
    }

    #[test]
    fn generation_date_uses_day_month_year() {
        assert_eq!(generation_date(1_700_000_000_000), "14.11.2023");
    }
}
