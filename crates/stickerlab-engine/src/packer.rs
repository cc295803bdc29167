//! First-fit shelf packing of print-queue items onto fixed-size pages.
//! Items keep their queue order and are never rotated.

use stickerlab_contracts::catalog::print_size_or_default;

pub const SHEET_MARGIN_MM: f64 = 10.0;
pub const SHEET_SPACING_MM: f64 = 5.0;
/// Used when a dimension label carries no number at all.
pub const FALLBACK_SIZE_MM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeMm {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageFormat {
    A4,
    A3,
}

impl PageFormat {
    pub const ALL: [PageFormat; 2] = [PageFormat::A4, PageFormat::A3];

    /// Portrait dimensions.
    pub fn size_mm(self) -> SizeMm {
        match self {
            PageFormat::A4 => SizeMm {
                width: 210.0,
                height: 297.0,
            },
            PageFormat::A3 => SizeMm {
                width: 297.0,
                height: 420.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::A4 => "a4",
            PageFormat::A3 => "a3",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
    }
}

/// Physical slot of one queue item on a page, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position in the input slice.
    pub index: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetPage {
    pub placements: Vec<Placement>,
}

/// Parses labels like `"9,5 x 9,5 cm"` or `"⌀ 9,5 cm"` into millimetres.
/// One number means a square; no number means the fallback size.
pub fn parse_dimensions_mm(dim: &str) -> SizeMm {
    let clean: String = dim
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    let numbers: Vec<f64> = clean
        .split(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .collect();

    match numbers.as_slice() {
        [] => SizeMm {
            width: FALLBACK_SIZE_MM,
            height: FALLBACK_SIZE_MM,
        },
        [side] => SizeMm {
            width: side * 10.0,
            height: side * 10.0,
        },
        [width, height, ..] => SizeMm {
            width: width * 10.0,
            height: height * 10.0,
        },
    }
}

/// Physical size of a stored size label; unknown or missing labels resolve
/// to the square default.
pub fn size_for_label(label: Option<&str>) -> SizeMm {
    parse_dimensions_mm(print_size_or_default(label).dim)
}

pub fn pack(sizes: &[SizeMm], format: PageFormat) -> Vec<SheetPage> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let page = format.size_mm();
    let right_edge = page.width - SHEET_MARGIN_MM;
    let bottom_edge = page.height - SHEET_MARGIN_MM;

    let mut pages = vec![SheetPage::default()];
    let mut x = SHEET_MARGIN_MM;
    let mut y = SHEET_MARGIN_MM;
    let mut row_height: f64 = 0.0;

    for (index, size) in sizes.iter().enumerate() {
        if x + size.width > right_edge {
            x = SHEET_MARGIN_MM;
            y += row_height + SHEET_SPACING_MM;
            row_height = 0.0;
        }

        let page_has_items = pages
            .last()
            .map(|current| !current.placements.is_empty())
            .unwrap_or(false);
        if y + size.height > bottom_edge && page_has_items {
            pages.push(SheetPage::default());
            x = SHEET_MARGIN_MM;
            y = SHEET_MARGIN_MM;
            row_height = 0.0;
        }

        if let Some(current) = pages.last_mut() {
            current.placements.push(Placement {
                index,
                x_mm: x,
                y_mm: y,
                width_mm: size.width,
                height_mm: size.height,
            });
        }
        x += size.width + SHEET_SPACING_MM;
        row_height = row_height.max(size.height);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rect(width: f64, height: f64) -> SizeMm {
        SizeMm { width, height }
    }

    fn square(side: f64) -> SizeMm {
        SizeMm {
            width: side,
            height: side,
        }
    }

    #[test]
    fn parses_catalog_dimension_labels() {
        let quadrat = parse_dimensions_mm("9,5 x 9,5 cm");
        assert!(close(quadrat.width, 95.0) && close(quadrat.height, 95.0));
        let kreis = parse_dimensions_mm("⌀ 9,5 cm");
        assert!(close(kreis.width, 95.0) && close(kreis.height, 95.0));
        let a4 = parse_dimensions_mm("21,0 x 29,7 cm");
        assert!(close(a4.width, 210.0) && close(a4.height, 297.0));
        assert_eq!(parse_dimensions_mm("groß"), square(100.0));
        assert_eq!(parse_dimensions_mm(". x ."), square(100.0));
    }

    #[test]
    fn unknown_labels_fall_back_to_quadrat() {
        assert_eq!(size_for_label(None), square(95.0));
        assert_eq!(size_for_label(Some("Billboard")), square(95.0));
        let wide = size_for_label(Some("Ultra Wide"));
        assert!(close(wide.width, 200.0) && close(wide.height, 50.0));
    }

    #[test]
    fn three_quadrat_stickers_on_a4() {
        let pages = pack(&[square(95.0); 3], PageFormat::A4);
        assert_eq!(pages.len(), 2);

        let first = &pages[0].placements;
        assert_eq!(first.len(), 2);
        assert_eq!((first[0].x_mm, first[0].y_mm), (10.0, 10.0));
        // 110 + 95 overruns the 200mm right edge, so each row holds one item.
        assert_eq!((first[1].x_mm, first[1].y_mm), (10.0, 110.0));

        let second = &pages[1].placements;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].index, 2);
        assert_eq!((second[0].x_mm, second[0].y_mm), (10.0, 10.0));
    }

    #[test]
    fn small_items_share_rows_until_the_right_edge() {
        let pages = pack(&[square(50.0); 4], PageFormat::A4);
        assert_eq!(pages.len(), 1);
        let xs: Vec<f64> = pages[0].placements.iter().map(|p| p.x_mm).collect();
        assert_eq!(xs, [10.0, 65.0, 120.0, 10.0]);
        assert_eq!(pages[0].placements[3].y_mm, 65.0);
    }

    #[test]
    fn a3_fits_more_per_page() {
        let pages = pack(&[square(95.0); 3], PageFormat::A3);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].placements[1].x_mm, 110.0);
        assert_eq!(pages[0].placements[2].y_mm, 110.0);
    }

    #[test]
    fn oversized_item_on_a_fresh_page_does_not_leave_a_blank_page() {
        let pages = pack(&[rect(100.0, 400.0)], PageFormat::A4);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].placements.len(), 1);
    }

    #[test]
    fn rows_never_overflow_the_printable_width() {
        let sizes = [
            rect(70.0, 50.0),
            rect(74.0, 105.0),
            square(95.0),
            rect(148.0, 210.0),
            rect(70.0, 50.0),
        ];
        for format in PageFormat::ALL {
            let page = format.size_mm();
            for sheet in pack(&sizes, format) {
                for placement in sheet.placements {
                    assert!(placement.x_mm + placement.width_mm <= page.width - SHEET_MARGIN_MM);
                    assert!(placement.y_mm + placement.height_mm <= page.height - SHEET_MARGIN_MM);
                }
            }
        }
    }

    #[test]
    fn empty_queue_produces_no_pages() {
        assert!(pack(&[], PageFormat::A4).is_empty());
        assert_eq!(PageFormat::parse("A3"), Some(PageFormat::A3));
    }
}
