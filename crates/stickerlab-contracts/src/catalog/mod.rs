//! Static reference data: brands, styles, shapes, print sizes and prompt
//! templates. Lookups are keyed by closed enums and resolve unknown ids to a
//! documented default entry.

mod brands;
mod shapes;
mod sizes;
mod styles;
mod templates;

pub use brands::{BrandId, BrandProfile, BRANDS};
pub use shapes::{ShapeId, StickerShape, SHAPES};
pub use sizes::{
    default_print_size, find_print_size, print_size_or_default, AspectRatio, PrintSize,
    DEFAULT_PRINT_SIZE_LABEL, PRINT_SIZES,
};
pub use styles::{StickerStyle, StyleId, STYLES};
pub use templates::{find_template, StickerTemplate, TemplateCategory, TEMPLATES};
