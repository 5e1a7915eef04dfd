//! Clip composition: from a committed clip rectangle to a shareable raster.
//!
//! # Pipeline Order
//!
//! One composition run performs, strictly in order:
//! 1. Display-to-native coordinate mapping (`mapping`)
//! 2. Output surface allocation
//! 3. Top band fill, 4. top logo (`logo`)
//! 5. Cropped source draw
//! 6. Footer band fill, 7. footer logo
//! 8. Footer text overlay (`text`)
//! 9. PNG serialization
//!
//! # Coordinate System
//!
//! - Clip rectangles are display-space; crop regions are native-space
//! - Band heights and all overlay metrics are output (native) pixels

mod logo;
mod mapping;
mod pipeline;
mod settings;
mod text;

pub use logo::{fit_logo, logo_position, EDGE_MARGIN, MAX_HEIGHT_FRAC, MAX_WIDTH_FRAC};
pub use mapping::{scale_factors, to_native_crop, CropRegion};
pub use pipeline::{ComposeError, ComposeRequest, Composer, CompositionResult};
pub use settings::{
    parse_hex_color, BandConfig, CompositionSettings, DisplayOptions, LogoAlignment,
};
pub use text::{
    draw_footer_text, layout_footer, measure_text, text_color_for, FooterLayout,
    FOOTER_TEXT_SIZE,
};
