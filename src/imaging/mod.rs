//! Image processing in pure Rust: decoding and resampling via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image::load_from_memory`, PNG encoder |
//! | **Autocrop** | alpha bounding box + `crop_imm` |
//! | **Resize + pad** | Lanczos3 `resize_exact` onto a transparent canvas |
//! | **Background** | `palette` color names, straight-alpha "over", flatten |
//! | **Background removal** | [`BackgroundRemover`] (external command or key color) |
//!
//! The module is split into:
//! - **Calculations**: Pure geometry (unit testable, no pixels moved)
//! - **Parameters**: Data structures describing sizes and boxes
//! - **Compose / Background**: Layer building and alpha compositing
//! - **Backend**: [`BackgroundRemover`] trait + concrete removers
//! - **Operations**: One function per pipeline stage

pub mod backend;
pub mod background;
mod calculations;
mod compose;
pub mod operations;
mod params;
pub mod remover;

pub use backend::{BackgroundRemover, RemoverError};
pub use background::{
    BackgroundSpec, DEFAULT_FALLBACK, ResolvedBackground, parse_color, resolve_background,
};
pub use calculations::{autocrop_box, centered_offset, content_size, fit_within};
pub use compose::{composite_over, flatten, resize_premultiplied};
pub use operations::{
    OperationError, add_background, autocrop, encode_png, remove_background, resize_and_pad,
};
pub use params::{BoundingBox, Dimensions, ResizeSpec};
pub use remover::{CommandRemover, KeyColorRemover};
