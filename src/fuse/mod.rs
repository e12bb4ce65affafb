//! The pure reconstruction stages.
//!
//! All three transforms are stateless functions over their inputs and are
//! safe to run concurrently for independent documents.

pub mod grid;
pub mod normalize;
pub mod overlay;

pub use grid::assemble;
pub use normalize::{normalize, NormalizeOptions, Origin, OriginHint};
pub use overlay::{attach_style, OverlayOptions};
