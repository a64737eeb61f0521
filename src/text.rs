/// The core text layout engine: decoding, word segmentation, word-wrap and
/// justification.
pub mod layout;

/// The glyph buffer composer: alignment origins and vertex/index emission.
pub mod compose;

pub use compose::{Alignment, Mesh, alignment_origin, compose, cursor_position};
pub use layout::{Arrangement, ArrangeOptions, DecodePolicy, Line, Word, arrange};
