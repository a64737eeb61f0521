//! # Byoubu
//!
//! A retained-mode 2D widget toolkit with GPU-ready text layout.
//!
//! ## Overview
//!
//! `Byoubu` provides windows, buttons, labels, text inputs, progress bars
//! and graphs for real-time applications that already own a render context.
//! The heart of the crate is its text engine: labels are decoded, segmented
//! into words, word-wrapped and justified by [`text::layout`], then turned
//! into vertex and index buffers by [`text::compose`]. Widgets cache the
//! result and rebuild it lazily when text, font, size or DPI change.
//!
//! The toolkit draws through the [`RenderBackend`] trait and never touches
//! a graphics API directly; the embedding application implements the trait
//! over its own context and feeds normalised cursor and keyboard events to
//! the [`Gui`] root.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use byoubu::{Gui, NullBackend, Font, ColourSet};
//! use byoubu::widget::Button;
//! use byoubu::geometry::{Point, Size};
//!
//! // 1. Create the gui root and give it a font
//! let mut gui = Gui::new();
//! # let font_bytes: Vec<u8> = vec![];
//! let font = Font::from_bytes("sans", &font_bytes, 14.0).unwrap();
//! gui.add_font(font);
//!
//! // 2. Build the widget tree
//! gui.add(Button::new(
//!     ColourSet::default(),
//!     "Click me",
//!     None,
//!     None,
//!     Size::new(120.0, 32.0),
//!     Point::new(20.0, 20.0),
//! ));
//!
//! // 3. Feed input and render every frame through your backend
//! let mut backend = NullBackend::new();
//! gui.set_cursor_position(Point::new(0.0, 0.0));
//! gui.render(&mut backend);
//! ```
//!
//! ## Features
//!
//! *   **Unicode-aware layout**: word segmentation, greedy wrap,
//!     justification and kerning-aware pen advancement.
//! *   **Injected rendering**: one small backend trait, no global state.
//! *   **Thread safety**: label arrangement is pure CPU work behind its own
//!     lock and can run off the render thread.

pub mod atlas;
pub mod colour;
pub mod font;
pub mod geometry;
pub mod gui;
pub mod layout_rules;
pub mod render;
pub mod text;
pub mod widget;

// common re-exports
pub use colour::{ColourGroup, ColourSet};
pub use font::{Font, FontSet};
pub use geometry::Rgba;
pub use gui::Gui;
pub use layout_rules::LayoutRule;
pub use render::{NullBackend, PrimitiveMode, RenderBackend};
pub use widget::Widget;

// re-export dependencies
pub use euclid;
pub use fontdue;
pub use parking_lot;
