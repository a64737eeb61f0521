//! From arranged lines to GPU-ready vertex and index buffers.
//!
//! Composition walks the [`Arrangement`](crate::text::Arrangement) with a
//! running pen: kerning is applied against the previous code point (reset at
//! the start of each line), blank glyphs advance the pen without emitting
//! geometry, and every visible glyph becomes one textured quad. The pen
//! starts at an alignment origin computed from the widget's absolute
//! position, size and label margin.
//!
//! Coordinates in the emitted mesh are absolute pixels; the backend's
//! coordinate transform is applied at upload time.

use crate::font::{FontMetrics, GlyphArena};
use crate::geometry::{Point, Size, Vector};
use crate::render::{PrimitiveMode, Vertex};
use crate::text::Arrangement;

/// Where the label block sits inside the widget rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Centre,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Compute the pen origin for a label.
///
/// The origin is the baseline start of the first line. Top alignment hangs
/// that baseline one ascender below the inner top edge, bottom alignment
/// stacks the whole block above the inner bottom edge, and the centre
/// variants take the midpoint of the two.
pub fn alignment_origin(
    alignment: Alignment,
    position: Point,
    size: Size,
    margin: Vector,
    label_size: Size,
    metrics: &FontMetrics,
) -> Point {
    use Alignment::*;

    let left = position.x + margin.x;
    let right = position.x + size.width - margin.x - label_size.width;
    let top = position.y + size.height - margin.y - metrics.ascender;
    let bottom = position.y + margin.y + label_size.height;

    let x = match alignment {
        Left | TopLeft | BottomLeft => left,
        Right | TopRight | BottomRight => right,
        Centre | Top | Bottom => position.x + (size.width - label_size.width) / 2.0,
    };
    let y = match alignment {
        Top | TopLeft | TopRight => top,
        Bottom | BottomLeft | BottomRight => bottom,
        Centre | Left | Right => (top + bottom) / 2.0,
    };
    Point::new(x, y)
}

/// A flat vertex array plus its matching index array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// An empty mesh must never be uploaded; callers detect and skip it.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Emit one quad per visible glyph of an arranged label.
///
/// The vertex buffer holds exactly four vertices per visible glyph and the
/// index buffer four or six indices per glyph depending on `mode`; both
/// counts are identical whichever primitive layout is selected.
pub fn compose(
    arrangement: &Arrangement,
    arena: &GlyphArena,
    origin: Point,
    mode: PrimitiveMode,
) -> Mesh {
    let mut vertices = Vec::with_capacity(arrangement.visible_glyphs * 4);
    let mut indices = Vec::with_capacity(arrangement.visible_glyphs * mode.indices_per_quad());

    let mut pen = origin;
    for line in &arrangement.lines {
        let mut previous = '\0'; // kerning resets at the start of each line
        for word in &line.words {
            for &ix in &word.glyphs {
                let glyph = arena.glyph(ix);
                pen.x += glyph.kerning(previous);
                previous = glyph.codepoint;

                if !glyph.blank {
                    let base = vertices.len() as u32;
                    let x0 = pen.x + glyph.offset.x;
                    let y0 = pen.y + glyph.offset.y;
                    let x1 = x0 + glyph.size.width;
                    let y1 = y0 + glyph.size.height;
                    let [u0, v0] = glyph.texcoord0;
                    let [u1, v1] = glyph.texcoord1;
                    vertices.push(Vertex::new([x0, y0], [u0, v0]));
                    vertices.push(Vertex::new([x1, y0], [u1, v0]));
                    vertices.push(Vertex::new([x1, y1], [u1, v1]));
                    vertices.push(Vertex::new([x0, y1], [u0, v1]));
                    match mode {
                        PrimitiveMode::Quads => {
                            indices.extend([base, base + 1, base + 2, base + 3]);
                        }
                        PrimitiveMode::Triangles => {
                            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
                        }
                    }
                }
                pen += glyph.advance;
            }
            pen.x += line.spacing; // justification inter-word space expansion
        }
        pen.x = origin.x; // carriage return
        pen.y -= arrangement.line_spacing; // line feed
    }

    Mesh { vertices, indices }
}

/// Screen coordinate of the pen after the `cursor`th glyph of a label.
///
/// Walks the same line/word/glyph structure with the same kerning and
/// justification pen advancement as [`compose`]; text input widgets use it
/// to place their cursor.
pub fn cursor_position(
    arrangement: &Arrangement,
    arena: &GlyphArena,
    origin: Point,
    cursor: usize,
) -> Point {
    let mut pen = origin;
    if cursor == 0 {
        return pen; // cursor sits at the origin at string start
    }
    let mut position = 0usize;
    for line in &arrangement.lines {
        let mut previous = '\0';
        for word in &line.words {
            for &ix in &word.glyphs {
                let glyph = arena.glyph(ix);
                pen.x += glyph.kerning(previous);
                previous = glyph.codepoint;
                pen += glyph.advance;
                position += 1;
                if cursor == position {
                    return pen;
                }
            }
            pen.x += line.spacing;
        }
        pen.x = origin.x;
        pen.y -= arrangement.line_spacing;
    }
    pen
}
