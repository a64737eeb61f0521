//! The injected rendering seam.
//!
//! The toolkit never talks to a graphics API directly: all GPU traffic goes
//! through the [`RenderBackend`] trait, implemented by the embedding
//! application over whatever context it owns. The trait is deliberately
//! small: buffer create/upload/draw/destroy, one atlas upload, and a few
//! environment queries. When [`is_active`](RenderBackend::is_active) reports
//! false every upload path returns early without touching cached state, so
//! widgets can be built and laid out before a context exists.

use bytemuck::{Pod, Zeroable};

use crate::geometry::{Point, Rgba, Size};

/// One vertex as uploaded to the backend: screen coords plus atlas
/// texcoords, both already in final device form.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub coords: [f32; 2],
    pub texcoords: [f32; 2],
}

impl Vertex {
    pub const fn new(coords: [f32; 2], texcoords: [f32; 2]) -> Self {
        Self { coords, texcoords }
    }
}

/// How glyph quads are emitted into index buffers.
///
/// `Quads` emits 4 indices per glyph for backends with native quad
/// primitives; `Triangles` emits 6 for backends without them. Both describe
/// the same 4 vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    #[default]
    Quads,
    Triangles,
}

impl PrimitiveMode {
    /// Indices emitted per glyph quad.
    pub const fn indices_per_quad(self) -> usize {
        match self {
            PrimitiveMode::Quads => 4,
            PrimitiveMode::Triangles => 6,
        }
    }

    /// The draw mode matching this index layout.
    pub const fn draw_mode(self) -> DrawMode {
        match self {
            PrimitiveMode::Quads => DrawMode::Quads,
            PrimitiveMode::Triangles => DrawMode::Triangles,
        }
    }
}

/// Primitive types the widgets draw with, mapping one-to-one onto the
/// immediate-mode primitives of the underlying API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    TriangleFan,
    LineLoop,
    LineStrip,
    Lines,
    Quads,
    Triangles,
}

/// Handle to one vertex+index buffer pair owned by a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// The rendering context injected into the widget tree.
pub trait RenderBackend {
    /// Whether a valid graphics context is currently active. All upload and
    /// draw paths no-op safely when this is false.
    fn is_active(&self) -> bool;

    /// Current window size in pixels.
    fn window_size(&self) -> Size;

    /// Largest texture edge length the hardware supports; the ceiling for
    /// atlas growth.
    fn max_texture_size(&self) -> u32;

    /// Map absolute pixel coordinates to normalised device coordinates.
    ///
    /// The default maps the window rectangle onto [-1, 1] on both axes;
    /// backends with their own projection can override it.
    fn coord_transform(&self, point: Point) -> [f32; 2] {
        let window = self.window_size();
        [
            (point.x * 2.0 / window.width) - 1.0,
            (point.y * 2.0 / window.height) - 1.0,
        ]
    }

    fn create_buffer(&mut self) -> BufferId;
    fn upload_buffer(&mut self, id: BufferId, vertices: &[Vertex], indices: &[u32]);
    fn draw_buffer(&mut self, id: BufferId, mode: DrawMode, index_count: u32, colour: Rgba);
    fn destroy_buffer(&mut self, id: BufferId);

    /// Replace the glyph atlas texture: a `size` x `size` single-channel
    /// alpha image.
    fn upload_atlas(&mut self, size: u32, pixels: &[u8]);
}

/// A backend that renders nothing.
///
/// Useful for headless layout work and for driving the widget tree in
/// tests: buffers are allocated and counted but uploads and draws are
/// discarded.
pub struct NullBackend {
    active: bool,
    window_size: Size,
    max_texture_size: u32,
    next_buffer: u32,
    live_buffers: u32,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            active: true,
            window_size: Size::new(800.0, 600.0),
            max_texture_size: 2048,
            next_buffer: 0,
            live_buffers: 0,
        }
    }

    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Self::new()
        }
    }

    pub fn set_window_size(&mut self, size: Size) {
        self.window_size = size;
    }

    pub fn set_max_texture_size(&mut self, size: u32) {
        self.max_texture_size = size;
    }

    /// Number of buffers created and not yet destroyed.
    pub fn live_buffers(&self) -> u32 {
        self.live_buffers
    }
}

impl RenderBackend for NullBackend {
    fn is_active(&self) -> bool {
        self.active
    }

    fn window_size(&self) -> Size {
        self.window_size
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.live_buffers += 1;
        id
    }

    fn upload_buffer(&mut self, _id: BufferId, _vertices: &[Vertex], _indices: &[u32]) {}

    fn draw_buffer(&mut self, _id: BufferId, _mode: DrawMode, _index_count: u32, _colour: Rgba) {}

    fn destroy_buffer(&mut self, _id: BufferId) {
        self.live_buffers = self.live_buffers.saturating_sub(1);
    }

    fn upload_atlas(&mut self, _size: u32, _pixels: &[u8]) {}
}
