//! The shared widget core: geometry, colour state, label state, buffers and
//! the per-frame interaction state machine.
//!
//! Positions are stored in pixel space, relative to the immediate parent;
//! absolute positions are accumulated as an origin during tree traversal.
//! The DPI-scaled setters take logical coordinates and the gui root's scale,
//! the `_nodpiscale` variants bypass it.
//!
//! Label layout is cached and invalidated, never patched: any text, font or
//! size mutation clears the derived line list, and every geometry query
//! repairs the dirtiness by re-arranging first. The label state sits behind
//! its own lock so arrangement can run off the render thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::colour::{BLEND_ACTIVE, BLEND_FOCUS, BLEND_HOVER, BLEND_IDLE, ColourSet};
use crate::font::{Font, FontMetrics, FontSet, GlyphArena};
use crate::geometry::{
    DpiScale, LogicalPoint, LogicalSize, LogicalVector, Point, Rgba, Size, Vector,
};
use crate::layout_rules::LayoutRule;
use crate::render::{BufferId, DrawMode, PrimitiveMode, RenderBackend, Vertex};
use crate::text::{Alignment, Arrangement, ArrangeOptions, alignment_origin, arrange, compose};

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one widget, unique within the process.
///
/// The same widget is not guaranteed to receive the same id across program
/// runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    fn next() -> Self {
        Self(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-frame state handed down the tree during rendering.
pub struct FrameContext<'a> {
    pub dpi_scale: DpiScale,
    /// The widget currently under the pointer, from the frame's hit-test.
    pub picked: Option<WidgetId>,
    pub mouse_pressed: bool,
    /// One-frame edge flag raised when the mouse was released.
    pub mouse_released: bool,
    /// The input field currently selected for keyboard input.
    pub input_field: Option<WidgetId>,
    pub fonts: &'a FontSet,
    pub primitive_mode: PrimitiveMode,
}

/// Requests collected from widgets during a traversal.
#[derive(Default)]
pub struct FrameEvents {
    /// Input-selection request: `Some(None)` deselects the current input
    /// field, `Some(Some(id))` selects a new one. The last request of the
    /// frame wins.
    pub select_input: Option<Option<WidgetId>>,
}

/// What the interaction state machine observed this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEdge {
    None,
    /// Picked and held down; raised every frame of the press.
    Press,
    /// Picked and released this frame.
    Release,
}

/// Label content and everything derived from it.
struct LabelState {
    text: String,
    /// Derived lines and bounds; an empty line list marks the layout dirty.
    arrangement: Arrangement,
    /// Where the pen is reset to when drawing, from the last alignment pass.
    origin: Point,
}

struct Buffers {
    shape: BufferId,
    label: BufferId,
}

/// State shared by every widget kind.
pub struct WidgetCore {
    id: WidgetId,
    /// Whether to render this element.
    pub visible: bool,
    /// Whether it can take focus; non-focusable widgets skip hover and
    /// active states entirely.
    pub focusable: bool,
    /// Keyboard selection, independent of the pointer.
    pub focused: bool,
    mouseover: bool,
    active: bool,
    /// Whether the buffers are populated and ready to be rendered.
    initialised: bool,
    /// Whether this widget draws its outline and fill quad at all.
    shape: bool,

    /// Relative position to the parent, pixel space, lower-left corner.
    position: Point,
    size: Size,

    pub colours: ColourSet,

    /// The font chosen for the label; `None` falls back through the gui's
    /// default chain.
    pub label_font: Option<Arc<Font>>,
    pub label_alignment: Alignment,
    /// Distance of the label from the alignment edge.
    pub label_margin: Vector,
    pub label_options: ArrangeOptions,
    /// Stretch the widget vertically to fit the label when it is taller.
    pub label_stretch_vertical: bool,
    /// Shrink the widget vertically to fit the label when it is shorter.
    pub label_shrink_vertical: bool,
    label: RwLock<LabelState>,

    /// Layout rules applied in order by `update_layout`.
    pub layout_rules: Vec<LayoutRule>,

    buffers: Option<Buffers>,
    shape_indices: u32,
    label_indices: u32,
}

impl WidgetCore {
    pub fn new(
        colours: ColourSet,
        label: &str,
        label_font: Option<Arc<Font>>,
        size: Size,
        position: Point,
    ) -> Self {
        Self {
            id: WidgetId::next(),
            visible: true,
            focusable: false,
            focused: false,
            mouseover: false,
            active: false,
            initialised: false,
            shape: true,
            position,
            size,
            colours,
            label_font,
            label_alignment: Alignment::default(),
            label_margin: Vector::new(0.0, 0.0),
            label_options: ArrangeOptions::default(),
            label_stretch_vertical: false,
            label_shrink_vertical: false,
            label: RwLock::new(LabelState {
                text: label.to_owned(),
                arrangement: Arrangement::default(),
                origin: Point::zero(),
            }),
            layout_rules: Vec::new(),
            buffers: None,
            shape_indices: 0,
            label_indices: 0,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub(crate) fn set_shape(&mut self, shape: bool) {
        self.shape = shape;
    }
}

/// Visibility and interaction state queries.
impl WidgetCore {
    /// Make this element visible for rendering.
    pub fn show(&mut self) {
        self.visible = true;
    }
    /// Do not render this element.
    pub fn hide(&mut self) {
        self.visible = false;
    }
    /// Flip the rendering state of this element.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
    /// Whether it is currently being clicked or dragged.
    pub fn is_active(&self) -> bool {
        self.active
    }
    /// Whether the pointer is currently over it.
    pub fn is_mouseover(&self) -> bool {
        self.mouseover
    }
}

/// Geometry in both coordinate spaces.
impl WidgetCore {
    /// Update the position relative to the parent, in logical coordinates.
    pub fn set_position(&mut self, position: LogicalPoint, scale: DpiScale) {
        self.set_position_nodpiscale(position * scale);
    }

    /// Update the relative position in pixels, bypassing DPI scaling.
    pub fn set_position_nodpiscale(&mut self, position: Point) {
        self.position = position;
        self.refresh_position_only();
    }

    /// Update the size. Resizing changes the wrap width, so the label
    /// layout is invalidated along with the buffers.
    pub fn set_size(&mut self, size: LogicalSize, scale: DpiScale) {
        self.set_size_nodpiscale(size * scale);
    }

    pub fn set_size_nodpiscale(&mut self, size: Size) {
        self.size = size;
        self.refresh();
    }

    pub fn get_position(&self, scale: DpiScale) -> LogicalPoint {
        self.position / scale
    }

    pub fn get_position_nodpiscale(&self) -> Point {
        self.position
    }

    pub fn get_size(&self, scale: DpiScale) -> LogicalSize {
        self.size / scale
    }

    pub fn get_size_nodpiscale(&self) -> Size {
        self.size
    }

    /// Move relative to the existing position.
    pub fn move_by(&mut self, offset: LogicalVector, scale: DpiScale) {
        self.position += offset * scale;
        self.refresh_position_only();
    }

    /// Scale this element up by a specified increase.
    pub fn grow(&mut self, increase: LogicalSize, scale: DpiScale) {
        self.size += increase * scale;
        self.refresh();
    }

    /// Scale this element down by a specified decrease.
    pub fn shrink(&mut self, decrease: LogicalSize, scale: DpiScale) {
        self.size -= decrease * scale;
        self.refresh();
    }

    /// Scale this element by a factor in each direction.
    pub fn scale_by(&mut self, factor_x: f32, factor_y: f32) {
        self.size.width *= factor_x;
        self.size.height *= factor_y;
        self.refresh();
    }

    /// Absolute position given the accumulated parent origin.
    pub(crate) fn absolute_position(&self, origin: Point) -> Point {
        origin + self.position.to_vector()
    }

    /// Rectangle hit-test against the cursor.
    pub(crate) fn pick(&self, cursor: Point, origin: Point) -> Option<WidgetId> {
        if !self.visible {
            return None;
        }
        let absolute = self.absolute_position(origin);
        if cursor.x >= absolute.x
            && cursor.y >= absolute.y
            && cursor.x <= absolute.x + self.size.width
            && cursor.y <= absolute.y + self.size.height
        {
            Some(self.id)
        } else {
            None
        }
    }
}

/// Colour shortcuts.
impl WidgetCore {
    pub fn set_colours(&mut self, colours: ColourSet) {
        self.colours = colours;
    }

    /// Update the momentary colour, for initial colours and flash effects.
    pub fn set_colour(&mut self, background: Rgba, outline: Rgba, content: Rgba) {
        self.colours.current.assign(background, outline, content);
    }
}

/// Label content and derived layout.
impl WidgetCore {
    /// Current label text.
    ///
    /// Allocates a copy so no lock is held while the caller works with it.
    pub fn label(&self) -> String {
        self.label.read().text.clone()
    }

    /// Replace the label text; identical text is skipped entirely.
    pub fn set_label(&mut self, text: &str) {
        {
            let state = self.label.read();
            if state.text == text {
                return;
            }
        }
        self.label.write().text = text.to_owned();
        self.refresh();
    }

    /// Replace the label from raw bytes, decoded under the label's policy.
    ///
    /// Rejected bytes (strict mode) leave the current label untouched.
    pub fn set_label_bytes(&mut self, bytes: &[u8]) {
        if let Some(text) = self.label_options.decode.decode_bytes(bytes) {
            self.set_label(&text);
        }
    }

    /// Content size from the last arrangement, re-arranging first if the
    /// layout is dirty.
    pub fn label_size(&self, fonts: &FontSet) -> Size {
        self.arrange_label(fonts);
        self.label.read().arrangement.size
    }

    /// Explicit re-arrangement trigger; a no-op when the layout is clean.
    ///
    /// Pure CPU work, callable off the render thread. When the font's glyph
    /// cache has not been loaded yet the label stays dirty and is retried
    /// on the next pass rather than caching a layout of nothing.
    pub fn arrange_label(&self, fonts: &FontSet) {
        if self.label.read().arrangement.lines.is_empty() {
            let font = fonts.resolve(self.label_font.as_ref());
            if !font.loaded() {
                log::debug!("font {} not loaded yet, deferring label arrangement", font.name());
                return;
            }
            self.arrange_label_with(&font.arena(), &font.metrics());
        }
    }

    /// Arrangement against an explicit glyph arena.
    pub(crate) fn arrange_label_with(&self, arena: &GlyphArena, metrics: &FontMetrics) {
        let mut state = self.label.write();
        let content_width = self.size.width - self.label_margin.x * 2.0;
        state.arrangement = arrange(
            &state.text,
            arena,
            metrics,
            content_width,
            &self.label_options,
        );
    }

    /// Walk the arranged label with an explicit arena, for cursor queries.
    pub(crate) fn with_arrangement<R>(&self, f: impl FnOnce(&Arrangement, Point) -> R) -> R {
        let state = self.label.read();
        f(&state.arrangement, state.origin)
    }
}

/// Stretch and shrink helpers fitting the widget to its label.
impl WidgetCore {
    pub fn stretch_to_label(&mut self, fonts: &FontSet) {
        self.stretch_to_label_horizontally(fonts);
        self.stretch_to_label_vertically(fonts);
    }

    /// Expand the width to encompass the label contents plus margin.
    pub fn stretch_to_label_horizontally(&mut self, fonts: &FontSet) {
        let target = self.label_size(fonts).width + self.label_margin.x * 2.0;
        if target > self.size.width {
            self.size.width = target;
            self.refresh_position_only();
        }
    }

    /// Expand the height to encompass the label contents plus margin.
    pub fn stretch_to_label_vertically(&mut self, fonts: &FontSet) {
        let font = fonts.resolve(self.label_font.as_ref());
        let target =
            self.label_size(fonts).height + self.label_margin.y * 2.0 + font.metrics().height;
        if target > self.size.height {
            self.size.height = target;
            self.refresh_position_only();
        }
    }

    pub fn shrink_to_label(&mut self, fonts: &FontSet) {
        self.shrink_to_label_horizontally(fonts);
        self.shrink_to_label_vertically(fonts);
    }

    /// Shrink the width so it is no larger than the label plus margin.
    pub fn shrink_to_label_horizontally(&mut self, fonts: &FontSet) {
        let target = self.label_size(fonts).width + self.label_margin.x * 2.0;
        if target < self.size.width {
            self.size.width = target;
            self.refresh_position_only();
        }
    }

    /// Shrink the height so it is no larger than the label plus margin.
    pub fn shrink_to_label_vertically(&mut self, fonts: &FontSet) {
        let font = fonts.resolve(self.label_font.as_ref());
        let target =
            self.label_size(fonts).height + self.label_margin.y * 2.0 + font.metrics().height;
        if target < self.size.height {
            self.size.height = target;
            self.refresh_position_only();
        }
    }
}

/// Invalidation.
impl WidgetCore {
    /// Invalidate buffers and the derived label layout.
    pub fn refresh(&mut self) {
        self.initialised = false;
        let mut state = self.label.write();
        // clearing the line list marks the layout dirty
        state.arrangement = Arrangement::default();
    }

    /// Invalidate buffers only; the label layout stays valid.
    pub fn refresh_position_only(&mut self) {
        self.initialised = false;
    }
}

/// The per-frame interaction state machine.
impl WidgetCore {
    /// Advance colour state from the frame's pick and mouse state.
    ///
    /// Non-focusable widgets skip hover and active entirely but may still
    /// claim input selection on release; the default claim deselects the
    /// current input field, text inputs overwrite it with themselves.
    pub fn update(&mut self, ctx: &FrameContext, events: &mut FrameEvents) -> InteractionEdge {
        self.mouseover = false;
        self.active = false;
        let mut edge = InteractionEdge::None;
        if self.focusable {
            if ctx.picked == Some(self.id) {
                self.mouseover = true;
                if ctx.mouse_pressed {
                    self.active = true;
                    edge = InteractionEdge::Press;
                    self.colours.blend_to_active(BLEND_ACTIVE);
                } else {
                    if ctx.mouse_released {
                        edge = InteractionEdge::Release;
                        events.select_input = Some(None);
                    }
                    self.colours.blend_to_hover(BLEND_HOVER);
                }
            } else if self.focused {
                self.colours.blend_to_focus(BLEND_FOCUS);
            } else {
                self.colours.blend_to_idle(BLEND_IDLE);
            }
        } else {
            if ctx.picked == Some(self.id) && ctx.mouse_released {
                events.select_input = Some(None);
            }
            self.colours.blend_to_idle(BLEND_IDLE);
        }
        edge
    }
}

/// Buffer setup and drawing.
impl WidgetCore {
    pub(crate) fn is_ready(&self) -> bool {
        self.initialised
    }

    pub(crate) fn mark_ready(&mut self) {
        self.initialised = true;
    }

    fn ensure_buffers(&mut self, backend: &mut dyn RenderBackend) -> (BufferId, BufferId) {
        let buffers = self.buffers.get_or_insert_with(|| Buffers {
            shape: backend.create_buffer(),
            label: backend.create_buffer(),
        });
        (buffers.shape, buffers.label)
    }

    /// Upload arbitrary geometry into the shape buffer, transformed into
    /// device coordinates. Used by leaf widgets with non-quad shapes.
    pub(crate) fn upload_shape(
        &mut self,
        backend: &mut dyn RenderBackend,
        vertices: &[Vertex],
        indices: &[u32],
    ) {
        let (shape, _) = self.ensure_buffers(backend);
        let transformed: Vec<Vertex> = vertices
            .iter()
            .map(|v| Vertex::new(
                backend.coord_transform(Point::new(v.coords[0], v.coords[1])),
                v.texcoords,
            ))
            .collect();
        self.shape_indices = indices.len() as u32;
        backend.upload_buffer(shape, &transformed, indices);
    }

    /// Rebuild buffers if they are stale. Returns early without touching
    /// cached state when no graphics context is active.
    pub(crate) fn prepare(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
    ) {
        if self.initialised || !backend.is_active() {
            return;
        }
        if self.shape {
            let absolute = self.absolute_position(origin);
            let quad = quad_vertices(absolute, self.size);
            self.upload_shape(backend, &quad, &[0, 1, 2, 3]);
        } else {
            self.shape_indices = 0;
        }
        // stay stale when the label could not be set up, so the next frame
        // retries instead of rendering from a half-built cache
        self.initialised = self.setup_label(backend, ctx, origin);
    }

    /// Arrange (if dirty), align and compose the label, then upload it.
    ///
    /// Returns false when setup could not complete yet (no context, font
    /// not loaded); cached state is left untouched for the retry.
    pub fn setup_label(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
    ) -> bool {
        if !backend.is_active() {
            return false;
        }
        if ctx.fonts.is_empty() && self.label_font.is_none() && self.label.read().text.is_empty() {
            // nothing to draw and no font to resolve
            self.label_indices = 0;
            return true;
        }
        let font = ctx.fonts.resolve(self.label_font.as_ref());
        if !font.loaded() {
            // fonts load at the gui level; leave the label dirty and retry
            self.label_indices = 0;
            return false;
        }

        if self.label.read().arrangement.lines.is_empty() {
            self.arrange_label_with(&font.arena(), &font.metrics());
        }
        if self.label_stretch_vertical {
            self.stretch_label_fit(&font, true);
        }
        if self.label_shrink_vertical {
            self.stretch_label_fit(&font, false);
        }

        let absolute = self.absolute_position(origin);
        let (_, label_buffer) = self.ensure_buffers(backend);
        let arena = font.arena();
        let mut state = self.label.write();
        state.origin = alignment_origin(
            self.label_alignment,
            absolute,
            self.size,
            self.label_margin,
            state.arrangement.size,
            &font.metrics(),
        );
        let mesh = compose(&state.arrangement, &arena, state.origin, ctx.primitive_mode);
        self.label_indices = mesh.indices.len() as u32;
        if !mesh.is_empty() {
            let transformed: Vec<Vertex> = mesh
                .vertices
                .iter()
                .map(|v| Vertex::new(
                    backend.coord_transform(Point::new(v.coords[0], v.coords[1])),
                    v.texcoords,
                ))
                .collect();
            backend.upload_buffer(label_buffer, &transformed, &mesh.indices);
        }
        true
    }

    /// Vertical stretch/shrink against an already-resolved font.
    fn stretch_label_fit(&mut self, font: &Font, stretch: bool) {
        let label_height = self.label.read().arrangement.size.height;
        let target = label_height + self.label_margin.y * 2.0 + font.metrics().height;
        if (stretch && target > self.size.height) || (!stretch && target < self.size.height) {
            self.size.height = target;
        }
    }

    /// Draw the solid fill. Fully transparent fills are skipped; a pure
    /// performance shortcut, the output is identical either way.
    pub(crate) fn draw_background(&self, backend: &mut dyn RenderBackend) {
        if self.shape_indices == 0 || self.colours.current.background.a == 0.0 {
            return;
        }
        if let Some(buffers) = &self.buffers {
            backend.draw_buffer(
                buffers.shape,
                DrawMode::TriangleFan,
                self.shape_indices,
                self.colours.current.background,
            );
        }
    }

    pub(crate) fn draw_outline(&self, backend: &mut dyn RenderBackend) {
        if self.shape_indices == 0 || self.colours.current.outline.a == 0.0 {
            return;
        }
        if let Some(buffers) = &self.buffers {
            backend.draw_buffer(
                buffers.shape,
                DrawMode::LineLoop,
                self.shape_indices,
                self.colours.current.outline,
            );
        }
    }

    /// Draw the shape buffer with an arbitrary mode and colour; for leaf
    /// widgets whose shape is not the outline quad.
    pub(crate) fn draw_shape(
        &self,
        backend: &mut dyn RenderBackend,
        mode: DrawMode,
        colour: Rgba,
    ) {
        if self.shape_indices == 0 {
            return;
        }
        if let Some(buffers) = &self.buffers {
            backend.draw_buffer(buffers.shape, mode, self.shape_indices, colour);
        }
    }

    pub(crate) fn draw_label(&self, backend: &mut dyn RenderBackend, ctx: &FrameContext) {
        if self.label_indices == 0 {
            return;
        }
        if let Some(buffers) = &self.buffers {
            backend.draw_buffer(
                buffers.label,
                ctx.primitive_mode.draw_mode(),
                self.label_indices,
                self.colours.current.content,
            );
        }
    }

    /// Release GPU buffer handles in preparation for teardown or a context
    /// switch.
    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(buffers) = self.buffers.take() {
            backend.destroy_buffer(buffers.shape);
            backend.destroy_buffer(buffers.label);
        }
        self.shape_indices = 0;
        self.label_indices = 0;
        self.initialised = false;
    }
}

/// The four corners of an axis-aligned quad, counter-clockwise from the
/// lower left, with the solid-colour texcoord default.
pub(crate) fn quad_vertices(position: Point, size: Size) -> [Vertex; 4] {
    [
        Vertex::new([position.x, position.y], [1.0, 1.0]),
        Vertex::new([position.x + size.width, position.y], [1.0, 1.0]),
        Vertex::new([position.x + size.width, position.y + size.height], [1.0, 1.0]),
        Vertex::new([position.x, position.y + size.height], [1.0, 1.0]),
    ]
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Glyph;
    use crate::geometry::Rgba;

    fn test_core() -> WidgetCore {
        WidgetCore::new(
            ColourSet::default(),
            "",
            None,
            Size::new(100.0, 50.0),
            Point::new(10.0, 20.0),
        )
    }

    fn test_arena() -> GlyphArena {
        let mut arena = GlyphArena::new();
        arena.insert(Glyph::new(
            ' ',
            Vector::new(0.0, 0.0),
            Size::new(0.0, 0.0),
            Vector::new(5.0, 0.0),
        ));
        for ch in 'a'..='z' {
            arena.insert(Glyph::new(
                ch,
                Vector::new(0.0, 0.0),
                Size::new(8.0, 10.0),
                Vector::new(10.0, 0.0),
            ));
        }
        arena
    }

    fn test_metrics() -> FontMetrics {
        FontMetrics {
            ascender: 12.0,
            descender: -4.0,
            height: 16.0,
            line_gap: 0.0,
        }
    }

    fn frame_ctx<'a>(
        fonts: &'a FontSet,
        picked: Option<WidgetId>,
        pressed: bool,
        released: bool,
    ) -> FrameContext<'a> {
        FrameContext {
            dpi_scale: DpiScale::new(1.0),
            picked,
            mouse_pressed: pressed,
            mouse_released: released,
            input_field: None,
            fonts,
            primitive_mode: PrimitiveMode::Quads,
        }
    }

    #[test]
    fn dpi_scaled_setters_round_trip() {
        let mut core = test_core();
        let scale = DpiScale::new(2.0);
        core.set_position(LogicalPoint::new(5.0, 10.0), scale);
        assert_eq!(core.get_position_nodpiscale(), Point::new(10.0, 20.0));
        assert_eq!(core.get_position(scale), LogicalPoint::new(5.0, 10.0));

        core.set_size(LogicalSize::new(30.0, 40.0), scale);
        assert_eq!(core.get_size_nodpiscale(), Size::new(60.0, 80.0));
        assert_eq!(core.get_size(scale), LogicalSize::new(30.0, 40.0));
    }

    #[test]
    fn move_and_grow_accumulate() {
        let mut core = test_core();
        let scale = DpiScale::new(1.0);
        core.move_by(LogicalVector::new(5.0, -5.0), scale);
        assert_eq!(core.get_position_nodpiscale(), Point::new(15.0, 15.0));
        core.grow(LogicalSize::new(10.0, 10.0), scale);
        assert_eq!(core.get_size_nodpiscale(), Size::new(110.0, 60.0));
        core.shrink(LogicalSize::new(10.0, 10.0), scale);
        assert_eq!(core.get_size_nodpiscale(), Size::new(100.0, 50.0));
        core.scale_by(2.0, 0.5);
        assert_eq!(core.get_size_nodpiscale(), Size::new(200.0, 25.0));
    }

    #[test]
    fn pick_tests_absolute_rectangle() {
        let core = test_core();
        let origin = Point::new(100.0, 100.0);
        // widget occupies 110..210 x 120..170
        assert_eq!(core.pick(Point::new(150.0, 150.0), origin), Some(core.id()));
        assert_eq!(core.pick(Point::new(110.0, 120.0), origin), Some(core.id()));
        assert_eq!(core.pick(Point::new(109.0, 150.0), origin), None);
        assert_eq!(core.pick(Point::new(150.0, 171.0), origin), None);
    }

    #[test]
    fn hidden_widgets_are_never_picked() {
        let mut core = test_core();
        core.hide();
        assert_eq!(core.pick(Point::new(50.0, 40.0), Point::zero()), None);
    }

    #[test]
    fn set_label_skips_identical_text() {
        let mut core = test_core();
        core.set_label("hello");
        core.arrange_label_with(&test_arena(), &test_metrics());
        assert!(!core.label.read().arrangement.lines.is_empty());

        // identical text must not clear the cached arrangement
        core.set_label("hello");
        assert!(!core.label.read().arrangement.lines.is_empty());

        // different text marks the layout dirty
        core.set_label("world");
        assert!(core.label.read().arrangement.lines.is_empty());
    }

    #[test]
    fn size_mutation_invalidates_label_layout() {
        let mut core = test_core();
        core.set_label("hi");
        core.arrange_label_with(&test_arena(), &test_metrics());
        core.mark_ready();
        // resizing changes the wrap width, so the line list is cleared
        core.set_size_nodpiscale(Size::new(10.0, 10.0));
        assert!(!core.is_ready());
        assert!(core.label.read().arrangement.lines.is_empty());
    }

    #[test]
    fn position_mutation_keeps_label_layout() {
        let mut core = test_core();
        core.set_label("hi");
        core.arrange_label_with(&test_arena(), &test_metrics());
        core.mark_ready();
        core.set_position_nodpiscale(Point::new(1.0, 2.0));
        assert!(!core.is_ready());
        assert!(!core.label.read().arrangement.lines.is_empty());
    }

    #[test]
    fn label_arrangement_uses_margin_width() {
        let mut core = test_core();
        core.set_size_nodpiscale(Size::new(70.0, 50.0));
        core.label_margin = Vector::new(5.0, 5.0);
        core.set_label("ab cd"); // two words of 25 and 20
        // content width 60 fits both words; margin 20 would not
        core.arrange_label_with(&test_arena(), &test_metrics());
        assert_eq!(core.label.read().arrangement.lines.len(), 1);

        core.label_margin = Vector::new(15.0, 5.0);
        core.refresh();
        core.arrange_label_with(&test_arena(), &test_metrics());
        assert_eq!(core.label.read().arrangement.lines.len(), 2);
    }

    #[test]
    fn focusable_state_machine_blends() {
        let fonts = FontSet::new();
        let mut core = test_core();
        core.focusable = true;
        core.colours.active = crate::colour::ColourGroup::new(
            Rgba::new(1.0, 0.0, 0.0, 1.0),
            Rgba::TRANSPARENT,
            Rgba::TRANSPARENT,
        );
        let mut events = FrameEvents::default();

        // picked and pressed: active, fast blend towards the active group
        let ctx = frame_ctx(&fonts, Some(core.id()), true, false);
        let edge = core.update(&ctx, &mut events);
        assert_eq!(edge, InteractionEdge::Press);
        assert!(core.is_active());
        assert!(core.colours.current.background.r > 0.4);

        // picked, released edge: hover plus a release report
        let ctx = frame_ctx(&fonts, Some(core.id()), false, true);
        let edge = core.update(&ctx, &mut events);
        assert_eq!(edge, InteractionEdge::Release);
        assert!(!core.is_active());
        assert!(core.is_mouseover());
        assert_eq!(events.select_input, Some(None));

        // not picked, not focused: idle
        let ctx = frame_ctx(&fonts, None, false, false);
        let edge = core.update(&ctx, &mut events);
        assert_eq!(edge, InteractionEdge::None);
        assert!(!core.is_mouseover());
    }

    #[test]
    fn non_focusable_widgets_always_idle() {
        let fonts = FontSet::new();
        let mut core = test_core();
        core.colours.idle.background = Rgba::new(0.0, 1.0, 0.0, 1.0);
        core.colours.active.background = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let mut events = FrameEvents::default();

        let ctx = frame_ctx(&fonts, Some(core.id()), true, false);
        let edge = core.update(&ctx, &mut events);
        assert_eq!(edge, InteractionEdge::None);
        assert!(!core.is_active());
        // blending towards idle, not active
        assert!(core.colours.current.background.g > 0.0);
        assert_eq!(core.colours.current.background.r, 0.0);
    }

    #[test]
    fn stretch_and_shrink_to_label() {
        let mut core = test_core();
        core.set_size_nodpiscale(Size::new(10.0, 200.0));
        core.label_margin = Vector::new(5.0, 5.0);
        core.set_label("abc");
        core.arrange_label_with(&test_arena(), &test_metrics());

        // simulate the fit pass: label is 30 wide, 8 tall
        let label_size = core.label.read().arrangement.size;
        assert_eq!(label_size.width, 30.0);

        // stretch horizontally: 30 + 2*5 = 40 > 10
        let target = label_size.width + core.label_margin.x * 2.0;
        if target > core.size.width {
            core.size.width = target;
        }
        assert_eq!(core.size.width, 40.0);
    }

    #[test]
    fn prepare_no_ops_without_context() {
        use crate::render::NullBackend;
        let fonts = FontSet::new();
        let mut core = test_core();
        let ctx = frame_ctx(&fonts, None, false, false);
        let mut backend = NullBackend::inactive();
        core.prepare(&mut backend, &ctx, Point::zero());
        // stays stale so the next active frame retries
        assert!(!core.is_ready());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn prepare_builds_buffers_when_active() {
        use crate::render::NullBackend;
        let fonts = FontSet::new();
        let mut core = test_core();
        let ctx = frame_ctx(&fonts, None, false, false);
        let mut backend = NullBackend::new();
        core.prepare(&mut backend, &ctx, Point::zero());
        assert!(core.is_ready());
        assert_eq!(core.shape_indices, 4);
        assert_eq!(backend.live_buffers(), 2);

        core.destroy_buffers(&mut backend);
        assert_eq!(backend.live_buffers(), 0);
        assert!(!core.is_ready());
    }
}
