//! The top-level gui root.
//!
//! The root owns what the rest of the tree shares: the fonts and their
//! atlas, the DPI scale, the cached window size, and the per-frame input
//! state (cursor position, mouse edges, the picked widget, the selected
//! input field). Rendering a frame refreshes the pick, loads any pending
//! fonts through the atlas grow-and-retry cycle, traverses the tree, and
//! derives the one-frame mouse-released edge at the end.

use std::sync::Arc;

use crate::atlas::{Atlas, AtlasError};
use crate::font::{Font, FontError, FontSet};
use crate::geometry::{DpiScale, Point, Size};
use crate::render::{PrimitiveMode, RenderBackend};
use crate::widget::{Container, FrameContext, FrameEvents, Widget, WidgetId};

/// Standard pixels per inch.
pub const DPI_DEFAULT: f32 = 72.0;
/// Minimum allowed dpi value.
pub const DPI_MIN: f32 = 18.0;
/// Maximum allowed dpi value.
pub const DPI_MAX: f32 = 500.0;

pub struct Gui {
    /// Top-level widgets.
    pub root: Container,
    fonts: FontSet,
    atlas: Atlas,
    atlas_uploaded: bool,

    /// Index emission layout for glyph quads.
    pub primitive_mode: PrimitiveMode,

    dpi: f32,
    dpi_scale: DpiScale,
    window_size: Size,
    cursor_position: Point,

    mouse_pressed: bool,
    mouse_released: bool,
    mouse_pressed_frames: u32,

    picked: Option<WidgetId>,
    input_field: Option<WidgetId>,
}

impl Default for Gui {
    fn default() -> Self {
        Self::new()
    }
}

impl Gui {
    pub fn new() -> Self {
        Self {
            root: Container::new(),
            fonts: FontSet::new(),
            atlas: Atlas::default(),
            atlas_uploaded: false,
            primitive_mode: PrimitiveMode::default(),
            dpi: DPI_DEFAULT,
            dpi_scale: DpiScale::new(1.0),
            window_size: Size::zero(),
            cursor_position: Point::zero(),
            mouse_pressed: false,
            mouse_released: false,
            mouse_pressed_frames: 0,
            picked: None,
            input_field: None,
        }
    }

    /// Add a top-level widget.
    pub fn add(&mut self, widget: impl Into<Widget>) -> WidgetId {
        self.root.add(widget)
    }
}

/// Font ownership.
impl Gui {
    /// Take shared ownership of a font. The first font added becomes the
    /// default.
    pub fn add_font(&mut self, font: Arc<Font>) -> Arc<Font> {
        let font = self.fonts.add(font);
        if self.fonts.default_font().is_none() {
            self.fonts.set_default(&font);
        }
        font
    }

    pub fn set_default_font(&mut self, font: &Arc<Font>) {
        self.fonts.set_default(font);
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Load every pending font into the atlas, growing it as needed.
    ///
    /// On an allocation failure all fonts are unloaded, the atlas doubles,
    /// and loading restarts from scratch; past the backend's texture size
    /// ceiling the failure is permanent and reported. A no-op without an
    /// active context.
    pub fn load_fonts(&mut self, backend: &mut dyn RenderBackend) -> Result<(), FontError> {
        if !backend.is_active() {
            return Ok(());
        }
        let fonts = &self.fonts;
        load_with_retry(
            &mut self.atlas,
            backend.max_texture_size(),
            |atlas| {
                for font in fonts.iter() {
                    font.load_if_needed(atlas)?;
                }
                Ok(())
            },
            || {
                for font in fonts.iter() {
                    font.unload();
                }
            },
        )?;
        backend.upload_atlas(self.atlas.size(), self.atlas.data());
        self.atlas_uploaded = true;
        Ok(())
    }

    fn fonts_pending(&self) -> bool {
        !self.atlas_uploaded || self.fonts.iter().any(|f| !f.loaded())
    }
}

/// Environment and input control.
impl Gui {
    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn dpi_scale(&self) -> DpiScale {
        self.dpi_scale
    }

    /// Update dpi, clamped to the permitted range, and the cached scale.
    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi.clamp(DPI_MIN, DPI_MAX);
        self.dpi_scale = DpiScale::new(self.dpi / DPI_DEFAULT);
    }

    /// Update the desired scale factor and derive dpi from it.
    pub fn set_dpi_scale(&mut self, scale: f32) {
        self.set_dpi(DPI_DEFAULT * scale);
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    /// Cache the window size; all buffers are refreshed on a change when a
    /// context is active.
    pub fn set_window_size(&mut self, size: Size, backend: &dyn RenderBackend) {
        if self.window_size == size {
            return;
        }
        self.window_size = size;
        if backend.is_active() {
            self.refresh();
        }
    }

    pub fn cursor_position(&self) -> Point {
        self.cursor_position
    }

    /// Update the cursor position and re-pick under it.
    pub fn set_cursor_position(&mut self, position: Point) {
        self.cursor_position = position;
        self.picked = self.root.pick(self.cursor_position, Point::zero());
    }

    /// Tell the gui the mouse button has been pressed.
    pub fn set_mouse_pressed(&mut self) {
        self.mouse_pressed = true;
    }

    /// Tell the gui the mouse button is being released.
    pub fn set_mouse_released(&mut self) {
        self.mouse_pressed = false;
    }

    /// The widget currently under the pointer, if any.
    pub fn picked(&self) -> Option<WidgetId> {
        self.picked
    }

    /// The input field currently selected for keyboard input.
    pub fn input_field(&self) -> Option<WidgetId> {
        self.input_field
    }

    /// One-frame edge raised at the end of the frame the mouse came up.
    pub fn is_mouse_released(&self) -> bool {
        self.mouse_released
    }
}

/// Input field selection.
impl Gui {
    /// Select a widget as the keyboard input target, or deselect with
    /// `None`. Focus flags follow the selection.
    pub fn select_input_field(&mut self, request: Option<WidgetId>) {
        if self.input_field == request {
            return;
        }
        if let Some(old) = self.input_field
            && let Some(widget) = find_deep_mut(&mut self.root, old)
        {
            widget.core_mut().focused = false;
        }
        if let Some(new) = request
            && let Some(widget) = find_deep_mut(&mut self.root, new)
        {
            widget.core_mut().focused = true;
        }
        self.input_field = request;
    }

    pub fn deselect_input_field(&mut self) {
        self.select_input_field(None);
    }
}

/// Frame lifecycle.
impl Gui {
    /// Render every visible element and advance the interaction state.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) {
        if !backend.is_active() {
            return;
        }
        if self.fonts_pending()
            && let Err(e) = self.load_fonts(backend)
        {
            log::error!("font loading failed: {e}");
        }

        self.picked = self.root.pick(self.cursor_position, Point::zero());

        let ctx = FrameContext {
            dpi_scale: self.dpi_scale,
            picked: self.picked,
            mouse_pressed: self.mouse_pressed,
            mouse_released: self.mouse_released,
            input_field: self.input_field,
            fonts: &self.fonts,
            primitive_mode: self.primitive_mode,
        };
        let mut events = FrameEvents::default();
        self.root
            .render_all(backend, &ctx, Point::zero(), &mut events);

        if let Some(request) = events.select_input {
            self.select_input_field(request);
        }

        // derive the one-frame released edge for the next frame
        self.mouse_released = false;
        if self.mouse_pressed {
            self.mouse_pressed_frames += 1;
        } else {
            if self.mouse_pressed_frames != 0 {
                self.mouse_released = true;
            }
            self.mouse_pressed_frames = 0;
        }
    }

    /// Apply every widget's layout rules against the window extent.
    pub fn update_layout(&mut self) {
        self.root.update_layout_all(self.window_size);
    }

    /// Invalidate all buffers and label layouts, and refresh the pick.
    pub fn refresh(&mut self) {
        self.root.refresh_all();
        self.picked = self.root.pick(self.cursor_position, Point::zero());
    }

    /// Release every widget's GPU buffers and forget the uploaded atlas, in
    /// preparation for exit or a context switch.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.root.destroy_buffers_all(backend);
        self.atlas_uploaded = false;
    }
}

/// Find a widget anywhere in a tree by id.
fn find_deep_mut(container: &mut Container, id: WidgetId) -> Option<&mut Widget> {
    for element in container.iter_mut() {
        if element.id() == id {
            return Some(element);
        }
        if let Widget::Window(window) = element
            && let Some(found) = find_deep_mut(&mut window.children, id)
        {
            return Some(found);
        }
    }
    None
}

/// Run a font-load cycle against the atlas, doubling it on exhaustion.
///
/// `load_all` loads every pending font, `unload_all` discards partial loads
/// before a retry. The cycle ends when a load completes, or permanently
/// with [`AtlasError::TextureLimit`] once the atlas cannot grow below
/// `ceiling`.
fn load_with_retry(
    atlas: &mut Atlas,
    ceiling: u32,
    mut load_all: impl FnMut(&mut Atlas) -> Result<(), FontError>,
    mut unload_all: impl FnMut(),
) -> Result<(), FontError> {
    loop {
        match load_all(atlas) {
            Ok(()) => return Ok(()),
            Err(FontError::Atlas(AtlasError::Full)) => {
                unload_all();
                log::warn!(
                    "texture atlas full at {}x{}, growing",
                    atlas.size(),
                    atlas.size()
                );
                atlas.grow(ceiling).inspect_err(|e| {
                    log::error!("abandoning font load: {e}");
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::ColourSet;
    use crate::render::NullBackend;
    use crate::widget::{Button, InputText, Window};

    fn test_button(position: Point) -> Button {
        Button::new(
            ColourSet::default(),
            "",
            None,
            None,
            Size::new(50.0, 20.0),
            position,
        )
    }

    #[test]
    fn dpi_is_clamped_and_scale_derived() {
        let mut gui = Gui::new();
        gui.set_dpi(144.0);
        assert_eq!(gui.dpi(), 144.0);
        assert_eq!(gui.dpi_scale().get(), 2.0);

        gui.set_dpi(10_000.0);
        assert_eq!(gui.dpi(), DPI_MAX);

        gui.set_dpi(1.0);
        assert_eq!(gui.dpi(), DPI_MIN);

        gui.set_dpi_scale(3.0);
        assert_eq!(gui.dpi(), 216.0);
        assert_eq!(gui.dpi_scale().get(), 3.0);
    }

    #[test]
    fn cursor_movement_updates_pick() {
        let mut gui = Gui::new();
        let id = gui.add(test_button(Point::new(0.0, 0.0)));
        gui.set_cursor_position(Point::new(25.0, 10.0));
        assert_eq!(gui.picked(), Some(id));
        gui.set_cursor_position(Point::new(500.0, 500.0));
        assert_eq!(gui.picked(), None);
    }

    #[test]
    fn released_edge_lasts_one_frame() {
        let mut gui = Gui::new();
        let mut backend = NullBackend::new();

        gui.set_mouse_pressed();
        gui.render(&mut backend);
        assert!(!gui.is_mouse_released());

        gui.set_mouse_released();
        gui.render(&mut backend);
        assert!(gui.is_mouse_released());

        gui.render(&mut backend);
        assert!(!gui.is_mouse_released());
    }

    #[test]
    fn render_is_a_no_op_without_context() {
        let mut gui = Gui::new();
        gui.add(test_button(Point::new(0.0, 0.0)));
        let mut backend = NullBackend::inactive();
        gui.render(&mut backend);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn clicking_an_input_field_selects_it() {
        let mut gui = Gui::new();
        let input = gui.add(InputText::new(
            ColourSet::default(),
            "",
            None,
            16,
            Size::new(50.0, 20.0),
            Point::new(0.0, 0.0),
        ));
        let mut backend = NullBackend::new();

        // press and release over the field
        gui.set_cursor_position(Point::new(10.0, 10.0));
        gui.set_mouse_pressed();
        gui.render(&mut backend);
        gui.set_mouse_released();
        gui.render(&mut backend); // raises the released edge
        gui.render(&mut backend); // release observed by the field
        assert_eq!(gui.input_field(), Some(input));
        assert!(gui.root.find(input).unwrap().core().focused);

        // clicking elsewhere deselects
        gui.set_cursor_position(Point::new(500.0, 500.0));
        gui.deselect_input_field();
        assert_eq!(gui.input_field(), None);
        assert!(!gui.root.find(input).unwrap().core().focused);
    }

    #[test]
    fn select_input_field_moves_focus_into_windows() {
        let mut gui = Gui::new();
        let mut window = Window::new(
            ColourSet::default(),
            "",
            None,
            Size::new(100.0, 100.0),
            Point::new(0.0, 0.0),
        );
        let inner = window.children.add(test_button(Point::new(10.0, 10.0)));
        gui.add(window);

        gui.select_input_field(Some(inner));
        let root_window = gui.root.get(0).as_window().unwrap();
        assert!(root_window.children.find(inner).unwrap().core().focused);

        gui.select_input_field(None);
        let root_window = gui.root.get(0).as_window().unwrap();
        assert!(!root_window.children.find(inner).unwrap().core().focused);
    }

    #[test]
    fn atlas_failure_grows_once_then_succeeds() {
        // a load that fails while the atlas is small and fits once doubled
        let mut atlas = Atlas::new(256);
        let mut unloads = 0;
        let result = load_with_retry(
            &mut atlas,
            2048,
            |atlas| {
                if atlas.size() < 512 {
                    Err(AtlasError::Full.into())
                } else {
                    Ok(())
                }
            },
            || unloads += 1,
        );
        assert!(result.is_ok());
        assert_eq!(atlas.size(), 512); // exactly one doubling
        assert_eq!(unloads, 1);
    }

    #[test]
    fn atlas_failure_past_ceiling_is_permanent() {
        let mut atlas = Atlas::new(256);
        let result = load_with_retry(
            &mut atlas,
            512,
            |_| Err(AtlasError::Full.into()),
            || {},
        );
        assert!(matches!(
            result,
            Err(FontError::Atlas(AtlasError::TextureLimit { .. }))
        ));
    }

    #[test]
    fn window_size_change_refreshes_when_active() {
        let mut gui = Gui::new();
        let backend = NullBackend::new();
        gui.set_window_size(Size::new(800.0, 600.0), &backend);
        assert_eq!(gui.window_size(), Size::new(800.0, 600.0));
        // setting the same size again is a no-op
        gui.set_window_size(Size::new(800.0, 600.0), &backend);
    }
}
