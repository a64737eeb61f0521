//! A horizontal progress bar.

use crate::colour::ColourSet;
use crate::geometry::{Point, Size};
use crate::render::{BufferId, DrawMode, RenderBackend, Vertex};
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore, quad_vertices};

/// Filled fraction is `value / scale`, clamped to the widget width.
pub struct ProgressBar {
    pub core: WidgetCore,
    value: f32,
    scale: f32,
    fill_buffer: Option<BufferId>,
    fill_indices: u32,
}

impl ProgressBar {
    pub fn new(colours: ColourSet, value: f32, scale: f32, size: Size, position: Point) -> Self {
        let mut core = WidgetCore::new(colours, "", None, size, position);
        core.focusable = false;
        Self {
            core,
            value,
            scale,
            fill_buffer: None,
            fill_indices: 0,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        if self.value != value {
            self.value = value;
            self.core.refresh_position_only();
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.core.refresh_position_only();
        }
    }

    fn setup_fill(&mut self, backend: &mut dyn RenderBackend, origin: Point) {
        let absolute = self.core.absolute_position(origin);
        let size = self.core.get_size_nodpiscale();
        let fraction = if self.scale == 0.0 {
            0.0
        } else {
            (self.value / self.scale).clamp(0.0, 1.0)
        };
        let fill_size = Size::new(size.width * fraction, size.height);
        let quad = quad_vertices(absolute, fill_size);
        let transformed: Vec<Vertex> = quad
            .iter()
            .map(|v| Vertex::new(
                backend.coord_transform(Point::new(v.coords[0], v.coords[1])),
                v.texcoords,
            ))
            .collect();
        let buffer = *self
            .fill_buffer
            .get_or_insert_with(|| backend.create_buffer());
        backend.upload_buffer(buffer, &transformed, &[0, 1, 2, 3]);
        self.fill_indices = 4;
    }

    pub(crate) fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
        events: &mut FrameEvents,
    ) {
        if !self.core.visible {
            return;
        }
        if !self.core.is_ready() && backend.is_active() {
            let absolute = self.core.absolute_position(origin);
            let size = self.core.get_size_nodpiscale();
            let quad = quad_vertices(absolute, size);
            self.core.upload_shape(backend, &quad, &[0, 1, 2, 3]);
            self.setup_fill(backend, origin);
            self.core.mark_ready();
        }
        // the fill is drawn in the background colour, the box on top in the
        // outline colour
        if self.fill_indices != 0
            && self.core.colours.current.background.a != 0.0
            && let Some(buffer) = self.fill_buffer
        {
            backend.draw_buffer(
                buffer,
                DrawMode::TriangleFan,
                self.fill_indices,
                self.core.colours.current.background,
            );
        }
        self.core.draw_outline(backend);
        self.core.update(ctx, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(buffer) = self.fill_buffer.take() {
            backend.destroy_buffer(buffer);
        }
        self.fill_indices = 0;
        self.core.destroy_buffers(backend);
    }
}
