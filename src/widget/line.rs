//! A single line segment.

use crate::colour::ColourSet;
use crate::geometry::{Point, Size};
use crate::render::{DrawMode, RenderBackend};
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore, quad_vertices};

/// A segment from the widget position to position plus size, drawn in the
/// outline colour.
pub struct Line {
    pub core: WidgetCore,
}

impl Line {
    pub fn new(colours: ColourSet, size: Size, position: Point) -> Self {
        let mut core = WidgetCore::new(colours, "", None, size, position);
        core.focusable = false;
        Self { core }
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
            // only the two diagonal corners
            let vertices = [quad[0], quad[2]];
            self.core.upload_shape(backend, &vertices, &[0, 1]);
            self.core.mark_ready();
        }
        self.core
            .draw_shape(backend, DrawMode::Lines, self.core.colours.current.outline);
        self.core.update(ctx, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
    }
}
