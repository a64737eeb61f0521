//! Plain text display.

use std::sync::Arc;

use crate::colour::ColourSet;
use crate::font::Font;
use crate::geometry::{Point, Size};
use crate::render::RenderBackend;
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore};

/// A piece of text with no interaction; labels are never clickable and
/// carry no fill or outline.
pub struct Label {
    pub core: WidgetCore,
}

impl Label {
    pub fn new(
        colours: ColourSet,
        label: &str,
        label_font: Option<Arc<Font>>,
        size: Size,
        position: Point,
    ) -> Self {
        let mut core = WidgetCore::new(colours, label, label_font, size, position);
        core.focusable = false;
        core.set_shape(false); // skip the unused outline and fill quad
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
        self.core.prepare(backend, ctx, origin);
        self.core.draw_label(backend, ctx);
        self.core.update(ctx, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
    }
}
