//! A clickable button with a release callback.

use std::sync::Arc;

use crate::colour::ColourSet;
use crate::font::Font;
use crate::geometry::{Point, Size};
use crate::render::RenderBackend;
use crate::widget::base::{FrameContext, FrameEvents, InteractionEdge, WidgetCore};

pub type ButtonCallback = Box<dyn FnMut() + Send>;

pub struct Button {
    pub core: WidgetCore,
    callback: Option<ButtonCallback>,
}

impl Button {
    pub fn new(
        colours: ColourSet,
        label: &str,
        callback: Option<ButtonCallback>,
        label_font: Option<Arc<Font>>,
        size: Size,
        position: Point,
    ) -> Self {
        let mut core = WidgetCore::new(colours, label, label_font, size, position);
        core.focusable = true;
        Self { core, callback }
    }

    pub fn set_callback(&mut self, callback: ButtonCallback) {
        self.callback = Some(callback);
    }

    /// Invoke this button's callback as if it had been clicked.
    pub fn execute(&mut self) {
        if let Some(callback) = &mut self.callback {
            callback();
        }
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
        self.core.draw_background(backend);
        self.core.draw_outline(backend);
        self.core.draw_label(backend, ctx);
        if self.core.update(ctx, events) == InteractionEdge::Release {
            self.execute();
        }
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
    }
}
