//! A widget that owns other widgets.
//!
//! A window is a widget core plus a container; picking prefers the
//! children and falls back to the window itself, so clicks inside a window
//! never fall through to whatever is underneath it. A window created with
//! [`Window::group`] is pure position bookkeeping: it draws nothing of its
//! own and only its children can be picked.

use std::sync::Arc;

use crate::colour::ColourSet;
use crate::font::Font;
use crate::geometry::{Point, Size};
use crate::render::RenderBackend;
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore, WidgetId};
use crate::widget::container::Container;

pub struct Window {
    pub core: WidgetCore,
    pub children: Container,
    /// Position-only grouping: no own drawing, no own pick.
    group: bool,
}

impl Window {
    pub fn new(
        colours: ColourSet,
        label: &str,
        label_font: Option<Arc<Font>>,
        size: Size,
        position: Point,
    ) -> Self {
        Self {
            core: WidgetCore::new(colours, label, label_font, size, position),
            children: Container::new(),
            group: false,
        }
    }

    /// A cut-down window that has only position data and no drawable
    /// elements of its own; clicks that miss every child fall through.
    pub fn group(size: Size, position: Point) -> Self {
        let mut core = WidgetCore::new(ColourSet::default(), "", None, size, position);
        core.focusable = false;
        core.set_shape(false);
        Self {
            core,
            children: Container::new(),
            group: true,
        }
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    /// Hit-test this window: children first, the window itself as a
    /// fallback when the cursor is inside it. Groups bypass their own
    /// rectangle and never claim the pick themselves.
    pub(crate) fn pick(&self, cursor: Point, origin: Point) -> Option<WidgetId> {
        let inner_origin = self.core.absolute_position(origin);
        if self.group {
            if !self.core.visible {
                return None;
            }
            return self.children.pick(cursor, inner_origin);
        }
        self.core.pick(cursor, origin)?;
        match self.children.pick(cursor, inner_origin) {
            Some(child) => Some(child),
            None => Some(self.core.id()),
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
        if !self.group {
            self.core.prepare(backend, ctx, origin);
            self.core.draw_background(backend);
            self.core.draw_outline(backend);
            self.core.draw_label(backend, ctx);
            self.core.update(ctx, events);
        }

        let inner_origin = self.core.absolute_position(origin);
        self.children.render_all(backend, ctx, inner_origin, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
        self.children.destroy_buffers_all(backend);
    }
}

/// Layout control over the children.
impl Window {
    /// Resize this window to include all its children as stacked by
    /// [`layout_vertical`](Self::layout_vertical): heights accumulate,
    /// width rubber-bands to the widest child.
    pub fn stretch_vertical(&mut self, margin: f32) {
        let mut new_size = Size::new(0.0, margin);
        for child in self.children.iter() {
            let child_size = child.core().get_size_nodpiscale();
            new_size.height += child_size.height + margin;
            new_size.width = new_size.width.max(child_size.width);
        }
        new_size.width += margin * 2.0;
        self.core.set_size_nodpiscale(new_size);
    }

    /// Resize this window to include all its children as stacked by
    /// [`layout_horizontal`](Self::layout_horizontal).
    pub fn stretch_horizontal(&mut self, margin: f32) {
        let mut new_size = Size::new(margin, 0.0);
        for child in self.children.iter() {
            let child_size = child.core().get_size_nodpiscale();
            new_size.width += child_size.width + margin;
            new_size.height = new_size.height.max(child_size.height);
        }
        new_size.height += margin * 2.0;
        self.core.set_size_nodpiscale(new_size);
    }

    /// Distribute the children evenly top to bottom, each centred
    /// horizontally.
    pub fn layout_vertical(&mut self, margin: f32) {
        let size = self.core.get_size_nodpiscale();
        let bottom_left = Point::new(margin, margin);
        let top_right = Point::new(size.width - margin, size.height - margin);

        let count = self.children.len();
        if count == 0 {
            return;
        }
        let total_height: f32 = self
            .children
            .iter()
            .map(|c| c.core().get_size_nodpiscale().height)
            .sum();
        let range = top_right.y - bottom_left.y;
        // take one to allow marginless fitting
        let spacing = (range - total_height) / (count.max(2) - 1) as f32;

        let mut pen = top_right.y;
        for child in self.children.iter_mut() {
            let child_size = child.core().get_size_nodpiscale();
            pen -= child_size.height;
            child.core_mut().set_position_nodpiscale(Point::new(
                ((top_right.x - bottom_left.x) - child_size.width) / 2.0 + bottom_left.x,
                pen,
            ));
            pen -= spacing;
        }
    }

    /// Distribute the children evenly left to right, each centred
    /// vertically.
    pub fn layout_horizontal(&mut self, margin: f32) {
        let size = self.core.get_size_nodpiscale();
        let bottom_left = Point::new(margin, margin);
        let top_right = Point::new(size.width - margin, size.height - margin);

        let count = self.children.len();
        if count == 0 {
            return;
        }
        let total_width: f32 = self
            .children
            .iter()
            .map(|c| c.core().get_size_nodpiscale().width)
            .sum();
        let range = top_right.x - bottom_left.x;
        let spacing = (range - total_width) / (count.max(2) - 1) as f32;

        let mut pen = bottom_left.x;
        for child in self.children.iter_mut() {
            let child_size = child.core().get_size_nodpiscale();
            child.core_mut().set_position_nodpiscale(Point::new(
                pen,
                ((top_right.y - bottom_left.y) - child_size.height) / 2.0 + bottom_left.y,
            ));
            pen += child_size.width + spacing;
        }
    }
}
