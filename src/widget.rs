//! The widget tree.
//!
//! Every widget aggregates the shared [`WidgetCore`] (geometry, colour
//! state, label state, GPU buffers) and adds its own behaviour on top;
//! widgets that contain others additionally aggregate a [`Container`].
//! The tree itself is a tagged [`Widget`] variant per leaf type, so there is
//! no inheritance and no ambiguity about where a capability lives.

pub mod base;
pub mod button;
pub mod container;
pub mod graph_line;
pub mod input_text;
pub mod label;
pub mod line;
pub mod lineshape;
pub mod progressbar;
pub mod window;

pub use base::{FrameContext, FrameEvents, InteractionEdge, WidgetCore, WidgetId};
pub use button::Button;
pub use container::Container;
pub use graph_line::GraphLine;
pub use input_text::InputText;
pub use label::Label;
pub use line::Line;
pub use lineshape::LineShape;
pub use progressbar::ProgressBar;
pub use window::Window;

use crate::geometry::{Point, Size};
use crate::render::RenderBackend;

/// One widget of any kind.
pub enum Widget {
    Window(Window),
    Button(Button),
    Label(Label),
    ProgressBar(ProgressBar),
    InputText(InputText),
    Line(Line),
    LineShape(LineShape),
    GraphLine(GraphLine),
}

macro_rules! each_widget {
    ($self:expr, $widget:ident => $body:expr) => {
        match $self {
            Widget::Window($widget) => $body,
            Widget::Button($widget) => $body,
            Widget::Label($widget) => $body,
            Widget::ProgressBar($widget) => $body,
            Widget::InputText($widget) => $body,
            Widget::Line($widget) => $body,
            Widget::LineShape($widget) => $body,
            Widget::GraphLine($widget) => $body,
        }
    };
}

impl Widget {
    pub fn core(&self) -> &WidgetCore {
        each_widget!(self, widget => &widget.core)
    }

    pub fn core_mut(&mut self) -> &mut WidgetCore {
        each_widget!(self, widget => &mut widget.core)
    }

    pub fn id(&self) -> WidgetId {
        self.core().id()
    }

    pub fn as_window(&self) -> Option<&Window> {
        match self {
            Widget::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn as_window_mut(&mut self) -> Option<&mut Window> {
        match self {
            Widget::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn as_input_text(&self) -> Option<&InputText> {
        match self {
            Widget::InputText(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_input_text_mut(&mut self) -> Option<&mut InputText> {
        match self {
            Widget::InputText(input) => Some(input),
            _ => None,
        }
    }

    /// Hit-test this widget; windows prefer their children.
    pub(crate) fn pick(&self, cursor: Point, origin: Point) -> Option<WidgetId> {
        match self {
            Widget::Window(window) => window.pick(cursor, origin),
            Widget::Label(_) => None, // labels are never clickable
            _ => self.core().pick(cursor, origin),
        }
    }

    pub(crate) fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
        events: &mut FrameEvents,
    ) {
        each_widget!(self, widget => widget.render(backend, ctx, origin, events))
    }

    /// Apply this widget's layout rules, then recurse into children.
    pub(crate) fn update_layout(&mut self, parent_size: Size) {
        let core = self.core_mut();
        let rules = core.layout_rules.clone();
        for rule in rules {
            rule.apply(core, parent_size);
        }
        if let Widget::Window(window) = self {
            let size = window.core.get_size_nodpiscale();
            window.children.update_layout_all(size);
        }
    }

    /// Invalidate render buffers, and label layout, recursively.
    pub(crate) fn refresh(&mut self) {
        self.core_mut().refresh();
        if let Widget::Window(window) = self {
            window.children.refresh_all();
        }
    }

    /// Release GPU buffer handles, recursively.
    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        each_widget!(self, widget => widget.destroy_buffers(backend))
    }
}

impl From<Window> for Widget {
    fn from(widget: Window) -> Self {
        Widget::Window(widget)
    }
}
impl From<Button> for Widget {
    fn from(widget: Button) -> Self {
        Widget::Button(widget)
    }
}
impl From<Label> for Widget {
    fn from(widget: Label) -> Self {
        Widget::Label(widget)
    }
}
impl From<ProgressBar> for Widget {
    fn from(widget: ProgressBar) -> Self {
        Widget::ProgressBar(widget)
    }
}
impl From<InputText> for Widget {
    fn from(widget: InputText) -> Self {
        Widget::InputText(widget)
    }
}
impl From<Line> for Widget {
    fn from(widget: Line) -> Self {
        Widget::Line(widget)
    }
}
impl From<LineShape> for Widget {
    fn from(widget: LineShape) -> Self {
        Widget::LineShape(widget)
    }
}
impl From<GraphLine> for Widget {
    fn from(widget: GraphLine) -> Self {
        Widget::GraphLine(widget)
    }
}
