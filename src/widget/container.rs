//! Ordered ownership of child widgets.
//!
//! The container is plain bookkeeping: add, remove, index, iterate. What it
//! does guard is structural mutation during traversal: render, layout and
//! refresh passes flag the container as iterating, and any add/remove/clear
//! from inside such a pass panics. That interlock is a programmer-error
//! detector, not a synchronisation primitive; tripping it means a callback
//! is mutating the tree it is being called from.

use std::cell::Cell;

use crate::geometry::{Point, Size};
use crate::render::RenderBackend;
use crate::widget::base::{FrameContext, FrameEvents, WidgetId};
use crate::widget::Widget;

#[derive(Default)]
pub struct Container {
    elements: Vec<Widget>,
    iterating: Cell<bool>,
}

/// Clears the iteration flag when a traversal scope ends.
struct IterationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> IterationGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for IterationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn assert_not_iterating(&self, operation: &str) {
        if self.iterating.get() {
            panic!("attempted to {operation} a container while iterating through it");
        }
    }

    /// Add a new element and return its id.
    pub fn add(&mut self, widget: impl Into<Widget>) -> WidgetId {
        self.assert_not_iterating("add to");
        let widget = widget.into();
        let id = widget.id();
        self.elements.push(widget);
        id
    }

    /// Remove an element by index.
    ///
    /// # Panics
    /// When `index` is out of bounds, or when called during iteration.
    pub fn remove(&mut self, index: usize) -> Widget {
        self.assert_not_iterating("remove an element from");
        if index >= self.elements.len() {
            panic!(
                "attempted to remove element {index} outside array bounds {}",
                self.elements.len()
            );
        }
        self.elements.remove(index)
    }

    /// Remove an element by its id, anywhere in this container's direct
    /// children.
    pub fn remove_by_id(&mut self, id: WidgetId) -> Option<Widget> {
        self.assert_not_iterating("remove an element from");
        let index = self.elements.iter().position(|w| w.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Borrow an element by index. The reference must not be stored.
    ///
    /// # Panics
    /// When `index` is out of bounds; there is nothing sane to return.
    pub fn get(&self, index: usize) -> &Widget {
        if index >= self.elements.len() {
            panic!(
                "attempted to access element {index} outside array bounds {}",
                self.elements.len()
            );
        }
        &self.elements[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Widget {
        if index >= self.elements.len() {
            panic!(
                "attempted to access element {index} outside array bounds {}",
                self.elements.len()
            );
        }
        &mut self.elements[index]
    }

    /// Find a direct child by id.
    pub fn find(&self, id: WidgetId) -> Option<&Widget> {
        self.elements.iter().find(|w| w.id() == id)
    }

    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.elements.iter_mut().find(|w| w.id() == id)
    }

    /// Drop every child.
    pub fn clear(&mut self) {
        self.assert_not_iterating("clear");
        self.elements.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.elements.iter_mut()
    }
}

/// Tree traversals. Each one holds the iteration interlock for its whole
/// scope.
impl Container {
    /// Hit-test the children, topmost first.
    pub(crate) fn pick(&self, cursor: Point, origin: Point) -> Option<WidgetId> {
        let _guard = IterationGuard::new(&self.iterating);
        // iterate in reverse so the most on-top object of equal tiers wins
        for element in self.elements.iter().rev() {
            if let Some(picked) = element.pick(cursor, origin) {
                return Some(picked);
            }
        }
        None
    }

    pub(crate) fn render_all(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
        events: &mut FrameEvents,
    ) {
        let _guard = IterationGuard::new(&self.iterating);
        for element in &mut self.elements {
            element.render(backend, ctx, origin, events);
        }
    }

    pub(crate) fn update_layout_all(&mut self, parent_size: Size) {
        let _guard = IterationGuard::new(&self.iterating);
        for element in &mut self.elements {
            element.update_layout(parent_size);
        }
    }

    pub(crate) fn refresh_all(&mut self) {
        let _guard = IterationGuard::new(&self.iterating);
        for element in &mut self.elements {
            element.refresh();
        }
    }

    pub(crate) fn destroy_buffers_all(&mut self, backend: &mut dyn RenderBackend) {
        let _guard = IterationGuard::new(&self.iterating);
        for element in &mut self.elements {
            element.destroy_buffers(backend);
        }
    }
}
