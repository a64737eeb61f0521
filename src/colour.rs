//! Colour state for widgets.
//!
//! Every widget carries a [`ColourSet`]: one colour group per interaction
//! state plus the `current` group that is actually drawn. Each frame the
//! current group is blended a step towards whichever state group the widget's
//! interaction state machine selects, so all colour changes fade rather than
//! snap.

use crate::geometry::Rgba;

/// Blend factor used when a widget becomes active (pressed). Fastest.
pub const BLEND_ACTIVE: f32 = 0.5;
/// Blend factor used while hovering.
pub const BLEND_HOVER: f32 = 0.25;
/// Blend factor used while focused but not hovered.
pub const BLEND_FOCUS: f32 = 0.1;
/// Blend factor used when returning to idle. Slowest.
pub const BLEND_IDLE: f32 = 0.05;

/// The three colours drawn for one interaction state.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ColourGroup {
    /// Solid fill of the element.
    pub background: Rgba,
    /// Outline box of the element.
    pub outline: Rgba,
    /// Text content of the element.
    pub content: Rgba,
}

impl ColourGroup {
    pub const fn new(background: Rgba, outline: Rgba, content: Rgba) -> Self {
        Self {
            background,
            outline,
            content,
        }
    }

    pub fn assign(&mut self, background: Rgba, outline: Rgba, content: Rgba) {
        self.background = background;
        self.outline = outline;
        self.content = content;
    }

    /// Blend each channel of this group a step towards `target`.
    pub fn blend_to(&mut self, target: &ColourGroup, factor: f32) {
        self.background = self.background.lerp(target.background, factor);
        self.outline = self.outline.lerp(target.outline, factor);
        self.content = self.content.lerp(target.content, factor);
    }
}

/// A complete set of colours for one widget.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ColourSet {
    /// Momentary colour of the element, what actually gets drawn.
    pub current: ColourGroup,

    /// Default colours at idle.
    pub idle: ColourGroup,
    /// Mouseover colours.
    pub hover: ColourGroup,
    /// Focus colours, when an element is selected for keyboard input.
    pub focus: ColourGroup,
    /// Active colours, while the mouse is pressed or text is being entered.
    pub active: ColourGroup,
}

impl ColourSet {
    pub const fn new(
        current: ColourGroup,
        idle: ColourGroup,
        hover: ColourGroup,
        focus: ColourGroup,
        active: ColourGroup,
    ) -> Self {
        Self {
            current,
            idle,
            hover,
            focus,
            active,
        }
    }

    /// Blend the current group towards an arbitrary target group.
    pub fn blend_to(&mut self, target: &ColourGroup, factor: f32) {
        self.current.blend_to(target, factor);
    }

    /// Shortcuts to blend towards the stored state groups.
    pub fn blend_to_idle(&mut self, factor: f32) {
        let target = self.idle;
        self.current.blend_to(&target, factor);
    }
    pub fn blend_to_hover(&mut self, factor: f32) {
        let target = self.hover;
        self.current.blend_to(&target, factor);
    }
    pub fn blend_to_focus(&mut self, factor: f32) {
        let target = self.focus;
        self.current.blend_to(&target, factor);
    }
    pub fn blend_to_active(&mut self, factor: f32) {
        let target = self.active;
        self.current.blend_to(&target, factor);
    }
}
