//! Editable text field.
//!
//! The cursor is a character index into the label text. Its screen position
//! is found by walking the arranged line/word/glyph structure with the same
//! kerning and justification pen advancement the composer uses, so the
//! caret always lands where the glyphs actually are.

use std::sync::Arc;

use crate::colour::ColourSet;
use crate::font::{Font, FontSet};
use crate::geometry::{Point, Size};
use crate::render::{BufferId, RenderBackend, Vertex};
use crate::text;
use crate::widget::base::{FrameContext, FrameEvents, InteractionEdge, WidgetCore, quad_vertices};

pub struct InputText {
    pub core: WidgetCore,
    /// Cursor position as a character index into the label text.
    cursor: usize,
    /// Maximum label length in characters; longer text is trimmed on set.
    length_limit: usize,
    multiline: bool,
    cursor_stale: bool,
    cursor_point: Point,
    cursor_buffer: Option<BufferId>,
    cursor_indices: u32,
}

impl InputText {
    pub fn new(
        colours: ColourSet,
        label: &str,
        label_font: Option<Arc<Font>>,
        length_limit: usize,
        size: Size,
        position: Point,
    ) -> Self {
        let mut core = WidgetCore::new(colours, label, label_font, size, position);
        core.focusable = true;
        let mut input = Self {
            core,
            cursor: 0,
            length_limit,
            multiline: false,
            cursor_stale: true,
            cursor_point: Point::zero(),
            cursor_buffer: None,
            cursor_indices: 0,
        };
        input.set_length_limit(length_limit);
        input.cursor_end(); // wind the cursor to the end for input
        input
    }

    fn char_count(text: &str) -> usize {
        text.chars().count()
    }

    fn byte_index(text: &str, char_index: usize) -> usize {
        text.char_indices()
            .nth(char_index)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn length_limit(&self) -> usize {
        self.length_limit
    }

    /// Change the length limit, trimming the current text to fit it.
    pub fn set_length_limit(&mut self, limit: usize) {
        self.length_limit = limit;
        let text = self.core.label();
        if Self::char_count(&text) > limit {
            let end = Self::byte_index(&text, limit);
            self.core.set_label(&text[..end]);
            self.cursor = self.cursor.min(limit);
            self.cursor_stale = true;
        }
    }

    pub fn is_multiline_allowed(&self) -> bool {
        self.multiline
    }

    /// Toggle multi-line entry. Disabling it strips the current text at the
    /// first line break.
    pub fn set_multiline_allowed(&mut self, allowed: bool) {
        if self.multiline && !allowed {
            let text = self.core.label();
            if let Some(break_at) = text.find(['\n', '\r']) {
                self.core.set_label(&text[..break_at]);
                self.cursor = self.cursor.min(Self::char_count(&text[..break_at]));
                self.cursor_stale = true;
            }
        }
        self.multiline = allowed;
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, character: char) {
        if !self.multiline && (character == '\n' || character == '\r') {
            return;
        }
        let mut text = self.core.label();
        if Self::char_count(&text) >= self.length_limit {
            log::debug!("text input reached its length limit of {}", self.length_limit);
            return;
        }
        text.insert(Self::byte_index(&text, self.cursor), character);
        self.core.set_label(&text);
        self.cursor += 1;
        self.cursor_stale = true;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut text = self.core.label();
        self.cursor -= 1;
        text.remove(Self::byte_index(&text, self.cursor));
        self.core.set_label(&text);
        self.cursor_stale = true;
    }

    /// Delete the character after the cursor.
    pub fn delete(&mut self) {
        let mut text = self.core.label();
        if self.cursor == Self::char_count(&text) {
            return;
        }
        text.remove(Self::byte_index(&text, self.cursor));
        self.core.set_label(&text);
        self.cursor_stale = true;
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.cursor_stale = true;
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < Self::char_count(&self.core.label()) {
            self.cursor += 1;
            self.cursor_stale = true;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
        self.cursor_stale = true;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = Self::char_count(&self.core.label());
        self.cursor_stale = true;
    }

    /// Screen coordinate of the cursor, walking the arranged label.
    ///
    /// Repairs a dirty label layout first; the result is relative to the
    /// label origin computed by the last alignment pass.
    pub fn cursor_position(&self, fonts: &FontSet) -> Point {
        self.core.arrange_label(fonts);
        let font = fonts.resolve(self.core.label_font.as_ref());
        let arena = font.arena();
        self.core.with_arrangement(|arrangement, origin| {
            text::cursor_position(arrangement, &arena, origin, self.cursor)
        })
    }

    fn setup_cursor(&mut self, backend: &mut dyn RenderBackend, ctx: &FrameContext) {
        if self.cursor_stale {
            self.cursor_point = self.cursor_position(ctx.fonts);
            self.cursor_stale = false;
        }
        let quad = quad_vertices(self.cursor_point, Size::new(2.0, 10.0));
        let transformed: Vec<Vertex> = quad
            .iter()
            .map(|v| Vertex::new(
                backend.coord_transform(Point::new(v.coords[0], v.coords[1])),
                v.texcoords,
            ))
            .collect();
        let indices: Vec<u32> = match ctx.primitive_mode {
            crate::render::PrimitiveMode::Quads => vec![0, 1, 2, 3],
            crate::render::PrimitiveMode::Triangles => vec![0, 1, 2, 0, 2, 3],
        };
        let buffer = *self
            .cursor_buffer
            .get_or_insert_with(|| backend.create_buffer());
        backend.upload_buffer(buffer, &transformed, &indices);
        self.cursor_indices = indices.len() as u32;
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

        // the caret is only drawn while this field is selected for input
        let selected = ctx.input_field == Some(self.core.id());
        if selected && backend.is_active() {
            self.setup_cursor(backend, ctx);
            if self.cursor_indices != 0
                && let Some(buffer) = self.cursor_buffer
            {
                backend.draw_buffer(
                    buffer,
                    ctx.primitive_mode.draw_mode(),
                    self.cursor_indices,
                    self.core.colours.current.content,
                );
            }
        }

        if self.core.update(ctx, events) == InteractionEdge::Release {
            // claim keyboard input for this field
            events.select_input = Some(Some(self.core.id()));
        }
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(buffer) = self.cursor_buffer.take() {
            backend.destroy_buffer(buffer);
        }
        self.cursor_indices = 0;
        self.core.destroy_buffers(backend);
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn test_input(label: &str, limit: usize) -> InputText {
        InputText::new(
            ColourSet::default(),
            label,
            None,
            limit,
            Size::new(100.0, 20.0),
            Point::zero(),
        )
    }

    #[test]
    fn cursor_starts_at_end() {
        let input = test_input("abc", 10);
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn insert_advances_cursor() {
        let mut input = test_input("", 10);
        input.insert('h');
        input.insert('i');
        assert_eq!(input.core.label(), "hi");
        assert_eq!(input.cursor(), 2);

        input.cursor_home();
        input.insert('o');
        assert_eq!(input.core.label(), "ohi");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn insert_respects_length_limit() {
        let mut input = test_input("abcde", 5);
        input.insert('f');
        assert_eq!(input.core.label(), "abcde");
    }

    #[test]
    fn set_length_limit_trims() {
        let input = test_input("abcdefgh", 4);
        assert_eq!(input.core.label(), "abcd");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = test_input("abc", 10);
        input.backspace();
        assert_eq!(input.core.label(), "ab");
        assert_eq!(input.cursor(), 2);

        input.cursor_home();
        input.backspace(); // at start, no-op
        assert_eq!(input.core.label(), "ab");

        input.delete();
        assert_eq!(input.core.label(), "b");
        assert_eq!(input.cursor(), 0);

        input.cursor_end();
        input.delete(); // at end, no-op
        assert_eq!(input.core.label(), "b");
    }

    #[test]
    fn cursor_moves_clamp_to_text() {
        let mut input = test_input("ab", 10);
        input.cursor_right(); // already at end
        assert_eq!(input.cursor(), 2);
        input.cursor_left();
        input.cursor_left();
        input.cursor_left(); // already at start
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn multibyte_editing_works_on_chars() {
        let mut input = test_input("", 10);
        input.insert('a');
        input.insert('\u{3042}');
        input.insert('b');
        assert_eq!(input.core.label(), "a\u{3042}b");
        input.cursor_left();
        input.backspace(); // removes the multibyte char
        assert_eq!(input.core.label(), "ab");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn single_line_mode_strips_at_first_newline() {
        let mut input = test_input("", 20);
        input.set_multiline_allowed(true);
        for ch in "ab\ncd".chars() {
            input.insert(ch);
        }
        assert_eq!(input.core.label(), "ab\ncd");

        input.set_multiline_allowed(false);
        assert_eq!(input.core.label(), "ab");

        // newlines are rejected while single-line
        input.insert('\n');
        assert_eq!(input.core.label(), "ab");
    }
}
