//! Text arrangement: from a label string to a list of wrapped lines.
//!
//! The pipeline follows three stages. The input string is decoded into code
//! points according to a [`DecodePolicy`], each code point is resolved to a
//! glyph and greedily accumulated into [`Word`]s, and the words are then
//! wrapped left to right into [`Line`]s, with an optional justification pass
//! distributing leftover width between words.
//!
//! Wrapping is the classic greedy single pass: decisions are made strictly
//! left to right with no backtracking, and a single word wider than the
//! available width overflows its line rather than being split.
//!
//! Everything here is pure CPU work over the font's glyph arena, so
//! arrangement can run on a worker thread while the render thread keeps
//! drawing previously composed buffers.

use crate::font::{FontMetrics, GlyphArena, GlyphIx};
use crate::geometry::Size;

/// How label bytes are decoded into code points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Reject invalid UTF-8 at ingestion; layout walks code points.
    #[default]
    Utf8Strict,
    /// Replace invalid sequences with U+FFFD at ingestion.
    Utf8Lossy,
    /// No decoding: every byte is treated as one code point.
    Raw,
}

impl DecodePolicy {
    /// Decode raw label bytes into an owned string under this policy.
    ///
    /// `None` means the bytes were rejected (strict mode only); the caller
    /// must leave its previous label untouched.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Option<String> {
        match self {
            DecodePolicy::Utf8Strict => match std::str::from_utf8(bytes) {
                Ok(text) => Some(text.to_owned()),
                Err(e) => {
                    log::error!("rejecting invalid utf-8 in label text: {e}");
                    None
                }
            },
            DecodePolicy::Utf8Lossy => Some(String::from_utf8_lossy(bytes).into_owned()),
            DecodePolicy::Raw => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    fn codepoints<'a>(&self, text: &'a str) -> Decoder<'a> {
        match self {
            DecodePolicy::Raw => Decoder::Bytes(text.bytes()),
            _ => Decoder::Chars(text.chars()),
        }
    }
}

enum Decoder<'a> {
    Chars(std::str::Chars<'a>),
    Bytes(std::str::Bytes<'a>),
}

impl Iterator for Decoder<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Decoder::Chars(chars) => chars.next(),
            Decoder::Bytes(bytes) => bytes.next().map(char::from),
        }
    }
}

/// Configuration flags honoured by one [`arrange`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrangeOptions {
    /// Collapse adjacent whitespace into a single run.
    pub merge_whitespace: bool,
    /// Collapse adjacent line breaks into a single newline.
    pub merge_newlines: bool,
    /// Wrap words to new lines when they exceed the content width.
    pub word_wrap: bool,
    /// Spread each wrapped line's words to fill the label width.
    pub justify_horizontal: bool,
    pub decode: DecodePolicy,
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        Self {
            merge_whitespace: true,
            merge_newlines: false,
            word_wrap: true,
            justify_horizontal: true,
            decode: DecodePolicy::default(),
        }
    }
}

/// One unbroken run of glyphs, the atomic unit for wrapping.
///
/// Words are transient: the line list is rebuilt wholesale on every
/// arrangement pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Word {
    pub glyphs: Vec<GlyphIx>,
    /// Whether a forced line break follows this word.
    pub linebreak: bool,
}

impl Word {
    /// Kerning-aware horizontal length of this word.
    ///
    /// The walk starts from an assumed preceding space so a word measures
    /// the same whether or not it follows one.
    pub fn length(&self, arena: &GlyphArena) -> f32 {
        let mut length = 0.0;
        let mut previous = ' ';
        for &ix in &self.glyphs {
            let glyph = arena.glyph(ix);
            length += glyph.advance.x + glyph.kerning(previous);
            previous = glyph.codepoint;
        }
        length
    }
}

/// A wrapped row of words.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
    /// Memoised sum of the word lengths; kept current as words are added.
    length: f32,
    /// Additional spacing between words, used in justification.
    pub spacing: f32,
    /// Whether this line ends in a forced break rather than a wrap. Break
    /// lines are exempt from justification.
    pub linebreak: bool,
}

impl Line {
    /// Cached horizontal length: the sum of the constituent word lengths.
    pub fn length(&self) -> f32 {
        self.length
    }

    fn push(&mut self, word: Word, length: f32) {
        self.words.push(word);
        self.length += length;
    }
}

/// The output of one arrangement pass over a label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arrangement {
    pub lines: Vec<Line>,
    /// Content bounds: width of the longest line, height of the stacked
    /// lines including a half line of headroom.
    pub size: Size,
    /// Vertical distance between consecutive baselines.
    pub line_spacing: f32,
    /// Number of non-blank glyphs; the composer emits exactly four vertices
    /// per visible glyph.
    pub visible_glyphs: usize,
}

impl Arrangement {
    pub fn is_empty(&self) -> bool {
        self.visible_glyphs == 0
    }
}

/// Arrange `text` into word-wrapped, justified lines.
///
/// Unmapped code points substitute the space glyph (with a warning); code
/// points that cannot resolve at all, because the arena holds no space
/// glyph either, are dropped. An empty string yields one empty line.
///
/// Calling this twice with unchanged inputs produces an equal structure.
pub fn arrange(
    text: &str,
    arena: &GlyphArena,
    metrics: &FontMetrics,
    content_width: f32,
    options: &ArrangeOptions,
) -> Arrangement {
    let line_spacing = metrics.height;

    // stage 1: greedy word accumulation
    let mut words: Vec<Word> = Vec::new();
    let mut current = Word::default();
    let mut visible_glyphs = 0usize;
    for (i, codepoint) in options.decode.codepoints(text).enumerate() {
        let Some(ix) = arena.get_or_space(codepoint) else {
            continue;
        };
        let glyph = arena.glyph(ix);

        let mut wordbreak_here = false;
        let mut printchar_here = true;
        if glyph.linebreak {
            current.linebreak = true;
            if !options.merge_newlines {
                wordbreak_here = true;
            }
            printchar_here = false;
        } else if i != 0
            // a transition out of whitespace starts a new word, unless
            // whitespace runs are being merged and this is more whitespace
            && let Some(&last) = current.glyphs.last()
            && arena.glyph(last).blank
            && (!glyph.blank || !options.merge_whitespace)
        {
            wordbreak_here = true;
        }

        if wordbreak_here {
            words.push(std::mem::take(&mut current));
        }
        if printchar_here {
            if !glyph.blank {
                visible_glyphs += 1;
            }
            current.glyphs.push(ix);
        }
    }
    words.push(current);

    // stage 2: greedy word-wrap, left to right, no backtracking
    let mut lines: Vec<Line> = Vec::new();
    let mut line = Line::default();
    let mut size = Size::new(0.0, line_spacing * 0.5); // one half line thickness minimum
    let mut hpos = 0.0;
    let word_count = words.len();
    for word in words {
        let word_length = word.length(arena);
        hpos += word_length;
        if options.word_wrap
            && word_count > 1
            && hpos > content_width
            && !line.words.is_empty()
        {
            // this word would break out of the permissible area, so it
            // starts a new line; a lone over-wide word simply overflows
            size.width = size.width.max(hpos - word_length);
            lines.push(std::mem::take(&mut line));
            hpos = word_length;
            size.height += line_spacing;
        }
        let forced_break = word.linebreak;
        line.push(word, word_length);
        if forced_break {
            // a forced break closes the line after the word carrying it
            size.width = size.width.max(hpos);
            line.linebreak = true;
            lines.push(std::mem::take(&mut line));
            hpos = 0.0;
            size.height += line_spacing;
        }
    }
    size.width = size.width.max(hpos);
    lines.push(line);

    // stage 3: justification, skipping the last line and any line that is
    // single-word or break-terminated
    if options.justify_horizontal && lines.len() > 1 {
        let max_width = size.width;
        let last = lines.len() - 1;
        for line in &mut lines[..last] {
            if line.words.len() > 1 && !line.linebreak {
                line.spacing = (max_width - line.length) / (line.words.len() - 1) as f32;
            }
        }
    }

    Arrangement {
        lines,
        size,
        line_spacing,
        visible_glyphs,
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Glyph;
    use crate::geometry::Vector;

    // Synthetic font: every letter advances 10, space advances 5.
    fn test_arena() -> GlyphArena {
        let mut arena = GlyphArena::new();
        for ch in [' ', '\t', '\n', '\r'] {
            let advance = if ch == '\t' { 20.0 } else { 5.0 };
            arena.insert(Glyph::new(
                ch,
                Vector::new(0.0, 0.0),
                Size::new(0.0, 0.0),
                Vector::new(advance, 0.0),
            ));
        }
        for ch in ('A'..='Z').chain('a'..='z') {
            arena.insert(Glyph::new(
                ch,
                Vector::new(0.0, -2.0),
                Size::new(8.0, 10.0),
                Vector::new(10.0, 0.0),
            ));
        }
        arena
    }

    fn test_metrics() -> FontMetrics {
        FontMetrics {
            ascender: 12.0,
            descender: -4.0,
            height: 16.0,
            line_gap: 0.0,
        }
    }

    fn arrange_simple(text: &str, width: f32, options: &ArrangeOptions) -> Arrangement {
        arrange(text, &test_arena(), &test_metrics(), width, options)
    }

    #[test]
    fn empty_string_yields_one_empty_line() {
        let arrangement = arrange_simple("", 100.0, &ArrangeOptions::default());
        assert_eq!(arrangement.lines.len(), 1);
        assert!(arrangement.lines[0].words[0].glyphs.is_empty());
        assert_eq!(arrangement.visible_glyphs, 0);
        assert!(arrangement.is_empty());
        assert_eq!(arrangement.size.width, 0.0);
        assert_eq!(arrangement.size.height, 8.0); // half a line of headroom
    }

    #[test]
    fn wrap_disabled_yields_single_line() {
        let options = ArrangeOptions {
            word_wrap: false,
            ..ArrangeOptions::default()
        };
        let arrangement = arrange_simple("several words that would never fit", 10.0, &options);
        assert_eq!(arrangement.lines.len(), 1);
    }

    #[test]
    fn explicit_breaks_yield_break_count_plus_one_lines() {
        let options = ArrangeOptions {
            word_wrap: false,
            ..ArrangeOptions::default()
        };
        let arrangement = arrange_simple("one\ntwo\nthree", 1000.0, &options);
        assert_eq!(arrangement.lines.len(), 3);
        assert!(arrangement.lines[0].linebreak);
        assert!(arrangement.lines[1].linebreak);
        assert!(!arrangement.lines[2].linebreak);
    }

    #[test]
    fn a_space_b_merges_into_two_words() {
        // 'A' advance 10, space advance 5, 'B' advance 10
        let options = ArrangeOptions {
            word_wrap: false,
            ..ArrangeOptions::default()
        };
        let arrangement = arrange_simple("A B", 1000.0, &options);
        assert_eq!(arrangement.lines.len(), 1);
        let line = &arrangement.lines[0];
        assert_eq!(line.words.len(), 2);
        assert_eq!(line.words[0].glyphs.len(), 2); // 'A' plus trailing space
        assert_eq!(line.words[1].glyphs.len(), 1);
        assert_eq!(line.length(), 25.0);
    }

    #[test]
    fn whitespace_merge_collapses_runs_into_one_word() {
        let merged = arrange_simple("A   B", 1000.0, &ArrangeOptions::default());
        assert_eq!(merged.lines[0].words.len(), 2);

        let split = arrange_simple(
            "A   B",
            1000.0,
            &ArrangeOptions {
                merge_whitespace: false,
                ..ArrangeOptions::default()
            },
        );
        // every blank-to-blank transition starts a new word as well
        assert_eq!(split.lines[0].words.len(), 4);
    }

    #[test]
    fn hello_world_round_trip() {
        // "Hello" = 50, trailing space 5, "World" = 50
        let wide = arrange_simple("Hello World", 200.0, &ArrangeOptions::default());
        assert_eq!(wide.lines.len(), 1);
        assert_eq!(wide.lines[0].words.len(), 2);

        // narrower than both words combined but wider than either alone
        let narrow = arrange_simple("Hello World", 80.0, &ArrangeOptions::default());
        assert_eq!(narrow.lines.len(), 2);
        assert_eq!(narrow.lines[0].words.len(), 1);
        assert_eq!(narrow.lines[1].words.len(), 1);
    }

    #[test]
    fn single_overwide_word_overflows_without_splitting() {
        let arrangement = arrange_simple("incomprehensibilities", 50.0, &ArrangeOptions::default());
        assert_eq!(arrangement.lines.len(), 1);
        assert!(arrangement.size.width > 50.0);
    }

    #[test]
    fn width_covers_widest_glyph() {
        let arrangement = arrange_simple("i", 1000.0, &ArrangeOptions::default());
        assert!(arrangement.size.width >= 10.0);
    }

    #[test]
    fn arrange_is_idempotent() {
        let arena = test_arena();
        let metrics = test_metrics();
        let options = ArrangeOptions::default();
        let first = arrange("The quick brown\nfox jumps", &arena, &metrics, 90.0, &options);
        let second = arrange("The quick brown\nfox jumps", &arena, &metrics, 90.0, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn justification_fills_to_max_width() {
        // wraps to "ab cd" (50 wide) over "efghijkl" (80 wide); the short
        // first line is spread to the label width
        let arrangement = arrange_simple("ab cd efghijkl", 50.0, &ArrangeOptions::default());
        assert_eq!(arrangement.lines.len(), 2);
        assert_eq!(arrangement.size.width, 80.0);
        let line = &arrangement.lines[0];
        assert_eq!(line.words.len(), 2);
        assert!(line.spacing > 0.0);
        let filled = line.length() + line.spacing * (line.words.len() - 1) as f32;
        assert!((filled - arrangement.size.width).abs() < 1e-4);
    }

    #[test]
    fn break_terminated_lines_are_not_justified() {
        let arrangement = arrange_simple("ab cd\nef gh ij kl mn op", 80.0, &ArrangeOptions::default());
        assert!(arrangement.lines.len() > 2);
        assert!(arrangement.lines[0].linebreak);
        assert_eq!(arrangement.lines[0].spacing, 0.0);
    }

    #[test]
    fn last_line_is_not_justified() {
        let arrangement = arrange_simple("ab cd ef gh", 55.0, &ArrangeOptions::default());
        assert_eq!(arrangement.lines.last().unwrap().spacing, 0.0);
    }

    #[test]
    fn line_length_matches_word_sum() {
        let arena = test_arena();
        let arrangement = arrange(
            "some words here",
            &arena,
            &test_metrics(),
            1000.0,
            &ArrangeOptions::default(),
        );
        for line in &arrangement.lines {
            let sum: f32 = line.words.iter().map(|w| w.length(&arena)).sum();
            assert!((line.length() - sum).abs() < 1e-5);
        }
    }

    #[test]
    fn height_counts_lines() {
        let arrangement = arrange_simple("a\nb\nc", 1000.0, &ArrangeOptions::default());
        assert_eq!(arrangement.lines.len(), 3);
        // half a line of headroom plus two full line feeds
        assert_eq!(arrangement.size.height, 16.0 * 0.5 + 2.0 * 16.0);
    }

    #[test]
    fn merge_newlines_collapses_blank_lines() {
        let options = ArrangeOptions {
            merge_newlines: true,
            word_wrap: false,
            ..ArrangeOptions::default()
        };
        let arrangement = arrange_simple("a\n\n\nb", 1000.0, &options);
        assert_eq!(arrangement.lines.len(), 2);
    }

    #[test]
    fn unmapped_codepoint_substitutes_space() {
        let arrangement = arrange_simple("A\u{3042}B", 1000.0, &ArrangeOptions::default());
        // the substituted space is blank, so only A and B are visible
        assert_eq!(arrangement.visible_glyphs, 2);
        // and it splits A and B into separate words like a real space
        assert_eq!(arrangement.lines[0].words.len(), 2);
    }

    #[test]
    fn raw_decode_walks_bytes() {
        let options = ArrangeOptions {
            decode: DecodePolicy::Raw,
            word_wrap: false,
            ..ArrangeOptions::default()
        };
        // multi-byte character decomposes into unmapped bytes, each
        // substituted by a space
        let arrangement = arrange_simple("\u{3042}", 1000.0, &options);
        assert_eq!(arrangement.visible_glyphs, 0);
        assert_eq!(arrangement.lines[0].words[0].glyphs.len(), 3);
    }

    #[test]
    fn decode_bytes_policies() {
        assert_eq!(
            DecodePolicy::Utf8Strict.decode_bytes(b"ok").as_deref(),
            Some("ok")
        );
        assert_eq!(DecodePolicy::Utf8Strict.decode_bytes(&[0xff, 0xfe]), None);
        assert_eq!(
            DecodePolicy::Utf8Lossy.decode_bytes(&[b'a', 0xff]).as_deref(),
            Some("a\u{fffd}")
        );
        assert_eq!(
            DecodePolicy::Raw.decode_bytes(&[b'a', 0xff]).as_deref(),
            Some("a\u{ff}")
        );
    }

    #[test]
    fn tab_advances_four_spaces() {
        // the test arena gives tab 4x the space advance, as font loading does
        let arrangement = arrange_simple("a\tb", 1000.0, &ArrangeOptions::default());
        // 10 + 20 + 10, tab is blank so only two glyphs are visible
        assert_eq!(arrangement.lines[0].length(), 40.0);
        assert_eq!(arrangement.visible_glyphs, 2);
    }

    #[test]
    fn kerning_affects_word_length() {
        let mut arena = GlyphArena::new();
        arena.insert(Glyph::new(
            ' ',
            Vector::new(0.0, 0.0),
            Size::new(0.0, 0.0),
            Vector::new(5.0, 0.0),
        ));
        arena.insert(Glyph::new(
            'A',
            Vector::new(0.0, 0.0),
            Size::new(8.0, 10.0),
            Vector::new(10.0, 0.0),
        ));
        arena.insert(
            Glyph::new(
                'V',
                Vector::new(0.0, 0.0),
                Size::new(8.0, 10.0),
                Vector::new(10.0, 0.0),
            )
            .with_kerning('A', -2.0),
        );

        let arrangement = arrange(
            "AV",
            &arena,
            &test_metrics(),
            1000.0,
            &ArrangeOptions::default(),
        );
        // 10 + (10 - 2); the word-leading 'A' kerns against an assumed space
        assert_eq!(arrangement.lines[0].length(), 18.0);
    }
}
