//! Fonts and their rasterised glyph caches.
//!
//! A [`Font`] pairs an opaque font binary with one point size and owns the
//! rasterised [`Glyph`] data for its character set. Glyphs live in a
//! [`GlyphArena`] and are referenced everywhere else by lightweight
//! [`GlyphIx`] handles, so words and lines built during text layout never
//! carry ownership of glyph data.
//!
//! Rasterisation is delegated to `fontdue`; the bitmaps land in the shared
//! [`Atlas`](crate::atlas::Atlas) owned by the gui root. Loading is lazy and
//! internally synchronised: the arena sits behind a `RwLock` so several
//! widgets may resolve glyphs from the same font while another thread is
//! arranging text.

use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::{RwLock, RwLockReadGuard};
use thiserror::Error;

use crate::atlas::{Atlas, AtlasError};
use crate::geometry::{Size, Vector};

/// Character set loaded when none is specified: all printable lower ascii
/// plus whitespace. Space must come first, it is the substitution glyph and
/// the reference for the tab advance.
pub const DEFAULT_CHARSET: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~\t\n\r";

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to parse font data: {0}")]
    Parse(&'static str),
    #[error("font provides no horizontal line metrics at size {0}")]
    NoMetrics(f32),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// Index of a glyph inside its font's [`GlyphArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphIx(u32);

/// One renderable character at one font and size.
///
/// Immutable once loaded. Blank glyphs advance the pen but are never
/// emitted into a vertex buffer; linebreak glyphs additionally force a new
/// line during layout.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// The character this glyph represents.
    pub codepoint: char,
    /// Invisible horizontal whitespace: advances the pen, draws nothing.
    pub blank: bool,
    /// Forces a line break after the word carrying this glyph.
    pub linebreak: bool,
    /// Lower-left corner of the bitmap quad relative to the pen.
    pub offset: Vector,
    /// Size of the bitmap quad.
    pub size: Size,
    /// Texcoord of the lower-left corner in the texture atlas.
    pub texcoord0: [f32; 2],
    /// Texcoord of the upper-right corner in the texture atlas.
    pub texcoord1: [f32; 2],
    /// How far this glyph moves the pen forward after it is placed.
    pub advance: Vector,
    /// Kerning adjustment keyed by the preceding character. Sparse, only
    /// non-zero pairs are stored.
    kerning: FxHashMap<char, f32>,
}

impl Glyph {
    /// Build a glyph by hand.
    ///
    /// Blank and linebreak flags are derived from the code point. Font
    /// loading does this internally; it is public for synthetic glyph
    /// sources that bypass rasterisation.
    pub fn new(codepoint: char, offset: Vector, size: Size, advance: Vector) -> Self {
        let (blank, linebreak) = classify(codepoint);
        Self {
            codepoint,
            blank,
            linebreak,
            offset,
            size,
            texcoord0: [0.0, 0.0],
            texcoord1: [0.0, 0.0],
            advance,
            kerning: FxHashMap::default(),
        }
    }

    pub fn with_texcoords(mut self, texcoord0: [f32; 2], texcoord1: [f32; 2]) -> Self {
        self.texcoord0 = texcoord0;
        self.texcoord1 = texcoord1;
        self
    }

    pub fn with_kerning(mut self, previous: char, kern: f32) -> Self {
        self.kerning.insert(previous, kern);
        self
    }

    /// Kerning for this glyph when preceded by `previous`.
    ///
    /// Zero when the pair has no adjustment. The NUL character marks the
    /// start of a pen walk and never kerns.
    pub fn kerning(&self, previous: char) -> f32 {
        if previous == '\0' {
            return 0.0;
        }
        self.kerning.get(&previous).copied().unwrap_or(0.0)
    }
}

/// Whitespace classification used when glyphs are loaded.
fn classify(codepoint: char) -> (bool, bool) {
    match codepoint {
        ' ' | '\t' => (true, false),
        '\n' | '\r' => (true, true),
        _ => (false, false),
    }
}

/// Owns the glyphs of one font; everyone else borrows by [`GlyphIx`].
#[derive(Default)]
pub struct GlyphArena {
    glyphs: Vec<Glyph>,
    index: FxHashMap<char, GlyphIx>,
}

impl GlyphArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Add a glyph and return its handle. Replaces any previous mapping for
    /// the same character.
    pub fn insert(&mut self, glyph: Glyph) -> GlyphIx {
        let ix = GlyphIx(self.glyphs.len() as u32);
        self.index.insert(glyph.codepoint, ix);
        self.glyphs.push(glyph);
        ix
    }

    /// Explicit lookup: found or missing, no substitution.
    pub fn get(&self, codepoint: char) -> Option<GlyphIx> {
        self.index.get(&codepoint).copied()
    }

    /// The space glyph, used as substitution and tab reference.
    pub fn space(&self) -> Option<GlyphIx> {
        self.get(' ')
    }

    /// Lookup with space substitution for unmapped characters.
    pub fn get_or_space(&self, codepoint: char) -> Option<GlyphIx> {
        match self.get(codepoint) {
            Some(ix) => Some(ix),
            None => {
                log::warn!(
                    "requested unmapped character {codepoint:?} (U+{:04X}), substituting space",
                    codepoint as u32
                );
                self.space()
            }
        }
    }

    /// Borrow glyph data by handle.
    ///
    /// # Panics
    /// When `ix` does not belong to this arena. Handles are only ever
    /// produced by the arena itself, so an out-of-range index is a caller
    /// bug, not a data condition.
    pub fn glyph(&self, ix: GlyphIx) -> &Glyph {
        &self.glyphs[ix.0 as usize]
    }

    fn clear(&mut self) {
        self.glyphs.clear();
        self.index.clear();
    }
}

/// Vertical metrics of a font at its loaded size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub ascender: f32,
    pub descender: f32,
    /// Baseline-to-baseline distance, the layout line spacing.
    pub height: f32,
    pub line_gap: f32,
}

/// A font binary loaded at one size, plus its rasterised glyph cache.
pub struct Font {
    name: String,
    /// Size in points this font is rasterised at.
    pub size: f32,
    charset: Vec<char>,
    face: fontdue::Font,
    metrics: FontMetrics,
    arena: RwLock<GlyphArena>,
}

impl Font {
    /// Parse a font from an opaque byte buffer at the given size.
    ///
    /// The data is parsed eagerly so metric queries never fail later;
    /// rasterisation into the atlas stays lazy.
    pub fn from_bytes(
        name: impl Into<String>,
        data: &[u8],
        size: f32,
    ) -> Result<Arc<Self>, FontError> {
        Self::with_charset(name, data, size, DEFAULT_CHARSET)
    }

    /// As [`from_bytes`](Self::from_bytes) with a custom character set.
    ///
    /// A space is prepended when missing; it is needed as the substitution
    /// glyph and the tab reference.
    pub fn with_charset(
        name: impl Into<String>,
        data: &[u8],
        size: f32,
        charset: &str,
    ) -> Result<Arc<Self>, FontError> {
        let face = fontdue::Font::from_bytes(
            data,
            fontdue::FontSettings {
                collection_index: 0,
                scale: size,
                load_substitutions: true,
            },
        )
        .map_err(FontError::Parse)?;

        let line = face
            .horizontal_line_metrics(size)
            .ok_or(FontError::NoMetrics(size))?;
        let metrics = FontMetrics {
            ascender: line.ascent,
            descender: line.descent,
            height: line.new_line_size,
            line_gap: line.line_gap,
        };

        let mut chars: Vec<char> = charset.chars().collect();
        if !chars.contains(&' ') {
            chars.insert(0, ' ');
        }

        Ok(Arc::new(Self {
            name: name.into(),
            size,
            charset: chars,
            face,
            metrics,
            arena: RwLock::new(GlyphArena::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Whether the glyph cache is currently populated.
    pub fn loaded(&self) -> bool {
        !self.arena.read().is_empty()
    }

    /// Shared read access to the glyph cache for layout and composition.
    pub fn arena(&self) -> RwLockReadGuard<'_, GlyphArena> {
        self.arena.read()
    }

    /// Load the glyph cache if it is empty.
    pub fn load_if_needed(&self, atlas: &mut Atlas) -> Result<(), FontError> {
        if self.loaded() {
            return Ok(());
        }
        self.load(atlas)
    }

    /// Rasterise the whole character set into `atlas`.
    ///
    /// On an atlas allocation failure the partial load is discarded and
    /// [`AtlasError::Full`] is reported so the owner can grow the atlas and
    /// retry. After a successful load the pairwise kerning tables are built
    /// from the face, keeping only non-zero entries.
    pub fn load(&self, atlas: &mut Atlas) -> Result<(), FontError> {
        let mut arena = self.arena.write();
        arena.clear();

        log::debug!(
            "loading font {} size {} ({} glyphs) into {}x{} atlas",
            self.name,
            self.size,
            self.charset.len(),
            atlas.size(),
            atlas.size()
        );

        for &codepoint in &self.charset {
            if let Err(e) = self.load_glyph(&mut arena, atlas, codepoint) {
                arena.clear();
                return Err(e);
            }
        }

        self.update_kerning(&mut arena);
        Ok(())
    }

    /// Drop the glyph cache; the next layout pass will reload it lazily.
    pub fn unload(&self) {
        self.arena.write().clear();
    }

    fn load_glyph(
        &self,
        arena: &mut GlyphArena,
        atlas: &mut Atlas,
        codepoint: char,
    ) -> Result<(), FontError> {
        let (metrics, bitmap) = self.face.rasterize(codepoint, self.size);
        let width = metrics.width as u32;
        let height = metrics.height as u32;

        // keep at least one blank texel between neighbouring glyphs
        let (x, y) = atlas
            .allocate(width + 1, height + 1)
            .ok_or(AtlasError::Full)?;
        if width > 0 && height > 0 {
            atlas.write(x, y, width, height, &bitmap);
        }

        let atlas_size = atlas.size() as f32;
        let mut glyph = Glyph::new(
            codepoint,
            Vector::new(metrics.xmin as f32, metrics.ymin as f32),
            Size::new(width as f32, height as f32),
            Vector::new(metrics.advance_width, 0.0),
        )
        .with_texcoords(
            // y is flipped for texture coords
            [x as f32 / atlas_size, (y + height) as f32 / atlas_size],
            [(x + width) as f32 / atlas_size, y as f32 / atlas_size],
        );
        if codepoint == '\t' {
            // use four spaces for a tab; space is always loaded first
            let space = arena.space().map(|ix| arena.glyph(ix).advance.x);
            glyph.advance.x = 4.0 * space.unwrap_or(metrics.advance_width);
        }

        arena.insert(glyph);
        Ok(())
    }

    fn update_kerning(&self, arena: &mut GlyphArena) {
        let codepoints: Vec<char> = arena.glyphs.iter().map(|g| g.codepoint).collect();
        for glyph in &mut arena.glyphs {
            glyph.kerning.clear();
            for &previous in &codepoints {
                if let Some(kern) = self.face.horizontal_kern(previous, glyph.codepoint, self.size)
                    && kern != 0.0
                {
                    glyph.kerning.insert(previous, kern);
                }
            }
        }
    }
}

/// The set of fonts owned by a gui root, with the default designation.
#[derive(Default)]
pub struct FontSet {
    fonts: Vec<Arc<Font>>,
    default: Option<usize>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Take shared ownership of a font.
    pub fn add(&mut self, font: Arc<Font>) -> Arc<Font> {
        self.fonts.push(Arc::clone(&font));
        font
    }

    /// Designate the default font recommended to widgets without their own.
    pub fn set_default(&mut self, font: &Arc<Font>) {
        self.default = self
            .fonts
            .iter()
            .position(|f| Arc::ptr_eq(f, font));
    }

    pub fn default_font(&self) -> Option<&Arc<Font>> {
        self.default.and_then(|ix| self.fonts.get(ix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Font>> {
        self.fonts.iter()
    }

    /// Resolve the font a widget should use.
    ///
    /// Falls from the widget's own font to the default, then to the first
    /// available font with a warning.
    ///
    /// # Panics
    /// When no font exists at all: a label cannot be laid out without one,
    /// and an empty font set at that point is a setup bug in the caller.
    pub fn resolve(&self, specific: Option<&Arc<Font>>) -> Arc<Font> {
        if let Some(font) = specific {
            return Arc::clone(font);
        }
        if let Some(font) = self.default_font() {
            return Arc::clone(font);
        }
        if let Some(font) = self.fonts.first() {
            log::warn!(
                "no default font set, defaulting to first entry: {} size {}",
                font.name(),
                font.size
            );
            return Arc::clone(font);
        }
        panic!("no font available");
    }

    /// Find a font of exactly the specified size.
    pub fn by_size(&self, size: f32) -> Option<&Arc<Font>> {
        self.fonts.iter().find(|f| f.size == size)
    }

    /// Find the font nearest in size to the one specified.
    pub fn by_size_or_nearest(&self, size: f32) -> Option<&Arc<Font>> {
        self.fonts
            .iter()
            .min_by(|a, b| {
                (a.size - size)
                    .abs()
                    .total_cmp(&(b.size - size).abs())
            })
    }

    /// Find the biggest font no bigger than the specified size.
    pub fn by_size_or_smaller(&self, size: f32) -> Option<&Arc<Font>> {
        self.fonts
            .iter()
            .filter(|f| f.size <= size)
            .max_by(|a, b| a.size.total_cmp(&b.size))
    }

    /// Find the smallest font no smaller than the specified size.
    pub fn by_size_or_bigger(&self, size: f32) -> Option<&Arc<Font>> {
        self.fonts
            .iter()
            .filter(|f| f.size >= size)
            .min_by(|a, b| a.size.total_cmp(&b.size))
    }
}
