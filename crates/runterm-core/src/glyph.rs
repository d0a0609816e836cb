//! Glyphs: the unit of content stored in a screen row.
//!
//! Every glyph occupies exactly one display column. Some glyphs are stored as
//! placeholders rather than raw characters: a blank is kept as a distinct
//! glyph (so erased or padded columns survive whitespace-collapsing renderers)
//! and the markup-significant characters `&`, `<` and `>` are kept in escaped
//! form. The encoded form of such a glyph is several bytes long while its
//! width stays one column, so column arithmetic must always go through
//! [`Glyph`] counts and never through encoded string lengths.

use core::fmt;

/// One display column of row content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// A literal character rendered as-is.
    Char(char),
    /// Blank placeholder (space, tab expansion, padding, erasure).
    Blank,
    /// Escaped `&`.
    Amp,
    /// Escaped `<`.
    Lt,
    /// Escaped `>`.
    Gt,
}

impl Glyph {
    /// Map a printable character to its stored glyph, applying the
    /// placeholder substitutions.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        match ch {
            ' ' => Self::Blank,
            '&' => Self::Amp,
            '<' => Self::Lt,
            '>' => Self::Gt,
            other => Self::Char(other),
        }
    }

    /// The character this glyph displays as.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Char(ch) => ch,
            Self::Blank => ' ',
            Self::Amp => '&',
            Self::Lt => '<',
            Self::Gt => '>',
        }
    }

    /// Markup-safe encoded form, suitable for HTML-like render surfaces.
    #[must_use]
    pub fn encoded(self) -> EncodedGlyph {
        EncodedGlyph(self)
    }

    /// Whether this glyph is the blank placeholder.
    #[must_use]
    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Blank)
    }
}

impl From<char> for Glyph {
    fn from(ch: char) -> Self {
        Self::from_char(ch)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Display adapter writing the escaped form of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedGlyph(Glyph);

impl fmt::Display for EncodedGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Glyph::Char(ch) => write!(f, "{ch}"),
            Glyph::Blank => f.write_str("&nbsp;"),
            Glyph::Amp => f.write_str("&amp;"),
            Glyph::Lt => f.write_str("&lt;"),
            Glyph::Gt => f.write_str("&gt;"),
        }
    }
}

/// Convert a string into glyphs, one per `char`.
#[must_use]
pub fn glyphs_of(text: &str) -> Vec<Glyph> {
    text.chars().map(Glyph::from_char).collect()
}

/// Plain text for a glyph slice (placeholders become their characters).
#[must_use]
pub fn plain_text(glyphs: &[Glyph]) -> String {
    glyphs.iter().map(|g| g.to_char()).collect()
}

/// Encoded text for a glyph slice (placeholders become escapes).
#[must_use]
pub fn encoded_text(glyphs: &[Glyph]) -> String {
    use fmt::Write;
    let mut out = String::with_capacity(glyphs.len());
    for glyph in glyphs {
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", glyph.encoded());
    }
    out
}
