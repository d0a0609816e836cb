//! Cursor position.
//!
//! Both coordinates are 1-based. The row never exceeds the number of existing
//! rows plus one; the column is unbounded to the right.

use core::fmt;

/// Cursor position on the screen (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::home()
    }
}

impl Cursor {
    /// Top-left corner.
    #[must_use]
    pub const fn home() -> Self {
        Self { row: 1, col: 1 }
    }

    /// Cursor at the given position; zero coordinates are raised to 1.
    #[must_use]
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            row: row.max(1),
            col: col.max(1),
        }
    }

    /// Zero-based column index into a row.
    #[must_use]
    pub const fn col_index(&self) -> usize {
        self.col - 1
    }

    /// Zero-based row index into the screen.
    #[must_use]
    pub const fn row_index(&self) -> usize {
        self.row - 1
    }

    pub fn move_up(&mut self, count: usize) {
        self.row = self.row.saturating_sub(count).max(1);
    }

    pub fn move_left(&mut self, count: usize) {
        self.col = self.col.saturating_sub(count).max(1);
    }

    pub fn move_right(&mut self, count: usize) {
        self.col = self.col.saturating_add(count);
    }

    pub fn carriage_return(&mut self) {
        self.col = 1;
    }

    /// Column of the next tab stop (multiples of 8, 1-based: 9, 17, ...).
    #[must_use]
    pub const fn next_tab_stop(&self) -> usize {
        (self.col - 1) / 8 * 8 + 9
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_clamp_at_origin() {
        let mut cursor = Cursor::at(3, 4);
        cursor.move_up(10);
        cursor.move_left(10);
        assert_eq!(cursor, Cursor::home());
    }

    #[test]
    fn at_raises_zero() {
        assert_eq!(Cursor::at(0, 0), Cursor::home());
    }

    #[test]
    fn tab_stops() {
        assert_eq!(Cursor::at(1, 1).next_tab_stop(), 9);
        assert_eq!(Cursor::at(1, 8).next_tab_stop(), 9);
        assert_eq!(Cursor::at(1, 9).next_tab_stop(), 17);
        assert_eq!(Cursor::at(1, 12).next_tab_stop(), 17);
    }
}
