//! Run-based screen buffer.
//!
//! The screen is an ordered list of rows; each row is an ordered list of
//! styled [`Run`]s. Rows are created lazily as the cursor moves past the last
//! one and are only removed by explicit erase/clear operations.
//!
//! Every mutation leaves each touched row *normalized*: no empty runs, and no
//! two adjacent runs with the same style. Column arithmetic is done in glyphs
//! (display columns), never in encoded bytes.
//!
//! Operations that address content that does not exist (erasing past the end
//! of a line, deleting on an empty row) are no-ops.

use crate::cursor::Cursor;
use crate::glyph::{self, Glyph};
use crate::render::{EventQueue, RenderEvent};
use crate::style::Style;

/// A maximal span of same-styled glyphs within one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    style: Style,
    glyphs: Vec<Glyph>,
}

impl Run {
    #[must_use]
    pub fn new(style: Style, glyphs: Vec<Glyph>) -> Self {
        Self { style, glyphs }
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Display columns covered by this run.
    #[must_use]
    pub fn width(&self) -> usize {
        self.glyphs.len()
    }

    /// Plain text of the run.
    #[must_use]
    pub fn text(&self) -> String {
        glyph::plain_text(&self.glyphs)
    }

    /// Escaped text of the run (placeholders as entities).
    #[must_use]
    pub fn encoded(&self) -> String {
        glyph::encoded_text(&self.glyphs)
    }
}

/// One screen line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    runs: Vec<Run>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Logical length in display columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.runs.iter().map(Run::width).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Concatenated plain text of all runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    /// Concatenated escaped text of all runs.
    #[must_use]
    pub fn encoded(&self) -> String {
        self.runs.iter().map(Run::encoded).collect()
    }

    /// Style of the glyph at a zero-based column.
    #[must_use]
    pub fn style_at(&self, index: usize) -> Option<Style> {
        let mut start = 0;
        for run in &self.runs {
            if index < start + run.width() {
                return Some(run.style);
            }
            start += run.width();
        }
        None
    }

    /// Whether no run is empty and no two neighbours share a style.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.runs.iter().all(|run| !run.glyphs.is_empty())
            && self.runs.windows(2).all(|pair| pair[0].style != pair[1].style)
    }

    // ── Mutation (zero-based columns) ───────────────────────────────

    /// Overwrite glyphs starting at `at`, padding with default blanks first
    /// when `at` lies past the end of the row.
    pub(crate) fn overwrite(&mut self, at: usize, glyphs: &[Glyph], style: Style) {
        if glyphs.is_empty() {
            return;
        }
        self.pad_to(at);
        let index = self.cut(at, at + glyphs.len());
        self.runs.insert(index, Run::new(style, glyphs.to_vec()));
        self.normalize();
    }

    /// Splice glyphs in at `at`, shifting the remainder right.
    pub(crate) fn insert(&mut self, at: usize, glyphs: &[Glyph], style: Style) {
        if glyphs.is_empty() {
            return;
        }
        self.pad_to(at);
        let index = self.split_at(at);
        self.runs.insert(index, Run::new(style, glyphs.to_vec()));
        self.normalize();
    }

    /// Drop everything from `at` to the end. Returns whether anything changed.
    pub(crate) fn truncate(&mut self, at: usize) -> bool {
        let width = self.width();
        if at >= width {
            return false;
        }
        self.cut(at, width);
        self.normalize();
        true
    }

    /// Replace columns `from..to` (clamped to the row) with default blanks.
    pub(crate) fn blank(&mut self, from: usize, to: usize) -> bool {
        let to = to.min(self.width());
        if from >= to {
            return false;
        }
        self.overwrite(from, &vec![Glyph::Blank; to - from], Style::DEFAULT);
        true
    }

    /// Remove `count` glyphs at `at`, shifting the remainder left.
    pub(crate) fn delete(&mut self, at: usize, count: usize) -> bool {
        if count == 0 || at >= self.width() {
            return false;
        }
        self.cut(at, at.saturating_add(count));
        self.normalize();
        true
    }

    /// Insert `count` default blanks at `at`, shifting the remainder right.
    pub(crate) fn insert_blanks(&mut self, at: usize, count: usize) -> bool {
        if count == 0 || at >= self.width() {
            return false;
        }
        self.insert(at, &vec![Glyph::Blank; count], Style::DEFAULT);
        true
    }

    /// Append default blanks until the row is `width` columns wide.
    pub(crate) fn pad_to(&mut self, width: usize) -> bool {
        let current = self.width();
        if width <= current {
            return false;
        }
        self.runs
            .push(Run::new(Style::DEFAULT, vec![Glyph::Blank; width - current]));
        self.normalize();
        true
    }

    /// Ensure a run boundary at column `at` (which must not exceed the
    /// width). Returns the index of the first run starting at `at`.
    fn split_at(&mut self, at: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            if at == start {
                return index;
            }
            let len = self.runs[index].width();
            if at < start + len {
                let tail = self.runs[index].glyphs.split_off(at - start);
                let style = self.runs[index].style;
                self.runs.insert(index + 1, Run::new(style, tail));
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Remove columns `from..to` (clamped). Returns the run index at the cut.
    fn cut(&mut self, from: usize, to: usize) -> usize {
        let to = to.min(self.width());
        let from = from.min(to);
        let first = self.split_at(from);
        let last = self.split_at(to);
        self.runs.drain(first..last);
        first
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.glyphs.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.style == run.style => last.glyphs.extend(run.glyphs),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// Direction of a relative cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The screen buffer: rows, cursor, and pending render events.
#[derive(Debug, Clone)]
pub struct Screen {
    rows: Vec<Row>,
    cursor: Cursor,
    events: EventQueue,
    max_rows: usize,
    max_cols: usize,
}

/// Default cap on the number of rows cursor movement may create.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Default cap on the column cursor movement and blank insertion may reach.
pub const DEFAULT_MAX_COLS: usize = 4_096;

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// One empty row with the cursor at (1, 1).
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_ROWS, DEFAULT_MAX_COLS)
    }

    /// Like [`Screen::new`], with explicit growth limits. Zero limits are
    /// raised to 1.
    #[must_use]
    pub fn with_limits(max_rows: usize, max_cols: usize) -> Self {
        Self {
            rows: vec![Row::new()],
            cursor: Cursor::home(),
            events: EventQueue::default(),
            max_rows: max_rows.max(1),
            max_cols: max_cols.max(1),
        }
    }

    #[must_use]
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    #[must_use]
    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row by 1-based index.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&Row> {
        row.checked_sub(1).and_then(|index| self.rows.get(index))
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Plain text of a row, if it exists.
    #[must_use]
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.row(row).map(Row::text)
    }

    /// Plain text of the whole screen, rows joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.rows.iter().map(Row::text).collect::<Vec<_>>().join("\n")
    }

    // ── Events ──────────────────────────────────────────────────────

    pub(crate) fn push_event(&mut self, event: RenderEvent) {
        self.events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<RenderEvent> {
        self.events.drain()
    }

    pub(crate) fn discard_events(&mut self) {
        self.events.clear();
    }

    fn row_changed(&mut self) {
        let row = self.cursor.row;
        self.events.push(RenderEvent::RowChanged { row });
    }

    fn cursor_moved(&mut self) {
        let cursor = self.cursor;
        self.events.push(RenderEvent::CursorMoved(cursor));
    }

    fn ensure_rows(&mut self, count: usize) {
        while self.rows.len() < count {
            self.rows.push(Row::new());
            let row = self.rows.len();
            self.events.push(RenderEvent::RowCreated { row });
        }
    }

    fn current_row(&mut self) -> Option<&mut Row> {
        self.rows.get_mut(self.cursor.row_index())
    }

    // ── Writing ─────────────────────────────────────────────────────

    /// Write glyphs at the cursor with `style`, inserting or overwriting, and
    /// advance the cursor by the number of glyphs.
    pub fn write(&mut self, glyphs: &[Glyph], style: Style, insert: bool) {
        if glyphs.is_empty() {
            return;
        }
        self.ensure_rows(self.cursor.row);
        let at = self.cursor.col_index();
        let index = self.cursor.row_index();
        let row = &mut self.rows[index];
        if insert {
            row.insert(at, glyphs, style);
        } else {
            row.overwrite(at, glyphs, style);
        }
        self.row_changed();
        self.cursor.move_right(glyphs.len());
        self.cursor_moved();
    }

    /// Advance one row, creating it if needed. The column is kept. On the
    /// last allowed row the cursor stays put and `false` is returned.
    pub fn new_line(&mut self) -> bool {
        if self.cursor.row >= self.max_rows {
            return false;
        }
        self.cursor.row += 1;
        self.ensure_rows(self.cursor.row);
        self.cursor_moved();
        true
    }

    pub fn carriage_return(&mut self) {
        if self.cursor.col != 1 {
            self.cursor.carriage_return();
            self.cursor_moved();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor.col > 1 {
            self.cursor.move_left(1);
            self.cursor_moved();
        }
    }

    // ── Erasing ─────────────────────────────────────────────────────

    /// Drop everything from the cursor to the end of the row.
    pub fn erase_to_end_of_line(&mut self) {
        let at = self.cursor.col_index();
        if self.current_row().is_some_and(|row| row.truncate(at)) {
            self.row_changed();
        }
    }

    /// Blank everything from the start of the row through the cursor column.
    pub fn erase_from_start_of_line(&mut self) {
        let to = self.cursor.col;
        if self.current_row().is_some_and(|row| row.blank(0, to)) {
            self.row_changed();
        }
    }

    /// Empty the current row.
    pub fn erase_line(&mut self) {
        if self.current_row().is_some_and(|row| row.truncate(0)) {
            self.row_changed();
        }
    }

    /// EL dispatch: 0 to end, 1 from start, 2 whole line. Returns `false` for
    /// an unknown mode.
    pub fn erase_in_line(&mut self, mode: u16) -> bool {
        match mode {
            0 => self.erase_to_end_of_line(),
            1 => self.erase_from_start_of_line(),
            2 => self.erase_line(),
            _ => return false,
        }
        true
    }

    /// Overwrite `count` columns at the cursor with blanks, without moving
    /// the cursor or extending the row.
    pub fn erase_chars(&mut self, count: usize) {
        let from = self.cursor.col_index();
        let to = from.saturating_add(count);
        if self.current_row().is_some_and(|row| row.blank(from, to)) {
            self.row_changed();
        }
    }

    /// Remove `count` glyphs at the cursor, shifting the rest of the row left.
    pub fn delete_chars(&mut self, count: usize) {
        let at = self.cursor.col_index();
        if self.current_row().is_some_and(|row| row.delete(at, count)) {
            self.row_changed();
        }
    }

    /// Insert `count` blanks at the cursor, shifting the rest of the row right.
    /// The row never grows past the column limit; returns `false` when
    /// `count` had to be cut short.
    pub fn insert_blanks(&mut self, count: usize) -> bool {
        let at = self.cursor.col_index();
        let max_cols = self.max_cols;
        let mut allowed = count;
        let changed = self.current_row().is_some_and(|row| {
            if at >= row.width() {
                return false;
            }
            allowed = count.min(max_cols.saturating_sub(row.width()));
            row.insert_blanks(at, allowed)
        });
        if changed {
            self.row_changed();
        }
        allowed == count
    }

    /// ED dispatch: 0 cursor to end, 1 start to cursor, 2 whole screen.
    /// Returns `false` (and changes nothing) for an unknown mode.
    pub fn clear(&mut self, mode: u16) -> bool {
        match mode {
            0 => self.clear_below(),
            1 => self.clear_above(),
            2 => self.clear_all(),
            _ => return false,
        }
        true
    }

    fn clear_below(&mut self) {
        self.erase_to_end_of_line();
        let keep = self.cursor.row;
        if self.rows.len() > keep {
            self.rows.truncate(keep);
            self.events.push(RenderEvent::RowsRemoved { from: keep + 1 });
        }
    }

    fn clear_above(&mut self) {
        let above = self.cursor.row_index().min(self.rows.len());
        for index in 0..above {
            let row = &mut self.rows[index];
            let width = row.width();
            if row.blank(0, width) {
                self.events.push(RenderEvent::RowChanged { row: index + 1 });
            }
        }
        self.erase_from_start_of_line();
    }

    fn clear_all(&mut self) {
        self.rows.clear();
        self.rows.push(Row::new());
        self.cursor = Cursor::home();
        self.events.discard_screen_events();
        self.events.push(RenderEvent::ScreenCleared);
        self.cursor_moved();
    }

    // ── Cursor positioning ──────────────────────────────────────────

    /// Move to an absolute position, creating rows up to `row` and padding the
    /// target row with default blanks when `col` lies past its end. Zero
    /// coordinates are treated as 1.
    ///
    /// Targets beyond the row or column limit are clamped to it, and `false`
    /// is returned.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> bool {
        let requested = Cursor::at(row, col);
        let target = Cursor::at(
            requested.row.min(self.max_rows),
            requested.col.min(self.max_cols),
        );
        self.ensure_rows(target.row);
        self.cursor = target;
        let index = target.row_index();
        if self.rows[index].pad_to(target.col_index()) {
            self.row_changed();
        }
        self.cursor_moved();
        target == requested
    }

    pub fn set_row(&mut self, row: usize) -> bool {
        self.set_cursor(row, self.cursor.col)
    }

    pub fn set_col(&mut self, col: usize) -> bool {
        self.set_cursor(self.cursor.row, col)
    }

    /// Relative move by `count` (at least 1). Up and left stop at 1; down and
    /// right stop at the limits.
    pub fn move_cursor(&mut self, direction: Direction, count: usize) -> bool {
        let count = count.max(1);
        let mut target = self.cursor;
        match direction {
            Direction::Up => target.move_up(count),
            Direction::Down => target.row = target.row.saturating_add(count),
            Direction::Left => target.move_left(count),
            Direction::Right => target.move_right(count),
        }
        self.set_cursor(target.row, target.col)
    }
}
