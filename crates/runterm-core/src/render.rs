//! Render events: the write-only interface towards whatever draws the screen.
//!
//! The screen buffer is the only source of truth. Mutations queue events that
//! name *what* changed; a [`RenderSink`] receives them together with a shared
//! reference to the screen so it can read the current contents of a changed
//! row. Sinks never feed state back into the model.

use crate::cursor::Cursor;
use crate::screen::Screen;

/// One change to the visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// A new row was appended (1-based index).
    RowCreated { row: usize },
    /// The runs of an existing row changed.
    RowChanged { row: usize },
    /// Every row from `from` (1-based, inclusive) onwards was removed.
    RowsRemoved { from: usize },
    /// The screen was reset to a single empty row.
    ScreenCleared,
    /// The cursor moved.
    CursorMoved(Cursor),
    /// Cursor visibility changed.
    CursorVisibility(bool),
    /// BEL was received.
    Bell,
    /// The window title changed.
    TitleChanged(String),
    /// The session URL changed.
    UrlChanged(String),
}

impl RenderEvent {
    /// Row touched by this event, if it is a row event.
    #[must_use]
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::RowCreated { row } | Self::RowChanged { row } => Some(*row),
            Self::RowsRemoved { from } => Some(*from),
            _ => None,
        }
    }
}

/// Consumer of render events.
pub trait RenderSink {
    /// Apply one event. `screen` reflects the state after the whole batch the
    /// event belongs to.
    fn apply(&mut self, event: &RenderEvent, screen: &Screen);
}

impl<F> RenderSink for F
where
    F: FnMut(&RenderEvent, &Screen),
{
    fn apply(&mut self, event: &RenderEvent, screen: &Screen) {
        self(event, screen);
    }
}

/// Queue of pending events with light coalescing.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventQueue {
    events: Vec<RenderEvent>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: RenderEvent) {
        match (&event, self.events.last_mut()) {
            // Repeated changes to one row and consecutive cursor moves collapse.
            (RenderEvent::RowChanged { row }, Some(RenderEvent::RowChanged { row: last }))
                if row == last => {}
            (RenderEvent::CursorMoved(cursor), Some(RenderEvent::CursorMoved(last))) => {
                *last = *cursor;
            }
            _ => self.events.push(event),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop queued row and cursor events; used when the whole screen is
    /// replaced so sinks never see indices of rows that no longer exist.
    pub(crate) fn discard_screen_events(&mut self) {
        self.events
            .retain(|e| e.row().is_none() && !matches!(e, RenderEvent::CursorMoved(_)));
    }

    pub(crate) fn drain(&mut self) -> Vec<RenderEvent> {
        core::mem::take(&mut self.events)
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_row_changes_collapse() {
        let mut queue = EventQueue::default();
        queue.push(RenderEvent::RowChanged { row: 1 });
        queue.push(RenderEvent::RowChanged { row: 1 });
        queue.push(RenderEvent::RowChanged { row: 2 });
        queue.push(RenderEvent::RowChanged { row: 1 });
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn cursor_moves_keep_latest() {
        let mut queue = EventQueue::default();
        queue.push(RenderEvent::CursorMoved(Cursor::at(1, 2)));
        queue.push(RenderEvent::CursorMoved(Cursor::at(1, 5)));
        assert_eq!(
            queue.drain(),
            vec![RenderEvent::CursorMoved(Cursor::at(1, 5))]
        );
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn discard_keeps_non_screen_events() {
        let mut queue = EventQueue::default();
        queue.push(RenderEvent::RowCreated { row: 2 });
        queue.push(RenderEvent::Bell);
        queue.push(RenderEvent::CursorMoved(Cursor::at(2, 1)));
        queue.discard_screen_events();
        assert_eq!(queue.drain(), vec![RenderEvent::Bell]);
    }

    #[test]
    fn row_accessor() {
        assert_eq!(RenderEvent::RowCreated { row: 3 }.row(), Some(3));
        assert_eq!(RenderEvent::Bell.row(), None);
    }
}
