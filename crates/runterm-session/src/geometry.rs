//! Viewport geometry: pixel measurements to character-grid capacity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Viewport and character-cell measurements reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelGeometry {
    pub width: f64,
    pub height: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl PixelGeometry {
    #[must_use]
    pub const fn new(width: f64, height: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            width,
            height,
            cell_width,
            cell_height,
        }
    }

    /// Whole cells that fit, minus the reserved margins.
    ///
    /// Degenerate measurements (zero or non-finite cell sizes) yield `None`.
    #[must_use]
    pub fn grid_size(&self, reserved_rows: u16, reserved_cols: u16) -> Option<GridSize> {
        let rows = cells(self.height, self.cell_height)?;
        let cols = cells(self.width, self.cell_width)?;
        Some(GridSize {
            rows: rows.saturating_sub(reserved_rows).max(1),
            cols: cols.saturating_sub(reserved_cols).max(1),
        })
    }
}

fn cells(extent: f64, cell: f64) -> Option<u16> {
    if !cell.is_finite() || cell <= 0.0 || !extent.is_finite() || extent < 0.0 {
        return None;
    }
    let count = (extent / cell).floor();
    Some(if count >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        count as u16
    })
}

/// Character-grid dimensions sent to the remote side on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u16,
    pub cols: u16,
}

impl GridSize {
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Status line announced when the geometry changes.
    #[must_use]
    pub fn announcement(&self) -> String {
        format!("New geometry is {self}.")
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows, {} columns", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_cells_only() {
        let geometry = PixelGeometry::new(805.0, 490.0, 10.0, 20.0);
        assert_eq!(geometry.grid_size(0, 0), Some(GridSize::new(24, 80)));
    }

    #[test]
    fn reserved_margins_are_subtracted() {
        let geometry = PixelGeometry::new(800.0, 480.0, 10.0, 20.0);
        assert_eq!(geometry.grid_size(5, 3), Some(GridSize::new(19, 77)));
    }

    #[test]
    fn never_below_one_cell() {
        let geometry = PixelGeometry::new(5.0, 5.0, 10.0, 20.0);
        assert_eq!(geometry.grid_size(2, 2), Some(GridSize::new(1, 1)));
    }

    #[test]
    fn degenerate_cells_are_rejected() {
        assert_eq!(PixelGeometry::new(800.0, 480.0, 0.0, 20.0).grid_size(0, 0), None);
        assert_eq!(
            PixelGeometry::new(f64::NAN, 480.0, 10.0, 20.0).grid_size(0, 0),
            None
        );
    }

    #[test]
    fn announcement_text() {
        assert_eq!(
            GridSize::new(19, 77).announcement(),
            "New geometry is 19 rows, 77 columns."
        );
    }
}
