use floodgate_core::{CellColor, CellCoord, CellTag};

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    color: CellColor,
    tag: Option<CellTag>,
    glyph: Option<char>,
    rounded: bool,
}

impl Cell {
    const fn filled(color: CellColor) -> Self {
        Self {
            color,
            tag: None,
            glyph: None,
            rounded: false,
        }
    }

    /// Color currently painted onto the cell.
    #[must_use]
    pub const fn color(&self) -> CellColor {
        self.color
    }

    /// Semantic tag attached to the cell, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<CellTag> {
        self.tag
    }

    /// Glyph drawn on top of the cell, if any.
    #[must_use]
    pub const fn glyph(&self) -> Option<char> {
        self.glyph
    }

    /// Whether the cell is drawn as a round button.
    #[must_use]
    pub const fn is_rounded(&self) -> bool {
        self.rounded
    }
}

#[derive(Clone, Debug)]
pub(crate) struct CellGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub(crate) fn new(columns: u32, rows: u32, color: CellColor) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::filled(color); capacity],
        }
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn paint(&mut self, cell: CellCoord, color: CellColor) -> bool {
        self.with_cell(cell, |slot| slot.color = color)
    }

    pub(crate) fn tag(&mut self, cell: CellCoord, tag: Option<CellTag>) -> bool {
        self.with_cell(cell, |slot| slot.tag = tag)
    }

    pub(crate) fn decorate(&mut self, cell: CellCoord, glyph: Option<char>, rounded: bool) -> bool {
        self.with_cell(cell, |slot| {
            slot.glyph = glyph;
            slot.rounded = rounded;
        })
    }

    pub(crate) fn has_tag(&self, cell: CellCoord, tag: CellTag) -> bool {
        self.get(cell).is_some_and(|slot| slot.tag == Some(tag))
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn with_cell(&mut self, cell: CellCoord, update: impl FnOnce(&mut Cell)) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                update(slot);
                true
            }
            None => false,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CellGrid;
    use floodgate_core::{CellColor, CellCoord, CellTag};

    #[test]
    fn writes_outside_the_grid_are_rejected() {
        let mut grid = CellGrid::new(3, 3, CellColor::from_hex(0));
        assert!(!grid.paint(CellCoord::new(3, 0), CellColor::from_hex(0xff)));
        assert!(!grid.tag(CellCoord::new(0, 3), Some(CellTag::Gate)));
        assert!(grid.get(CellCoord::new(3, 3)).is_none());
    }

    #[test]
    fn tags_are_tracked_per_cell() {
        let mut grid = CellGrid::new(4, 2, CellColor::from_hex(0));
        assert!(grid.tag(CellCoord::new(3, 1), Some(CellTag::Gate)));
        assert!(grid.has_tag(CellCoord::new(3, 1), CellTag::Gate));
        assert!(!grid.has_tag(CellCoord::new(1, 3), CellTag::Gate));
        assert_eq!(grid.cells().len(), 8);
    }
}
