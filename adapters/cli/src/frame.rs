//! ASCII presentation of the world grid.

use floodgate_core::{CellCoord, CellTag, LevelPhase, BACKGROUND_COLOR, WALL_COLOR, WATER_COLOR};
use floodgate_world::{query, Cell, World};

const WALL: char = '#';
const OPEN: char = '.';
const WATER: char = '~';
const GATE: char = 'X';
const BUTTON: char = 'o';
const HEAD: char = '@';
const OTHER: char = '?';

/// Renders the grid one text line per row, marking the water head while it
/// is still flowing.
pub(crate) fn render(world: &World) -> String {
    let view = query::grid_view(world);
    let head = (query::phase(world) == LevelPhase::Flowing).then(|| query::cursor(world).cell);

    let (columns, rows) = view.dimensions();
    let mut frame = String::with_capacity(((columns + 1) * rows) as usize);
    for (row, cells) in (0u32..).zip(view.rows()) {
        for (column, cell) in (0u32..).zip(cells) {
            let symbol = if head == Some(CellCoord::new(column, row)) {
                HEAD
            } else {
                symbol(cell)
            };
            frame.push(symbol);
        }
        frame.push('\n');
    }
    frame
}

fn symbol(cell: &Cell) -> char {
    if let Some(glyph) = cell.glyph() {
        return glyph;
    }
    match cell.tag() {
        Some(CellTag::Gate) => return GATE,
        Some(CellTag::Water) => return WATER,
        None => {}
    }
    if cell.is_rounded() && cell.color() != BACKGROUND_COLOR {
        return BUTTON;
    }
    match cell.color() {
        color if color == WALL_COLOR => WALL,
        color if color == BACKGROUND_COLOR => OPEN,
        color if color == WATER_COLOR => WATER,
        _ => OTHER,
    }
}
