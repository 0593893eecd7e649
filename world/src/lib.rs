#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Floodgate.
//!
//! The world owns the cell grid (colors and tags), the loaded level and the
//! per-level run state. It is the only place where state changes; systems
//! read it through [`query`] and request changes with commands passed to
//! [`apply`].

mod catalog;
mod grid;

use floodgate_core::{
    CellCoord, CellTag, Command, Event, FlowCursor, GateId, Level, LevelPhase, SoundCue,
    BACKGROUND_COLOR, GAME_COMPLETE_TEXT, LEVEL_COMPLETE_TEXT, NEXT_CONTROL_COLOR, NEXT_GLYPH,
    RESET_CONTROL_COLOR, RESET_GLYPH, WALL_COLOR, WATER_COLOR, WELCOME_BANNER,
};
use log::{debug, info, warn};

pub use catalog::{Catalog, CatalogError};
pub use grid::Cell;

use grid::CellGrid;

/// Mutable per-level state: traversal cursor, gate activity and phase.
///
/// Reset wholesale whenever a level is (re)loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RunState {
    cursor: FlowCursor,
    gates_active: Vec<bool>,
    phase: LevelPhase,
}

impl RunState {
    fn for_level(level: &Level) -> Self {
        Self {
            cursor: FlowCursor::at_start(level),
            gates_active: vec![true; level.gates().len()],
            phase: LevelPhase::Flowing,
        }
    }
}

/// Represents the authoritative Floodgate world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: Catalog,
    level_index: usize,
    grid: CellGrid,
    run: RunState,
    status: String,
    tick_index: u64,
}

impl World {
    /// Creates a world with the first catalog level loaded and flowing.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let level = catalog.get(0).expect("catalog is never empty").clone();
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid: CellGrid::new(level.width(), level.height(), WALL_COLOR),
            run: RunState::for_level(&level),
            status: String::new(),
            catalog,
            level_index: 0,
            tick_index: 0,
        };
        let mut events = Vec::new();
        world.load_level(0, &mut events);
        world
    }

    fn level(&self) -> &Level {
        self.catalog
            .get(self.level_index)
            .expect("level index always refers to a catalog entry")
    }

    fn load_level(&mut self, index: usize, out_events: &mut Vec<Event>) {
        self.level_index = index % self.catalog.len();
        let level = self.level().clone();

        self.grid = carve_level(&level);
        self.run = RunState::for_level(&level);
        self.tick_index = 0;

        for (position, symbol) in level.water_path().invalid_tokens() {
            warn!(
                "level {}: water path token {symbol:?} at {position} is not a direction",
                self.level_index
            );
        }
        info!(
            "loaded level {} ({})",
            self.level_index,
            level.name().unwrap_or("unnamed")
        );

        out_events.push(Event::LevelLoaded {
            index: self.level_index,
        });
        self.set_status(level.status_text().to_owned(), out_events);
    }

    fn set_status(&mut self, text: String, out_events: &mut Vec<Event>) {
        if self.status == text {
            return;
        }
        self.status.clone_from(&text);
        out_events.push(Event::StatusChanged { text });
    }

    fn open_gate(&mut self, gate: GateId, out_events: &mut Vec<Event>) {
        let Some(spec) = self.level().gate(gate).cloned() else {
            warn!("ignoring request to open unknown gate {}", gate.get());
            return;
        };
        if !self.gate_active(gate) {
            return;
        }

        out_events.push(Event::SoundPlayed {
            cue: SoundCue::Blip,
        });
        self.deactivate(gate, out_events);
        for target in spec.also_opens {
            if self.gate_active(target) {
                self.deactivate(target, out_events);
            }
        }
    }

    fn gate_active(&self, gate: GateId) -> bool {
        self.run
            .gates_active
            .get(gate.index())
            .copied()
            .unwrap_or(false)
    }

    fn deactivate(&mut self, gate: GateId, out_events: &mut Vec<Event>) {
        let Some(spec) = self.level().gate(gate).cloned() else {
            return;
        };
        if let Some(active) = self.run.gates_active.get_mut(gate.index()) {
            *active = false;
        }

        let _ = self.grid.tag(spec.gate, None);
        let _ = self.grid.paint(spec.gate, BACKGROUND_COLOR);
        let _ = self.grid.paint(spec.button, BACKGROUND_COLOR);
        debug!("gate {} at {} opened", gate.get(), spec.gate);
        out_events.push(Event::GateOpened {
            gate,
            cell: spec.gate,
        });
    }

    fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        if self.run.phase == LevelPhase::Complete {
            return;
        }
        self.run.phase = LevelPhase::Complete;

        let final_level = self.level_index + 1 == self.catalog.len();
        let control = self.level().reset_control();
        let _ = self.grid.paint(control, NEXT_CONTROL_COLOR);
        let _ = self.grid.decorate(control, Some(NEXT_GLYPH), true);

        info!(
            "level {} complete after {} ticks",
            self.level_index, self.tick_index
        );
        out_events.push(Event::LevelCompleted {
            index: self.level_index,
            final_level,
        });
        let text = if final_level {
            GAME_COMPLETE_TEXT
        } else {
            LEVEL_COMPLETE_TEXT
        };
        self.set_status(text.to_owned(), out_events);
        out_events.push(Event::SoundPlayed {
            cue: SoundCue::Drip,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { index } => world.load_level(index, out_events),
        Command::Tick => {
            if world.run.phase != LevelPhase::Flowing {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::OpenGate { gate } => world.open_gate(gate, out_events),
        Command::ResetLevel => {
            out_events.push(Event::SoundPlayed {
                cue: SoundCue::Scratch,
            });
            world.load_level(world.level_index, out_events);
        }
        Command::AdvanceLevel => {
            let next = world.catalog.next_index(world.level_index);
            world.load_level(next, out_events);
        }
        Command::FloodCell { cell } => {
            if world.grid.paint(cell, WATER_COLOR) {
                let _ = world.grid.tag(cell, Some(CellTag::Water));
                out_events.push(Event::CellFlooded { cell });
            } else {
                debug!("flood target {cell} lies outside the grid");
            }
        }
        Command::SpillCell { cell } => {
            if world.grid.paint(cell, WATER_COLOR) {
                out_events.push(Event::CellSpilled { cell });
            }
        }
        Command::MoveCursor { cursor } => {
            let from = world.run.cursor;
            if from != cursor {
                world.run.cursor = cursor;
                out_events.push(Event::CursorMoved { from, to: cursor });
            }
        }
        Command::CompleteLevel => world.complete_level(out_events),
        Command::SetStatus { text } => world.set_status(text, out_events),
    }
}

fn carve_level(level: &Level) -> CellGrid {
    let (width, height) = (level.width(), level.height());
    let mut grid = CellGrid::new(width, height, WALL_COLOR);

    let area_top = height - level.button_area_height() + 1;
    for row in area_top..height.saturating_sub(1) {
        for column in 1..width - 1 {
            let _ = grid.paint(CellCoord::new(column, row), BACKGROUND_COLOR);
        }
    }

    for cell in level.channel().iter().chain(level.detour()) {
        let _ = grid.paint(*cell, BACKGROUND_COLOR);
    }

    for gate in level.gates() {
        let _ = grid.paint(gate.gate, gate.color);
        let _ = grid.tag(gate.gate, Some(CellTag::Gate));
        let _ = grid.paint(gate.button, gate.color);
        let _ = grid.decorate(gate.button, None, true);
    }

    let control = level.reset_control();
    let _ = grid.paint(control, RESET_CONTROL_COLOR);
    let _ = grid.decorate(control, Some(RESET_GLYPH), true);

    grid
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Cell, World};
    use floodgate_core::{CellCoord, CellTag, FlowCursor, GateId, Level, LevelPhase};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the loaded level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        world.level()
    }

    /// Catalog index of the loaded level.
    #[must_use]
    pub fn level_index(world: &World) -> usize {
        world.level_index
    }

    /// Number of levels available in the catalog.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.catalog.len()
    }

    /// Current traversal cursor.
    #[must_use]
    pub fn cursor(world: &World) -> FlowCursor {
        world.run.cursor
    }

    /// Lifecycle phase of the loaded level.
    #[must_use]
    pub fn phase(world: &World) -> LevelPhase {
        world.run.phase
    }

    /// Reports whether the gate still blocks the water.
    #[must_use]
    pub fn gate_active(world: &World, gate: GateId) -> bool {
        world.gate_active(gate)
    }

    /// Reports whether the cell carries the gate tag.
    #[must_use]
    pub fn is_gate(world: &World, cell: CellCoord) -> bool {
        world.grid.has_tag(cell, CellTag::Gate)
    }

    /// Contents of a single cell.
    #[must_use]
    pub fn cell(world: &World, cell: CellCoord) -> Option<&Cell> {
        world.grid.get(cell)
    }

    /// Text currently shown on the status line.
    #[must_use]
    pub fn status_text(world: &World) -> &str {
        &world.status
    }

    /// Number of ticks processed since the level was loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Exposes a read-only view of the cell grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        let (columns, rows) = world.grid.dimensions();
        GridView {
            cells: world.grid.cells(),
            columns,
            rows,
        }
    }

    /// Read-only view into the dense cell grid.
    #[derive(Clone, Copy, Debug)]
    pub struct GridView<'a> {
        cells: &'a [Cell],
        columns: u32,
        rows: u32,
    }

    impl<'a> GridView<'a> {
        /// Provides the dimensions of the grid as `(columns, rows)`.
        #[must_use]
        pub const fn dimensions(&self) -> (u32, u32) {
            (self.columns, self.rows)
        }

        /// Iterates over the rows of the grid from top to bottom.
        pub fn rows(&self) -> impl Iterator<Item = &'a [Cell]> + 'a {
            let width = usize::try_from(self.columns).unwrap_or(0).max(1);
            self.cells.chunks(width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodgate_core::{CellColor, GateSpec, LevelDefinition, WaterPath};

    fn single_level(path: &str, gates: Vec<GateSpec>) -> Catalog {
        let definition = LevelDefinition {
            name: Some("test".to_owned()),
            width: 11,
            height: 11,
            button_area_height: 9,
            status_text: "Click the circle.".to_owned(),
            gates,
            start: CellCoord::new(1, 1),
            water_path: WaterPath::parse(path),
        };
        Catalog::from_definitions(vec![definition]).expect("valid catalog")
    }

    fn gate(column: u32, button_column: u32, also_opens: Vec<u32>) -> GateSpec {
        GateSpec {
            gate: CellCoord::new(column, 1),
            button: CellCoord::new(button_column, 7),
            color: CellColor::from_hex(0xFF0000),
            also_opens: also_opens.into_iter().map(GateId::new).collect(),
        }
    }

    #[test]
    fn loading_carves_path_gates_and_controls() {
        let world = World::new(single_level(">>>>>>>>", vec![gate(5, 5, Vec::new())]));

        let path_cell = query::cell(&world, CellCoord::new(3, 1)).expect("path cell");
        assert_eq!(path_cell.color(), BACKGROUND_COLOR);
        assert_eq!(path_cell.tag(), None);

        let wall = query::cell(&world, CellCoord::new(0, 0)).expect("wall cell");
        assert_eq!(wall.color(), WALL_COLOR);

        assert!(query::is_gate(&world, CellCoord::new(5, 1)));
        let button = query::cell(&world, CellCoord::new(5, 7)).expect("button cell");
        assert!(button.is_rounded());
        assert_eq!(button.color(), CellColor::from_hex(0xFF0000));

        let control = query::cell(&world, CellCoord::new(9, 9)).expect("control cell");
        assert_eq!(control.glyph(), Some(RESET_GLYPH));
        assert_eq!(query::status_text(&world), "Click the circle.");
        assert_eq!(query::phase(&world), LevelPhase::Flowing);
    }

    #[test]
    fn button_area_is_framed_by_wall() {
        let world = World::new(single_level(">", Vec::new()));
        let inside = query::cell(&world, CellCoord::new(1, 3)).expect("cell");
        let frame = query::cell(&world, CellCoord::new(0, 3)).expect("cell");
        let above = query::cell(&world, CellCoord::new(1, 2)).expect("cell");
        assert_eq!(inside.color(), BACKGROUND_COLOR);
        assert_eq!(frame.color(), WALL_COLOR);
        assert_eq!(above.color(), WALL_COLOR);
    }

    #[test]
    fn opening_a_gate_cascades_in_the_same_command() {
        let mut world = World::new(single_level(
            ">>>>>>>>",
            vec![gate(4, 5, vec![1]), gate(7, 3, Vec::new())],
        ));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::OpenGate {
                gate: GateId::new(0),
            },
            &mut events,
        );

        assert!(!query::is_gate(&world, CellCoord::new(4, 1)));
        assert!(!query::is_gate(&world, CellCoord::new(7, 1)));
        assert!(!query::gate_active(&world, GateId::new(1)));
        let cascaded = query::cell(&world, CellCoord::new(7, 1)).expect("gate cell");
        assert_eq!(cascaded.color(), BACKGROUND_COLOR);
        assert_eq!(
            events,
            vec![
                Event::SoundPlayed {
                    cue: SoundCue::Blip
                },
                Event::GateOpened {
                    gate: GateId::new(0),
                    cell: CellCoord::new(4, 1),
                },
                Event::GateOpened {
                    gate: GateId::new(1),
                    cell: CellCoord::new(7, 1),
                },
            ]
        );
    }

    #[test]
    fn opening_an_inactive_gate_is_ignored() {
        let mut world = World::new(single_level(">>>>", vec![gate(3, 5, Vec::new())]));
        let mut events = Vec::new();
        let command = Command::OpenGate {
            gate: GateId::new(0),
        };
        apply(&mut world, command.clone(), &mut events);
        events.clear();
        apply(&mut world, command, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn reset_restores_gates_and_cursor() {
        let mut world = World::new(single_level(">>>>", vec![gate(3, 5, Vec::new())]));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::OpenGate {
                gate: GateId::new(0),
            },
            &mut events,
        );
        let moved = FlowCursor {
            cell: CellCoord::new(3, 1),
            index: 2,
            on_branch: false,
            branch_head: None,
        };
        apply(&mut world, Command::MoveCursor { cursor: moved }, &mut events);
        apply(
            &mut world,
            Command::FloodCell {
                cell: CellCoord::new(2, 1),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::ResetLevel, &mut events);

        assert!(query::gate_active(&world, GateId::new(0)));
        assert!(query::is_gate(&world, CellCoord::new(3, 1)));
        let cursor = query::cursor(&world);
        assert_eq!(cursor.cell, CellCoord::new(1, 1));
        assert_eq!(cursor.index, 0);
        let flooded = query::cell(&world, CellCoord::new(2, 1)).expect("cell");
        assert_eq!(flooded.tag(), None);
        assert_eq!(
            events.first(),
            Some(&Event::SoundPlayed {
                cue: SoundCue::Scratch
            })
        );
        assert!(events.contains(&Event::LevelLoaded { index: 0 }));
    }

    #[test]
    fn ticks_stop_once_the_level_is_complete() {
        let mut world = World::new(single_level(">", Vec::new()));
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(events, vec![Event::TimeAdvanced { tick: 1 }]);

        events.clear();
        apply(&mut world, Command::CompleteLevel, &mut events);
        assert!(events.contains(&Event::StatusChanged {
            text: GAME_COMPLETE_TEXT.to_owned()
        }));
        assert!(events.contains(&Event::SoundPlayed {
            cue: SoundCue::Drip
        }));
        let control = query::cell(&world, CellCoord::new(9, 9)).expect("control");
        assert_eq!(control.color(), NEXT_CONTROL_COLOR);
        assert_eq!(control.glyph(), Some(NEXT_GLYPH));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn non_final_level_reports_level_complete() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::CompleteLevel, &mut events);
        assert_eq!(query::status_text(&world), LEVEL_COMPLETE_TEXT);
        assert!(events.contains(&Event::LevelCompleted {
            index: 0,
            final_level: false,
        }));
    }

    #[test]
    fn advancing_past_the_last_level_wraps() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { index: 3 }, &mut events);
        assert_eq!(query::level_index(&world), 3);
        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert_eq!(query::level_index(&world), 0);
        assert_eq!(query::status_text(&world), "Click the circle.");
    }

    #[test]
    fn grid_view_rows_match_level_dimensions() {
        let world = World::default();
        let view = query::grid_view(&world);
        assert_eq!(view.dimensions(), (11, 11));
        assert_eq!(view.rows().count(), 11);
        assert!(view.rows().all(|row| row.len() == 11));
    }
}
