#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Floodgate puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! adapters to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

mod level;
mod path;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use level::{GateSpec, Level, LevelDefinition, LevelError, MAX_GRID_EXTENT, MIN_GRID_EXTENT};
pub use path::{PathToken, WaterPath};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Floodgate.";

/// Status text shown once a level other than the last one is complete.
pub const LEVEL_COMPLETE_TEXT: &str = "Level Complete!";

/// Status text shown once the final level of the catalog is complete.
pub const GAME_COMPLETE_TEXT: &str = "Game complete! Congratulations!";

/// Status text shown while hovering the reset control of a flowing level.
pub const RESET_HINT_TEXT: &str = "Reset water stream";

/// Status text shown while hovering the reset control of a completed level.
pub const NEXT_LEVEL_HINT_TEXT: &str = "Go to next level =>";

/// Number of host frames (at 60 Hz) between two flow ticks.
pub const TICK_FRAMES: u32 = 7;

/// Wall-clock interval between two flow ticks.
pub const TICK_INTERVAL: Duration = Duration::from_micros(TICK_FRAMES as u64 * 1_000_000 / 60);

/// Color of cells outside the carved puzzle area.
pub const WALL_COLOR: CellColor = CellColor::from_hex(0x00_00_00);

/// Color of carved, empty cells.
pub const BACKGROUND_COLOR: CellColor = CellColor::from_hex(0x20_21_26);

/// Color painted onto cells reached by water.
pub const WATER_COLOR: CellColor = CellColor::from_hex(0x42_85_F4);

/// Color of the reset control while the level is flowing.
pub const RESET_CONTROL_COLOR: CellColor = CellColor::from_hex(0xFF_FF_FF);

/// Color of the reset control once the level is complete.
pub const NEXT_CONTROL_COLOR: CellColor = CellColor::from_hex(0x00_77_00);

/// Glyph drawn on the reset control while the level is flowing.
pub const RESET_GLYPH: char = '\u{21BA}';

/// Glyph drawn on the reset control once the level is complete.
pub const NEXT_GLYPH: char = '\u{21D2}';

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Loads the catalog level at the provided index, wrapping past the end.
    LoadLevel {
        /// Zero-based index into the level catalog.
        index: usize,
    },
    /// Signals one host timer tick.
    Tick,
    /// Requests that a gate, and every gate it cascades to, be opened.
    OpenGate {
        /// Gate whose button was touched.
        gate: GateId,
    },
    /// Restores every gate and restarts the water at the start of the path.
    ResetLevel,
    /// Loads the level following the current one.
    AdvanceLevel,
    /// Paints a cell with water and tags it as such.
    FloodCell {
        /// Cell reached by the water.
        cell: CellCoord,
    },
    /// Paints a cell with water without tagging it; used for fork detours.
    SpillCell {
        /// Cell covered by the detour.
        cell: CellCoord,
    },
    /// Replaces the traversal cursor.
    MoveCursor {
        /// Cursor produced by the path interpreter.
        cursor: FlowCursor,
    },
    /// Marks the current level as complete.
    CompleteLevel,
    /// Replaces the status line text.
    SetStatus {
        /// Text to display.
        text: String,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a level was (re)loaded and is now flowing.
    LevelLoaded {
        /// Catalog index of the loaded level.
        index: usize,
    },
    /// Indicates that a tick reached a flowing level.
    TimeAdvanced {
        /// Number of ticks processed since the level was loaded.
        tick: u64,
    },
    /// Confirms that a cell was flooded.
    CellFlooded {
        /// Cell that now carries the water tag.
        cell: CellCoord,
    },
    /// Confirms that a detour cell was painted with water.
    CellSpilled {
        /// Cell painted by the detour.
        cell: CellCoord,
    },
    /// Confirms that the traversal cursor changed.
    CursorMoved {
        /// Cursor before the change.
        from: FlowCursor,
        /// Cursor after the change.
        to: FlowCursor,
    },
    /// Confirms that a gate stopped blocking the water.
    GateOpened {
        /// Identifier of the opened gate.
        gate: GateId,
        /// Cell the gate occupied.
        cell: CellCoord,
    },
    /// Announces that the water reached the end of its path.
    LevelCompleted {
        /// Catalog index of the completed level.
        index: usize,
        /// Whether the completed level is the last one of the catalog.
        final_level: bool,
    },
    /// Reports that the status line changed.
    StatusChanged {
        /// Text now displayed.
        text: String,
    },
    /// Requests that adapters play an audio cue.
    SoundPlayed {
        /// Cue to play.
        cue: SoundCue,
    },
}

/// Audio cues triggered by the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Played when the player resets the water stream.
    Scratch,
    /// Played when a gate button is pressed.
    Blip,
    /// Played when the water reaches the end of its path.
    Drip,
}

impl SoundCue {
    /// Name of the sound in the host engine's audio library.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scratch => "fx_scratch",
            Self::Blip => "fx_blip",
            Self::Drip => "fx_drip1",
        }
    }

    /// Playback volume in the range `0.0..=1.0`.
    #[must_use]
    pub const fn volume(self) -> f32 {
        match self {
            Self::Scratch => 0.3,
            Self::Blip | Self::Drip => 1.0,
        }
    }
}

/// Lifecycle phase of the loaded level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelPhase {
    /// Water advances on every tick.
    Flowing,
    /// Water reached the end of its path; ticks are ignored.
    Complete,
}

/// Semantic tag attached to a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellTag {
    /// The cell holds an active gate and blocks the water.
    Gate,
    /// The cell was reached by the water.
    Water,
}

/// RGB color applied to a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CellColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl CellColor {
    /// Creates a new color from a `0xRRGGBB` integer. Bits above 24 are ignored.
    #[must_use]
    pub const fn from_hex(value: u32) -> Self {
        Self {
            red: ((value >> 16) & 0xff) as u8,
            green: ((value >> 8) & 0xff) as u8,
            blue: (value & 0xff) as u8,
        }
    }

    /// Packs the color into a `0xRRGGBB` integer.
    #[must_use]
    pub const fn to_hex(self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }
}

/// Raised when a level file color does not fit into `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("color {0:#X} exceeds 0xFFFFFF")]
pub struct ColorOutOfRange(pub u32);

impl TryFrom<u32> for CellColor {
    type Error = ColorOutOfRange;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > 0xFF_FF_FF {
            return Err(ColorOutOfRange(value));
        }
        Ok(Self::from_hex(value))
    }
}

impl From<CellColor> for u32 {
    fn from(value: CellColor) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_hex())
    }
}

/// Cardinal directions the water can travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Parses a water path symbol (`^`, `>`, `v`, `<`).
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '^' => Some(Self::North),
            '>' => Some(Self::East),
            'v' => Some(Self::South),
            '<' => Some(Self::West),
            _ => None,
        }
    }

    /// Water path symbol describing the direction.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::North => '^',
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
        }
    }
}

/// Identifier of a gate, equal to its index within the level's gate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateId(u32);

impl GateId {
    /// Creates a new gate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the gate within the level's gate list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(alias = "x")]
    column: u32,
    #[serde(alias = "y")]
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the provided direction.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Traversal cursor of the water along its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowCursor {
    /// Cell currently holding the head of the water.
    pub cell: CellCoord,
    /// Index of the next token to interpret.
    pub index: usize,
    /// Whether the interpreter is inside a fork detour.
    pub on_branch: bool,
    /// Last cell painted by the current detour, if any.
    pub branch_head: Option<CellCoord>,
}

impl FlowCursor {
    /// Creates a cursor positioned at the first token of the level's path.
    #[must_use]
    pub fn at_start(level: &Level) -> Self {
        Self {
            cell: level.start(),
            index: 0,
            on_branch: false,
            branch_head: None,
        }
    }
}
