#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure control system translating touches and hovers into world commands.

use floodgate_core::{
    CellCoord, Command, Event, GateId, Level, LevelPhase, GAME_COMPLETE_TEXT, LEVEL_COMPLETE_TEXT,
    NEXT_LEVEL_HINT_TEXT, RESET_HINT_TEXT,
};
use log::debug;

/// Input snapshot distilled from host-provided pointer events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInput {
    /// Cell touched (clicked) during this frame.
    pub touch: Option<CellCoord>,
    /// Cell the pointer entered during this frame.
    pub hover: Option<CellCoord>,
}

impl ControlInput {
    /// Input consisting of a single touch.
    #[must_use]
    pub const fn touch(cell: CellCoord) -> Self {
        Self {
            touch: Some(cell),
            hover: None,
        }
    }

    /// Input consisting of a single hover.
    #[must_use]
    pub const fn hover(cell: CellCoord) -> Self {
        Self {
            touch: None,
            hover: Some(cell),
        }
    }
}

/// Control system tracking the level phase from world events.
#[derive(Debug, Clone)]
pub struct Controls {
    phase: LevelPhase,
    completion_text: &'static str,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    /// Creates a control system for a freshly loaded level.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: LevelPhase::Flowing,
            completion_text: LEVEL_COMPLETE_TEXT,
        }
    }

    /// Consumes world events and input to emit control commands.
    ///
    /// The `gate_active` closure should mirror the world's
    /// `query::gate_active` helper.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        level: &Level,
        input: ControlInput,
        gate_active: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(GateId) -> bool,
    {
        for event in events {
            match event {
                Event::LevelLoaded { .. } => self.phase = LevelPhase::Flowing,
                Event::LevelCompleted { final_level, .. } => {
                    self.phase = LevelPhase::Complete;
                    self.completion_text = if *final_level {
                        GAME_COMPLETE_TEXT
                    } else {
                        LEVEL_COMPLETE_TEXT
                    };
                }
                _ => {}
            }
        }

        if let Some(cell) = input.hover {
            out.push(Command::SetStatus {
                text: self.hover_text(level, cell).to_owned(),
            });
        }

        if let Some(cell) = input.touch {
            self.touch(level, cell, gate_active, out);
        }
    }

    fn hover_text<'a>(&self, level: &'a Level, cell: CellCoord) -> &'a str {
        match (cell == level.reset_control(), self.phase) {
            (true, LevelPhase::Flowing) => RESET_HINT_TEXT,
            (true, LevelPhase::Complete) => NEXT_LEVEL_HINT_TEXT,
            (false, LevelPhase::Flowing) => level.status_text(),
            (false, LevelPhase::Complete) => self.completion_text,
        }
    }

    fn touch<F>(&self, level: &Level, cell: CellCoord, gate_active: F, out: &mut Vec<Command>)
    where
        F: Fn(GateId) -> bool,
    {
        if cell == level.reset_control() {
            out.push(match self.phase {
                LevelPhase::Flowing => Command::ResetLevel,
                LevelPhase::Complete => Command::AdvanceLevel,
            });
            return;
        }

        if self.phase == LevelPhase::Complete {
            return;
        }

        for gate in level.gates_with_button(cell) {
            if gate_active(gate) {
                debug!("button at {cell} pressed for gate {}", gate.get());
                out.push(Command::OpenGate { gate });
            }
        }
    }
}
