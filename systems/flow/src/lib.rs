#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven water path interpreter.
//!
//! [`step`] is a pure function: given the immutable level, the current
//! cursor and a gate lookup it computes the next cursor and the cell effects
//! of a single tick. [`Flow`] wires it into the command/event loop.

use floodgate_core::{CellCoord, Command, Event, FlowCursor, Level, PathToken};
use log::{debug, warn};

/// Cell mutation produced by a single interpreter step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellEffect {
    /// Paint the cell with water and tag it as water.
    Flood(CellCoord),
    /// Paint the cell with water only; fork detours never carry the cursor.
    Spill(CellCoord),
}

/// What the interpreted token did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The cursor moved onto a new cell.
    Advanced,
    /// The next cell holds an active gate; nothing advanced.
    Blocked {
        /// Gate cell in the way.
        gate: CellCoord,
    },
    /// A fork detour started and its first cell was spilled.
    ForkEntered {
        /// First detour cell.
        cell: CellCoord,
    },
    /// The detour grew by one cell.
    ForkExtended {
        /// Newly spilled cell.
        cell: CellCoord,
    },
    /// The detour was blocked; the rest of it was skipped.
    ForkAbandoned {
        /// Cell that stopped the detour.
        gate: CellCoord,
    },
    /// The interpreter left the fork region.
    ForkClosed,
    /// The token was not usable and was skipped without moving.
    Skipped {
        /// Token index that was skipped.
        index: usize,
        /// Offending path symbol.
        symbol: char,
    },
    /// The path had no token left to interpret.
    Exhausted,
}

/// Result of interpreting one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowStep {
    /// Cursor after the step.
    pub cursor: FlowCursor,
    /// Cell effects in application order.
    pub effects: Vec<CellEffect>,
    /// What the interpreted token did.
    pub outcome: StepOutcome,
    /// Whether the path is now fully consumed.
    pub completed: bool,
}

/// Interprets the token under the cursor.
///
/// The current cell is flooded first so the final cell of the path is always
/// painted, including on the tick that detects completion.
pub fn step<F>(level: &Level, cursor: FlowCursor, is_gate: F) -> FlowStep
where
    F: Fn(CellCoord) -> bool,
{
    let path = level.water_path();
    let mut next = cursor;
    let mut effects = vec![CellEffect::Flood(cursor.cell)];

    let abandon_index = |from: usize| {
        path.closing_fork_after(from)
            .map_or(path.len(), |closing| closing + 1)
    };

    let outcome = match path.token(cursor.index) {
        None => StepOutcome::Exhausted,
        Some(PathToken::Step(direction)) if cursor.on_branch => {
            let head = cursor.branch_head.unwrap_or(cursor.cell);
            match head.step(direction) {
                Some(target) if !is_gate(target) => {
                    effects.push(CellEffect::Spill(target));
                    next.branch_head = Some(target);
                    next.index += 1;
                    StepOutcome::ForkExtended { cell: target }
                }
                blocked => {
                    next.index = abandon_index(cursor.index);
                    next.on_branch = false;
                    next.branch_head = None;
                    StepOutcome::ForkAbandoned {
                        gate: blocked.unwrap_or(head),
                    }
                }
            }
        }
        Some(PathToken::Step(direction)) => match cursor.cell.step(direction) {
            Some(target) if is_gate(target) => StepOutcome::Blocked { gate: target },
            Some(target) => {
                next.cell = target;
                next.index += 1;
                StepOutcome::Advanced
            }
            None => {
                next.index += 1;
                StepOutcome::Skipped {
                    index: cursor.index,
                    symbol: direction.symbol(),
                }
            }
        },
        Some(PathToken::ForkStart) => {
            let branch = path
                .token(cursor.index + 1)
                .and_then(PathToken::direction)
                .map(|direction| cursor.cell.step(direction));
            match branch {
                Some(Some(target)) if !is_gate(target) => {
                    effects.push(CellEffect::Spill(target));
                    next.on_branch = true;
                    next.branch_head = Some(target);
                    next.index += 2;
                    StepOutcome::ForkEntered { cell: target }
                }
                Some(blocked) => {
                    next.index = abandon_index(cursor.index);
                    StepOutcome::ForkAbandoned {
                        gate: blocked.unwrap_or(cursor.cell),
                    }
                }
                None => {
                    next.index = abandon_index(cursor.index);
                    StepOutcome::ForkClosed
                }
            }
        }
        Some(PathToken::ForkEnd) => {
            next.on_branch = false;
            next.branch_head = None;
            next.index += 1;
            StepOutcome::ForkClosed
        }
        Some(PathToken::Invalid(symbol)) => {
            next.index += 1;
            StepOutcome::Skipped {
                index: cursor.index,
                symbol,
            }
        }
    };

    let completed = next.index >= path.len();
    if completed && next.cell != cursor.cell {
        effects.push(CellEffect::Flood(next.cell));
    }

    FlowStep {
        cursor: next,
        effects,
        outcome,
        completed,
    }
}

/// Pure system that advances the water once per flowing tick.
#[derive(Debug, Default)]
pub struct Flow {
    stalled_at: Option<CellCoord>,
}

impl Flow {
    /// Creates a new flow system.
    #[must_use]
    pub const fn new() -> Self {
        Self { stalled_at: None }
    }

    /// Consumes world events and the level state to emit flow commands.
    ///
    /// At most one step is interpreted per call, however many ticks the
    /// event batch carries; the world only reports ticks while flowing.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        level: &Level,
        cursor: FlowCursor,
        is_gate: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        for event in events {
            if let Event::LevelLoaded { .. } = event {
                self.stalled_at = None;
            }
        }

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let result = step(level, cursor, is_gate);
        self.report(&result);

        for effect in &result.effects {
            out.push(match *effect {
                CellEffect::Flood(cell) => Command::FloodCell { cell },
                CellEffect::Spill(cell) => Command::SpillCell { cell },
            });
        }
        if result.cursor != cursor {
            out.push(Command::MoveCursor {
                cursor: result.cursor,
            });
        }
        if result.completed {
            out.push(Command::CompleteLevel);
        }
    }

    fn report(&mut self, result: &FlowStep) {
        match result.outcome {
            StepOutcome::Blocked { gate } => {
                if self.stalled_at != Some(gate) {
                    debug!("water stalled at {} by gate {gate}", result.cursor.cell);
                    self.stalled_at = Some(gate);
                }
                return;
            }
            StepOutcome::Skipped { index, symbol } => {
                warn!("skipping water path token {symbol:?} at {index}: not a usable step");
            }
            StepOutcome::ForkAbandoned { gate } => debug!("fork detour stopped at {gate}"),
            StepOutcome::ForkEntered { cell } => debug!("fork detour spills into {cell}"),
            StepOutcome::Advanced
            | StepOutcome::ForkExtended { .. }
            | StepOutcome::ForkClosed
            | StepOutcome::Exhausted => {}
        }
        self.stalled_at = None;
    }
}
