//! Level definitions and their load-time validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellColor, CellCoord, GateId, PathToken, WaterPath};

/// Smallest grid extent accepted along either axis.
pub const MIN_GRID_EXTENT: u32 = 3;
/// Largest grid extent accepted along either axis.
pub const MAX_GRID_EXTENT: u32 = 32;

/// Gate placement as written by the level author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSpec {
    /// Cell blocked by the gate while it is active.
    pub gate: CellCoord,
    /// Cell the player touches to open the gate.
    pub button: CellCoord,
    /// Color shared by the gate and its button.
    pub color: CellColor,
    /// Other gates opened together with this one.
    #[serde(default)]
    pub also_opens: Vec<GateId>,
}

/// Raw level data, typically deserialized from a level file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDefinition {
    /// Optional human-readable name used in listings.
    #[serde(default)]
    pub name: Option<String>,
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Height of the framed button area at the bottom of the grid.
    pub button_area_height: u32,
    /// Status line shown while the level is flowing.
    pub status_text: String,
    /// Gates in identifier order.
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    /// Cell where the water starts.
    pub start: CellCoord,
    /// Route of the water.
    pub water_path: WaterPath,
}

/// Configuration errors detected while validating a level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid dimensions fall outside the supported range.
    #[error("grid size {width}x{height} is outside the supported 3..=32 range")]
    GridSize {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The button area does not fit into the grid.
    #[error("button area height {button_area_height} does not fit a grid of height {height}")]
    ButtonArea {
        /// Requested button area height.
        button_area_height: u32,
        /// Grid row count.
        height: u32,
    },
    /// The water start lies outside the grid.
    #[error("water start {cell} lies outside the grid")]
    StartOutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A gate cell lies outside the grid.
    #[error("gate {gate} sits at {cell}, outside the grid")]
    GateOutOfBounds {
        /// Index of the offending gate.
        gate: usize,
        /// Offending cell.
        cell: CellCoord,
    },
    /// A button cell lies outside the grid.
    #[error("button of gate {gate} sits at {cell}, outside the grid")]
    ButtonOutOfBounds {
        /// Index of the offending gate.
        gate: usize,
        /// Offending cell.
        cell: CellCoord,
    },
    /// A gate sits on the cell where the water starts.
    #[error("gate {gate} sits on the water start {cell}")]
    GateOnStart {
        /// Index of the offending gate.
        gate: usize,
        /// Water start cell.
        cell: CellCoord,
    },
    /// A gate or button covers the reset control.
    #[error("gate {gate} places its {part} on the reset control {cell}")]
    ResetControlCovered {
        /// Index of the offending gate.
        gate: usize,
        /// Either `"gate"` or `"button"`.
        part: &'static str,
        /// Reset control cell.
        cell: CellCoord,
    },
    /// A gate cascades to a gate index that does not exist.
    #[error("gate {gate} also opens gate {target}, but the level has {count} gates")]
    UnknownGate {
        /// Index of the gate declaring the cascade.
        gate: usize,
        /// Missing gate index.
        target: u32,
        /// Number of gates defined by the level.
        count: usize,
    },
    /// A fork start has no matching fork end.
    #[error("fork opened at token {index} is never closed")]
    UnclosedFork {
        /// Token index of the `[`.
        index: usize,
    },
    /// A fork end appears without an open fork.
    #[error("token {index} closes a fork that was never opened")]
    StrayForkEnd {
        /// Token index of the `]`.
        index: usize,
    },
    /// A fork start appears inside another fork.
    #[error("token {index} opens a fork inside another fork")]
    NestedFork {
        /// Token index of the inner `[`.
        index: usize,
    },
    /// The path declares more than one fork.
    #[error("token {index} opens a second fork; a path supports a single fork")]
    MultipleForks {
        /// Token index of the second `[`.
        index: usize,
    },
    /// Following the path leaves the grid.
    #[error("token {index} of the water path leads outside the grid")]
    PathLeavesGrid {
        /// Token index of the offending step.
        index: usize,
    },
}

/// Validated, immutable level description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    definition: LevelDefinition,
    channel: Vec<CellCoord>,
    detour: Vec<CellCoord>,
}

impl Level {
    /// Optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.definition.name.as_deref()
    }

    /// Number of grid columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.definition.width
    }

    /// Number of grid rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.definition.height
    }

    /// Height of the framed button area.
    #[must_use]
    pub fn button_area_height(&self) -> u32 {
        self.definition.button_area_height
    }

    /// Status line shown while the level is flowing.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.definition.status_text
    }

    /// Gates in identifier order.
    #[must_use]
    pub fn gates(&self) -> &[GateSpec] {
        &self.definition.gates
    }

    /// Gate with the provided identifier.
    #[must_use]
    pub fn gate(&self, id: GateId) -> Option<&GateSpec> {
        self.definition.gates.get(id.index())
    }

    /// Identifiers of every gate whose button sits on the provided cell.
    pub fn gates_with_button(&self, cell: CellCoord) -> impl Iterator<Item = GateId> + '_ {
        self.definition
            .gates
            .iter()
            .enumerate()
            .filter(move |(_, gate)| gate.button == cell)
            .map(|(index, _)| gate_id(index))
    }

    /// Cell where the water starts.
    #[must_use]
    pub fn start(&self) -> CellCoord {
        self.definition.start
    }

    /// Route of the water.
    #[must_use]
    pub fn water_path(&self) -> &WaterPath {
        &self.definition.water_path
    }

    /// Cell holding the reset / next-level control.
    #[must_use]
    pub fn reset_control(&self) -> CellCoord {
        reset_control(self.width(), self.height())
    }

    /// Cells visited by the main route, starting with the start cell.
    #[must_use]
    pub fn channel(&self) -> &[CellCoord] {
        &self.channel
    }

    /// Cells covered by the fork detour, if the path declares one.
    #[must_use]
    pub fn detour(&self) -> &[CellCoord] {
        &self.detour
    }

    /// The raw definition the level was built from.
    #[must_use]
    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }
}

impl TryFrom<LevelDefinition> for Level {
    type Error = LevelError;

    fn try_from(definition: LevelDefinition) -> Result<Self, Self::Error> {
        let LevelDefinition {
            width,
            height,
            button_area_height,
            ..
        } = definition;

        let extent = MIN_GRID_EXTENT..=MAX_GRID_EXTENT;
        if !extent.contains(&width) || !extent.contains(&height) {
            return Err(LevelError::GridSize { width, height });
        }
        if button_area_height < 2 || button_area_height > height {
            return Err(LevelError::ButtonArea {
                button_area_height,
                height,
            });
        }

        let inside = |cell: CellCoord| cell.column() < width && cell.row() < height;
        if !inside(definition.start) {
            return Err(LevelError::StartOutOfBounds {
                cell: definition.start,
            });
        }

        let reset_control = reset_control(width, height);
        let count = definition.gates.len();
        for (index, gate) in definition.gates.iter().enumerate() {
            if !inside(gate.gate) {
                return Err(LevelError::GateOutOfBounds {
                    gate: index,
                    cell: gate.gate,
                });
            }
            if !inside(gate.button) {
                return Err(LevelError::ButtonOutOfBounds {
                    gate: index,
                    cell: gate.button,
                });
            }
            if gate.gate == definition.start {
                return Err(LevelError::GateOnStart {
                    gate: index,
                    cell: gate.gate,
                });
            }
            for (part, cell) in [("gate", gate.gate), ("button", gate.button)] {
                if cell == reset_control {
                    return Err(LevelError::ResetControlCovered {
                        gate: index,
                        part,
                        cell,
                    });
                }
            }
            if let Some(target) = gate.also_opens.iter().find(|target| target.index() >= count) {
                return Err(LevelError::UnknownGate {
                    gate: index,
                    target: target.get(),
                    count,
                });
            }
        }

        check_forks(&definition.water_path)?;
        let (channel, detour) = trace(&definition.water_path, definition.start, inside)?;

        Ok(Self {
            definition,
            channel,
            detour,
        })
    }
}

fn reset_control(width: u32, height: u32) -> CellCoord {
    CellCoord::new(width - 2, height - 2)
}

fn gate_id(index: usize) -> GateId {
    GateId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

fn check_forks(path: &WaterPath) -> Result<(), LevelError> {
    let mut open: Option<usize> = None;
    let mut seen = false;
    for (index, token) in path.tokens().iter().enumerate() {
        match token {
            PathToken::ForkStart if open.is_some() => {
                return Err(LevelError::NestedFork { index });
            }
            PathToken::ForkStart if seen => {
                return Err(LevelError::MultipleForks { index });
            }
            PathToken::ForkStart => {
                open = Some(index);
                seen = true;
            }
            PathToken::ForkEnd if open.is_none() => {
                return Err(LevelError::StrayForkEnd { index });
            }
            PathToken::ForkEnd => open = None,
            PathToken::Step(_) | PathToken::Invalid(_) => {}
        }
    }

    match open {
        Some(index) => Err(LevelError::UnclosedFork { index }),
        None => Ok(()),
    }
}

/// Walks the path, returning the main route and the detour cells.
fn trace(
    path: &WaterPath,
    start: CellCoord,
    inside: impl Fn(CellCoord) -> bool,
) -> Result<(Vec<CellCoord>, Vec<CellCoord>), LevelError> {
    let mut channel = vec![start];
    let mut detour = Vec::new();
    let mut main = start;
    let mut branch: Option<CellCoord> = None;

    for (index, token) in path.tokens().iter().enumerate() {
        match token {
            PathToken::ForkStart => branch = Some(main),
            PathToken::ForkEnd => branch = None,
            PathToken::Invalid(_) => {}
            PathToken::Step(direction) => {
                let from = branch.unwrap_or(main);
                let next = from
                    .step(*direction)
                    .filter(|cell| inside(*cell))
                    .ok_or(LevelError::PathLeavesGrid { index })?;
                if branch.is_some() {
                    branch = Some(next);
                    detour.push(next);
                } else {
                    main = next;
                    channel.push(next);
                }
            }
        }
    }

    Ok((channel, detour))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(path: &str) -> LevelDefinition {
        LevelDefinition {
            name: None,
            width: 11,
            height: 11,
            button_area_height: 9,
            status_text: "Click the circle.".to_owned(),
            gates: vec![GateSpec {
                gate: CellCoord::new(5, 1),
                button: CellCoord::new(5, 7),
                color: CellColor::from_hex(0xFF0000),
                also_opens: Vec::new(),
            }],
            start: CellCoord::new(1, 1),
            water_path: WaterPath::parse(path),
        }
    }

    #[test]
    fn valid_level_traces_channel() {
        let level = Level::try_from(definition(">>>>>>>>")).expect("valid level");
        assert_eq!(level.channel().len(), 9);
        assert_eq!(level.channel().last(), Some(&CellCoord::new(9, 1)));
        assert!(level.detour().is_empty());
        assert_eq!(level.reset_control(), CellCoord::new(9, 9));
    }

    #[test]
    fn fork_cells_are_traced_separately() {
        let level = Level::try_from(definition(">>[vvv]>>")).expect("valid level");
        assert_eq!(
            level.detour(),
            &[
                CellCoord::new(3, 2),
                CellCoord::new(3, 3),
                CellCoord::new(3, 4)
            ]
        );
        assert_eq!(level.channel().last(), Some(&CellCoord::new(5, 1)));
    }

    #[test]
    fn gate_on_the_water_start_is_rejected() {
        let mut raw = definition(">>");
        raw.gates[0].gate = CellCoord::new(1, 1);
        assert_eq!(
            Level::try_from(raw),
            Err(LevelError::GateOnStart {
                gate: 0,
                cell: CellCoord::new(1, 1),
            })
        );
    }

    #[test]
    fn reset_control_must_stay_free() {
        let mut raw = definition(">>");
        raw.gates[0].button = CellCoord::new(9, 9);
        assert_eq!(
            Level::try_from(raw.clone()),
            Err(LevelError::ResetControlCovered {
                gate: 0,
                part: "button",
                cell: CellCoord::new(9, 9),
            })
        );

        raw.gates[0].button = CellCoord::new(5, 7);
        raw.gates[0].gate = CellCoord::new(9, 9);
        assert_eq!(
            Level::try_from(raw),
            Err(LevelError::ResetControlCovered {
                gate: 0,
                part: "gate",
                cell: CellCoord::new(9, 9),
            })
        );
    }

    #[test]
    fn unknown_cascade_target_is_rejected() {
        let mut raw = definition(">>");
        raw.gates[0].also_opens.push(GateId::new(3));
        assert_eq!(
            Level::try_from(raw),
            Err(LevelError::UnknownGate {
                gate: 0,
                target: 3,
                count: 1,
            })
        );
    }

    #[test]
    fn fork_grammar_violations_are_rejected() {
        assert_eq!(
            Level::try_from(definition(">[v")),
            Err(LevelError::UnclosedFork { index: 1 })
        );
        assert_eq!(
            Level::try_from(definition(">]")),
            Err(LevelError::StrayForkEnd { index: 1 })
        );
        assert_eq!(
            Level::try_from(definition("[[v]]")),
            Err(LevelError::NestedFork { index: 1 })
        );
        assert_eq!(
            Level::try_from(definition("[v]>[v]")),
            Err(LevelError::MultipleForks { index: 4 })
        );
    }

    #[test]
    fn path_leaving_the_grid_is_rejected() {
        assert_eq!(
            Level::try_from(definition("^^")),
            Err(LevelError::PathLeavesGrid { index: 1 })
        );
    }

    #[test]
    fn invalid_tokens_are_not_load_errors() {
        let level = Level::try_from(definition(">?>")).expect("invalid tokens are diagnostics");
        assert_eq!(level.water_path().invalid_tokens().count(), 1);
        assert_eq!(level.channel().last(), Some(&CellCoord::new(3, 1)));
    }

    #[test]
    fn grid_extent_is_bounded() {
        let mut raw = definition(">");
        raw.width = 40;
        assert!(matches!(
            Level::try_from(raw),
            Err(LevelError::GridSize { width: 40, .. })
        ));
    }

    #[test]
    fn buttons_can_be_shared_between_gates() {
        let mut raw = definition(">");
        raw.gates.push(GateSpec {
            gate: CellCoord::new(7, 1),
            button: CellCoord::new(5, 7),
            color: CellColor::from_hex(0x00FF00),
            also_opens: Vec::new(),
        });
        let level = Level::try_from(raw).expect("valid level");
        let gates: Vec<_> = level.gates_with_button(CellCoord::new(5, 7)).collect();
        assert_eq!(gates, vec![GateId::new(0), GateId::new(1)]);
    }
}
