//! Scripted pointer input given on the command line as `X,Y@TICK`.

use std::str::FromStr;

use floodgate_core::CellCoord;
use thiserror::Error;

/// Delimiter separating the cell from the tick it applies to.
const TICK_DELIMITER: char = '@';
/// Delimiter separating the column from the row.
const AXIS_DELIMITER: char = ',';

/// Pointer input applied to a cell right before the given tick is processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScriptedInput {
    /// Cell the pointer addresses.
    pub(crate) cell: CellCoord,
    /// Tick the input precedes; 0 means right after the level loads.
    pub(crate) tick: u64,
}

impl ScriptedInput {
    /// Inputs scheduled right before `tick`, in command line order.
    pub(crate) fn due(inputs: &[Self], tick: u64) -> impl Iterator<Item = CellCoord> + '_ {
        inputs
            .iter()
            .filter(move |input| input.tick == tick)
            .map(|input| input.cell)
    }
}

/// Errors raised while parsing scripted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The value was empty or contained only whitespace.
    #[error("scripted input was empty")]
    Empty,
    /// The `@TICK` suffix was missing.
    #[error("'{0}' is missing the '@TICK' suffix")]
    MissingTick(String),
    /// The cell part was not `X,Y`.
    #[error("could not parse cell '{0}', expected X,Y")]
    InvalidCell(String),
    /// The tick part was not an unsigned integer.
    #[error("could not parse tick '{0}'")]
    InvalidTick(String),
}

impl FromStr for ScriptedInput {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScriptError::Empty);
        }

        let (cell, tick) = trimmed
            .split_once(TICK_DELIMITER)
            .ok_or_else(|| ScriptError::MissingTick(trimmed.to_owned()))?;
        let tick = tick
            .trim()
            .parse::<u64>()
            .map_err(|_| ScriptError::InvalidTick(tick.to_owned()))?;

        Ok(Self {
            cell: parse_cell(cell)?,
            tick,
        })
    }
}

fn parse_cell(cell: &str) -> Result<CellCoord, ScriptError> {
    let invalid = || ScriptError::InvalidCell(cell.to_owned());
    let (column, row) = cell.split_once(AXIS_DELIMITER).ok_or_else(invalid)?;
    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(CellCoord::new(column, row))
}
