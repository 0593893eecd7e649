//! Water path grammar.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Symbol opening a fork detour.
const FORK_START: char = '[';
/// Symbol closing a fork detour.
const FORK_END: char = ']';

/// Single token of a water path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// Move one cell in the provided direction.
    Step(Direction),
    /// Opens a fork detour (`[`).
    ForkStart,
    /// Closes a fork detour (`]`).
    ForkEnd,
    /// Unrecognised symbol kept so diagnostics can point at it.
    Invalid(char),
}

impl PathToken {
    fn parse(symbol: char) -> Self {
        match symbol {
            FORK_START => Self::ForkStart,
            FORK_END => Self::ForkEnd,
            other => Direction::from_symbol(other).map_or(Self::Invalid(other), Self::Step),
        }
    }

    /// Direction of the token if it is a step.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Step(direction) => Some(direction),
            _ => None,
        }
    }
}

/// Ordered route of the water, one token per tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct WaterPath {
    source: String,
    tokens: Vec<PathToken>,
}

impl WaterPath {
    /// Parses a path string. Unknown symbols become [`PathToken::Invalid`].
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            tokens: source.chars().map(PathToken::parse).collect(),
        }
    }

    /// Path text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of tokens in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Reports whether the path contains no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at the provided index.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<PathToken> {
        self.tokens.get(index).copied()
    }

    /// All tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// Index of the first `]` at or after `index`.
    ///
    /// Forks do not nest, so the first closing marker is the matching one.
    #[must_use]
    pub fn closing_fork_after(&self, index: usize) -> Option<usize> {
        self.tokens
            .iter()
            .skip(index)
            .position(|token| *token == PathToken::ForkEnd)
            .map(|offset| index + offset)
    }

    /// Number of directional tokens, including those inside a fork.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| token.direction().is_some())
            .count()
    }

    /// Positions and symbols of every unrecognised token.
    pub fn invalid_tokens(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(index, token)| match token {
                PathToken::Invalid(symbol) => Some((index, *symbol)),
                _ => None,
            })
    }
}

impl From<String> for WaterPath {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<WaterPath> for String {
    fn from(value: WaterPath) -> Self {
        value.source
    }
}

impl fmt::Display for WaterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
