//! Ordered collection of playable levels.

use floodgate_core::{Level, LevelDefinition, LevelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_LEVELS: &str = include_str!("../levels/builtin.toml");

/// Errors raised while assembling a level catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog would contain no level.
    #[error("level catalog is empty")]
    Empty,
    /// The level file is not valid TOML or does not match the level schema.
    #[error("could not parse level file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A level failed validation.
    #[error("level {index} is invalid: {source}")]
    Level {
        /// Zero-based index of the offending level.
        index: usize,
        /// Validation failure.
        #[source]
        source: LevelError,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelFile {
    levels: Vec<LevelDefinition>,
}

/// Non-empty, ordered list of validated levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<Level>,
}

impl Catalog {
    /// Creates a catalog from validated levels.
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { levels })
    }

    /// Validates raw level definitions and collects them into a catalog.
    pub fn from_definitions(definitions: Vec<LevelDefinition>) -> Result<Self, CatalogError> {
        let levels = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                Level::try_from(definition).map_err(|source| CatalogError::Level { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// Parses a TOML level file made of `[[levels]]` tables.
    pub fn from_toml(contents: &str) -> Result<Self, CatalogError> {
        let file: LevelFile = toml::from_str(contents)?;
        Self::from_definitions(file.levels)
    }

    /// Renders the catalog back into the TOML level file format.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let file = LevelFile {
            levels: self
                .levels
                .iter()
                .map(|level| level.definition().clone())
                .collect(),
        };
        toml::to_string(&file)
    }

    /// The levels shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_LEVELS).expect("built-in level file is valid")
    }

    /// Level stored at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Number of levels in the catalog; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterator over the levels in play order.
    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Index of the level played after `index`, wrapping to the first level.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
