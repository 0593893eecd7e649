#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Floodgate experience.

use floodgate_core::{Command, Level};
use floodgate_world::{query, World};

/// Produces data required to greet the player and start the first level.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the level the session starts with.
    #[must_use]
    pub fn level<'world>(&self, world: &'world World) -> &'world Level {
        query::level(world)
    }

    /// Commands that load the requested starting level.
    ///
    /// The world already holds the first level; issuing the load again lets
    /// adapters observe the `LevelLoaded` and status events.
    pub fn start(&self, level_index: usize, out: &mut Vec<Command>) {
        out.push(Command::LoadLevel { index: level_index });
    }
}
