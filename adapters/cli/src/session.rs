//! Headless host that drives the world and its systems.

use floodgate_core::{CellCoord, Command, Event};
use floodgate_system_bootstrap::Bootstrap;
use floodgate_system_controls::{ControlInput, Controls};
use floodgate_system_flow::Flow;
use floodgate_world::{self as world, query, Catalog, World};

/// Owns the world plus every system and pumps commands until quiescent.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    bootstrap: Bootstrap,
    flow: Flow,
    controls: Controls,
}

impl Session {
    pub(crate) fn new(catalog: Catalog) -> Self {
        Self {
            world: World::new(catalog),
            bootstrap: Bootstrap,
            flow: Flow::new(),
            controls: Controls::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn banner(&self) -> &str {
        self.bootstrap.welcome_banner(&self.world)
    }

    /// Loads the given catalog level and returns the resulting events.
    pub(crate) fn start(&mut self, level_index: usize) -> Vec<Event> {
        let mut commands = Vec::new();
        self.bootstrap.start(level_index, &mut commands);
        self.pump(commands, ControlInput::default())
    }

    pub(crate) fn tick(&mut self) -> Vec<Event> {
        self.pump(vec![Command::Tick], ControlInput::default())
    }

    pub(crate) fn touch(&mut self, cell: CellCoord) -> Vec<Event> {
        self.pump(Vec::new(), ControlInput::touch(cell))
    }

    pub(crate) fn hover(&mut self, cell: CellCoord) -> Vec<Event> {
        self.pump(Vec::new(), ControlInput::hover(cell))
    }

    fn pump(&mut self, mut commands: Vec<Command>, input: ControlInput) -> Vec<Event> {
        let mut emitted = Vec::new();
        let mut input = Some(input);
        loop {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            let frame_input = input.take().unwrap_or_default();
            if events.is_empty() && frame_input == ControlInput::default() {
                break;
            }

            let level = query::level(&self.world);
            self.flow.handle(
                &events,
                level,
                query::cursor(&self.world),
                |cell| query::is_gate(&self.world, cell),
                &mut commands,
            );
            self.controls.handle(
                &events,
                level,
                frame_input,
                |gate| query::gate_active(&self.world, gate),
                &mut commands,
            );
            emitted.extend(events);
        }
        emitted
    }
}
