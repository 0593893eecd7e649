use floodgate_core::{Command, GateId};
use floodgate_world::{self as world, query, Catalog, World};

/// Gates left open after pressing each gate's button on a fresh level.
fn opened_by_each_button(level: usize) -> Vec<Vec<u32>> {
    let catalog = Catalog::builtin();
    let count = catalog.get(level).expect("builtin level").gates().len();
    let mut world = World::new(catalog);

    (0..count)
        .map(|pressed| {
            let mut events = Vec::new();
            world::apply(&mut world, Command::LoadLevel { index: level }, &mut events);
            world::apply(
                &mut world,
                Command::OpenGate {
                    gate: GateId::new(pressed as u32),
                },
                &mut events,
            );
            (0..count as u32)
                .filter(|gate| !query::gate_active(&world, GateId::new(*gate)))
                .collect()
        })
        .collect()
}

#[test]
fn first_level_has_a_single_gate() {
    assert_eq!(opened_by_each_button(0), vec![vec![0]]);
}

#[test]
fn shared_button_level_cascades_from_the_first_gate() {
    assert_eq!(opened_by_each_button(1), vec![vec![0, 1], vec![1]]);
}

#[test]
fn flood_plain_red_and_yellow_open_each_other() {
    assert_eq!(
        opened_by_each_button(2),
        vec![vec![0, 2], vec![1], vec![0, 2]]
    );
}

#[test]
fn around_and_around_gates_open_each_other() {
    assert_eq!(opened_by_each_button(3), vec![vec![0, 1], vec![0, 1]]);
}
