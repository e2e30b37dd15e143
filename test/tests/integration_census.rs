//! Cross-replica census accounting: the shared counter follows learning,
//! aging, resets, and replica teardown.

use swarmlist::{SwarmCensus, Swarmlist, SwarmlistConfig};
use swarmlist_test::{step_all_n, BusTransport, RadioBus};

const PACKET_SIZE: u16 = 13;

fn join_swarm(robot_id: u32, bus: &RadioBus, census: &SwarmCensus) -> Swarmlist<BusTransport> {
    Swarmlist::new(
        robot_id,
        SwarmlistConfig::default(),
        bus.join(),
        census.clone(),
    )
}

#[test]
fn the_census_follows_learning_and_teardown() {
    let bus = RadioBus::new(PACKET_SIZE, 0.0);
    let census = SwarmCensus::new();

    let mut replicas = vec![join_swarm(1, &bus, &census), join_swarm(2, &bus, &census)];
    // Each fresh replica contributes its own owner entry.
    assert_eq!(census.total_active(), 2);

    step_all_n(&mut replicas, 10);
    // Both learned each other: two active entries per replica.
    assert_eq!(census.total_active(), 4);

    let dropped = replicas.pop().unwrap();
    drop(dropped);
    // The dropped replica withdrew its whole contribution.
    assert_eq!(census.total_active(), 2);
}

#[test]
fn the_census_follows_resets() {
    let bus = RadioBus::new(PACKET_SIZE, 0.0);
    let census = SwarmCensus::new();
    let mut replicas = vec![
        join_swarm(1, &bus, &census),
        join_swarm(2, &bus, &census),
        join_swarm(3, &bus, &census),
    ];
    step_all_n(&mut replicas, 30);
    assert_eq!(census.total_active(), 9);

    replicas[0].reset();
    assert_eq!(census.total_active(), 7);
    assert_eq!(replicas[0].size(), 1);
}
