//! Consensus-force seeding: every replica starts knowing the whole swarm,
//! and the interesting measurement is how fast fresh data spreads from there.

use swarmlist::{SwarmCensus, Swarmlist, SwarmlistConfig};
use swarmlist_test::{fully_converged, step_all_n, BusTransport, RadioBus};

const PACKET_SIZE: u16 = 13;

fn seeded_swarm(
    robot_ids: &[u32],
    bus: &RadioBus,
    census: &SwarmCensus,
) -> Vec<Swarmlist<BusTransport>> {
    let mut replicas: Vec<Swarmlist<BusTransport>> = robot_ids
        .iter()
        .map(|&robot_id| {
            Swarmlist::new(
                robot_id,
                SwarmlistConfig::default(),
                bus.join(),
                census.clone(),
            )
        })
        .collect();
    for replica in replicas.iter_mut() {
        replica.force_consensus(robot_ids);
    }
    replicas
}

#[test]
fn force_consensus_starts_everyone_fully_synchronized() {
    let bus = RadioBus::new(PACKET_SIZE, 0.0);
    let census = SwarmCensus::new();
    let replicas = seeded_swarm(&[1, 2, 3, 4, 5], &bus, &census);

    assert!(fully_converged(&replicas));
    assert_eq!(census.total_active(), 25);
    for replica in &replicas {
        for &robot_id in &[1u32, 2, 3, 4, 5] {
            assert_eq!(replica.get(robot_id).unwrap().time_to_inactive(), 100);
        }
    }
}

#[test]
fn a_seeded_swarm_stays_converged_while_gossiping() {
    let bus = RadioBus::new(PACKET_SIZE, 0.0);
    let census = SwarmCensus::new();
    let mut replicas = seeded_swarm(&[1, 2, 3, 4, 5], &bus, &census);

    // Every robot keeps broadcasting its own advancing clock, so the
    // timers keep getting rewound and nobody ever ages out.
    step_all_n(&mut replicas, 200);

    assert!(fully_converged(&replicas));
    assert_eq!(census.total_active(), 25);
}

#[test]
fn fresh_payload_reaches_a_seeded_swarm() {
    let bus = RadioBus::new(PACKET_SIZE, 0.0);
    let census = SwarmCensus::new();
    let mut replicas = seeded_swarm(&[1, 2, 3, 4, 5], &bus, &census);

    replicas[4].set_swarm_mask(0x11);
    step_all_n(&mut replicas, 20);

    for replica in &replicas {
        assert_eq!(replica.get(5).unwrap().swarm_mask(), 0x11);
    }
}
