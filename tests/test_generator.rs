use dungeon_crawler::config::{MAIN_PATH_LENGTH, MAX_ENEMIES_PER_ROOM};
use dungeon_crawler::entities::{BossTier, RoomKind};
use dungeon_crawler::generator::generate;
use dungeon_crawler::graph::RoomGraph;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded(seed: u64) -> RoomGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(7, 7, &mut rng)
}

fn all_reachable(graph: &RoomGraph) -> bool {
    let Some(start) = graph.start() else {
        return false;
    };
    let seen = graph.reachable_from(start);
    graph.rooms().all(|(id, _)| seen[id])
}

// ── Layout ────────────────────────────────────────────────────────────────────

#[test]
fn start_room_sits_in_the_middle() {
    let graph = seeded(42);
    let start = graph.start().unwrap();
    assert_eq!(graph.room(start).position, (3, 3));
    assert_eq!(graph.room(start).kind, RoomKind::Start);
    assert_eq!(graph.at(3, 3), Some(start));
}

#[test]
fn exactly_one_of_each_special_room() {
    for seed in 0..50 {
        let graph = seeded(seed);
        assert_eq!(graph.count_kind(RoomKind::Start), 1, "seed {seed}");
        assert_eq!(graph.count_kind(RoomKind::Boss), 1, "seed {seed}");
        assert_eq!(graph.count_kind(RoomKind::Treasure), 1, "seed {seed}");
    }
}

#[test]
fn main_path_runs_from_start_to_boss() {
    for seed in 0..50 {
        let graph = seeded(seed);
        let path = graph.main_path();
        assert_eq!(path.len(), MAIN_PATH_LENGTH, "seed {seed}");
        assert_eq!(path[0], (3, 3));

        let boss = graph.at(path[path.len() - 1].0, path[path.len() - 1].1).unwrap();
        assert_eq!(graph.room(boss).kind, RoomKind::Boss);

        for pair in path.windows(2) {
            let a = graph.at(pair[0].0, pair[0].1).unwrap();
            let b = graph.at(pair[1].0, pair[1].1).unwrap();
            assert!(
                graph.room(a).connections().any(|(_, other)| other == b),
                "seed {seed}: {:?} not linked to {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn treasure_room_lies_inside_the_main_path() {
    for seed in 0..50 {
        let graph = seeded(seed);
        let treasure = graph.find_kind(RoomKind::Treasure).unwrap();
        let position = graph.room(treasure).position;
        let path = graph.main_path();
        assert!(path[1..path.len() - 1].contains(&position), "seed {seed}");
    }
}

#[test]
fn connections_are_symmetric_and_everything_is_reachable() {
    for seed in 0..100 {
        let graph = seeded(seed);
        assert!(graph.is_symmetric(), "seed {seed}\n{graph}");
        assert!(all_reachable(&graph), "seed {seed}\n{graph}");
    }
}

#[test]
fn every_connection_has_a_door() {
    let graph = seeded(3);
    for (_, room) in graph.rooms() {
        for (direction, _) in room.connections() {
            assert!(room.layout.door(direction).is_some());
        }
        assert_eq!(room.layout.doors().len(), room.connections().count());
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[test]
fn rooms_are_populated_by_kind() {
    for seed in 0..30 {
        let graph = seeded(seed);
        for (_, room) in graph.rooms() {
            match room.kind {
                RoomKind::Start => assert!(room.enemies.is_empty()),
                RoomKind::Treasure => {
                    assert!(room.enemies.is_empty());
                    assert_eq!(room.items.len(), 1);
                }
                RoomKind::Boss => {
                    assert_eq!(room.enemies.len(), 1);
                    assert_eq!(room.enemies[0].boss_tier(), Some(BossTier::Large));
                }
                RoomKind::Normal => {
                    let n = room.enemies.len() as u32;
                    assert!((1..=MAX_ENEMIES_PER_ROOM).contains(&n), "seed {seed}: {n} enemies");
                    assert!(room.items.is_empty());
                }
            }
        }
    }
}

// ── Sizing & determinism ──────────────────────────────────────────────────────

#[test]
fn tiny_grids_are_clamped_to_minimum() {
    let mut rng = StdRng::seed_from_u64(1);
    let graph = generate(2, 3, &mut rng);
    assert_eq!(graph.width(), 5);
    assert_eq!(graph.height(), 5);
    assert_eq!(graph.room(graph.start().unwrap()).position, (2, 2));
}

#[test]
fn same_seed_same_dungeon() {
    let a = seeded(1234);
    let b = seeded(1234);
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(a.main_path(), b.main_path());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_seed_and_size_yields_a_playable_dungeon(
        seed in any::<u64>(),
        width in 5usize..12,
        height in 5usize..12,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = generate(width, height, &mut rng);

        prop_assert_eq!(graph.count_kind(RoomKind::Start), 1);
        prop_assert_eq!(graph.count_kind(RoomKind::Boss), 1);
        prop_assert_eq!(graph.count_kind(RoomKind::Treasure), 1);
        prop_assert!(graph.is_symmetric());
        prop_assert!(all_reachable(&graph));
        prop_assert!(graph.room_count() <= width * height);
    }
}
