//! End-to-end recompute behavior under churn and cross-thread reads.

use std::thread;

use nn_registry::{NO_NEIGHBOR, Vec3};
use nn_tick::{NeighborSystem, SystemConfig, TickOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn reference(positions: &[Vec3]) -> Vec<i32> {
    (0..positions.len())
        .map(|i| {
            let mut best = NO_NEIGHBOR;
            let mut best_distance = f32::INFINITY;
            for (j, &q) in positions.iter().enumerate() {
                let d = positions[i].distance_squared(q);
                if j != i && d < best_distance {
                    best_distance = d;
                    best = j as i32;
                }
            }
            best
        })
        .collect()
}

#[test]
fn test_churn_matches_sequential_reference() {
    let mut rng = StdRng::seed_from_u64(99);
    let config = SystemConfig::new(0.05, 16)
        .with_batch_size(5)
        .with_worker_threads(Some(3));
    let mut system = NeighborSystem::new(config).unwrap();

    for step in 0..200 {
        for _ in 0..rng.gen_range(0..6) {
            system.insert(Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            ));
        }
        if !system.is_empty() {
            for _ in 0..rng.gen_range(0..4) {
                let len = system.len() as i32;
                system.remove(rng.gen_range(0..len.max(1)));
            }
        }
        for handle in 0..system.len() as i32 {
            let jitter = Vec3::new(rng.gen_range(-0.5..0.5), 0.0, rng.gen_range(-0.5..0.5));
            let current = system.store().position(handle).unwrap();
            system.update(
                handle,
                Vec3::new(current.x + jitter.x, current.y, current.z + jitter.z),
            );
        }

        if system.tick(0.05) == TickOutcome::Solved {
            let frame = system.latest();
            assert_eq!(frame.positions(), system.store().snapshot(), "step {step}");
            assert_eq!(frame.neighbors(), reference(frame.positions()).as_slice());
            assert_eq!(system.neighbors(), frame.neighbors());
        }
    }

    assert!(system.stats().solves > 0);
}

#[test]
fn test_feed_readers_only_see_complete_frames() {
    let mut system = NeighborSystem::configure(0.01, 0).unwrap();
    for i in 0..200 {
        system.insert(Vec3::new(i as f32, (i % 7) as f32, 0.0));
    }

    let feed = system.feed();
    let reader = thread::spawn(move || {
        let mut last_generation = 0;
        for _ in 0..2_000 {
            let frame = feed.latest();
            assert!(frame.generation() >= last_generation);
            assert_eq!(frame.positions().len(), frame.neighbors().len());
            if frame.generation() > 0 {
                assert!(frame.neighbors().iter().all(|&n| n != NO_NEIGHBOR));
            }
            last_generation = frame.generation();
        }
    });

    for _ in 0..50 {
        system.tick(0.01);
    }

    reader.join().unwrap();
    assert_eq!(system.stats().solves, 50);
}
