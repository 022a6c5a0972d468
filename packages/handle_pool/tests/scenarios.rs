//! Behavioral tests of `HandlePool` through its public API, run under both removal policies.

#![allow(
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "we do not need to worry about these things when writing test code"
)]

use std::collections::HashSet;
use std::fmt::Debug;

use handle_pool::{Error, Handle, HandleId, HandlePool, RemovalPolicy};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Model {
    a: i32,
    b: i32,
}

const POLICIES: [RemovalPolicy; 2] = [RemovalPolicy::SwapRemove, RemovalPolicy::Ordered];

fn new_scene(policy: RemovalPolicy) -> HandlePool<Model> {
    HandlePool::builder().removal_policy(policy).build()
}

fn assert_invalid<T: Debug>(result: Result<T, Error>, id: HandleId) {
    assert_eq!(result.unwrap_err(), Error::InvalidHandle { id });
}

#[test]
fn round_trip_default_then_written_value() {
    for policy in POLICIES {
        let mut scene = new_scene(policy);

        let handle = scene.create();
        assert_eq!(*handle.get(&scene).unwrap(), Model::default());

        handle.resolve(&mut scene).unwrap().a = 10;
        handle.resolve(&mut scene).unwrap().b = 20;

        let model = scene.get(handle).unwrap();
        assert_eq!(model.a, 10);
        assert_eq!(model.b, 20);
    }
}

#[test]
fn destroying_middle_of_three_keeps_neighbors() {
    for policy in POLICIES {
        let mut scene = new_scene(policy);

        let go1 = scene.create();
        let go2 = scene.create();
        let go3 = scene.create();

        go1.resolve(&mut scene).unwrap().a = 10;
        go2.resolve(&mut scene).unwrap().a = 5;
        go3.resolve(&mut scene).unwrap().a = 6;

        scene.destroy(go2).unwrap();

        assert_eq!(go1.get(&scene).unwrap().a, 10);
        assert_eq!(go3.get(&scene).unwrap().a, 6);
        assert_invalid(go2.get(&scene), go2.id());
        assert_invalid(scene.get_by_id(go2.id()), go2.id());

        // Writes after the removal still land on the right entry.
        go3.resolve(&mut scene).unwrap().a = 666;
        assert_eq!(go3.get(&scene).unwrap().a, 666);
        assert_eq!(go1.get(&scene).unwrap().a, 10);
        assert_eq!(scene.len(), 2);
    }
}

#[test]
fn destroying_a_block_of_hundred_out_of_two_hundred() {
    for policy in POLICIES {
        let mut scene = new_scene(policy);

        let handles = (0..200)
            .map(|i| {
                let handle = scene.create();
                handle.resolve(&mut scene).unwrap().a = 200 + i;
                handle
            })
            .collect::<Vec<_>>();

        for id in 50..150 {
            let handle = scene.get_by_id(HandleId::new(id)).unwrap();
            scene.destroy(handle).unwrap();
        }

        assert_eq!(scene.len(), 100);

        for id in 50..150 {
            assert!(scene.get_by_id(HandleId::new(id)).is_err());
        }

        for (i, handle) in handles.iter().enumerate() {
            let id = handle.id().get();

            if (50..150).contains(&id) {
                assert!(handle.get(&scene).is_err());
            } else {
                assert_eq!(handle.get(&scene).unwrap().a, 200 + i as i32);
            }
        }
    }
}

#[test]
fn copied_handle_shares_the_entry() {
    for policy in POLICIES {
        let mut scene = new_scene(policy);

        let go4 = scene.create();
        go4.resolve(&mut scene).unwrap().a = 32;

        let go4_copy = go4;
        go4_copy.resolve(&mut scene).unwrap().b = 32;

        let model = go4.get(&scene).unwrap();
        assert_eq!(model.a, 32);
        assert_eq!(model.b, 32);

        scene.destroy(go4).unwrap();
        assert!(go4_copy.get(&scene).is_err());
        assert!(scene.destroy(go4_copy).is_err());
    }
}

#[test]
fn ordered_policy_iterates_in_creation_order() {
    let mut scene = new_scene(RemovalPolicy::Ordered);

    let handles = (0..10)
        .map(|a| scene.insert(Model { a, ..Model::default() }))
        .collect::<Vec<_>>();

    for handle in handles.iter().step_by(3) {
        scene.destroy(*handle).unwrap();
    }

    let order = scene.values().iter().map(|m| m.a).collect::<Vec<_>>();
    assert_eq!(order, vec![1, 2, 4, 5, 7, 8]);

    let ids = scene.iter().map(|(h, _)| h.id()).collect::<Vec<_>>();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn pools_with_different_payload_types_are_independent() {
    #[derive(Debug, Default)]
    struct Texture {
        handle: u32,
    }

    let mut scene = HandlePool::<Model>::new();
    let mut textures = HandlePool::<Texture>::new();

    let model = scene.create();
    let texture = textures.create();
    texture.resolve(&mut textures).unwrap().handle = 7;

    assert_eq!(model.id(), texture.id());
    assert_eq!(texture.get(&textures).unwrap().handle, 7);

    textures.destroy(texture).unwrap();
    assert!(scene.contains(model));
}

#[test]
fn dump_lists_every_live_entry() {
    for policy in POLICIES {
        let mut scene = new_scene(policy);

        let handles = (0..6).map(|_| scene.create()).collect::<Vec<_>>();
        scene.destroy(handles[0]).unwrap();
        scene.destroy(handles[3]).unwrap();

        let dump = scene.dump();
        assert_eq!(dump.slots().len(), 4);
        assert_eq!(dump.mappings().len(), 4);

        for (id, slot) in dump.mappings() {
            let handle = scene.get_by_id(*id).unwrap();
            assert_eq!(scene.slot_of(handle).unwrap(), *slot);

            let slot_entry = &dump.slots()[slot.get() - 1];
            assert_eq!(slot_entry.owner(), *id);
        }

        let text = dump.to_string();
        assert!(text.contains("slots (4)"));
        assert!(text.contains("map (4)"));
    }
}

/// Randomly interleaves creates and destroys and checks the pool against a simple model after
/// every step. Covers no-reuse, stability, dangling rejection and the count invariant.
#[test]
fn random_churn_matches_model() {
    for policy in POLICIES {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pool = HandlePool::<u64>::builder().removal_policy(policy).build();

        let mut live: Vec<(Handle<u64>, u64)> = Vec::new();
        let mut retired: Vec<Handle<u64>> = Vec::new();
        let mut issued: HashSet<HandleId> = HashSet::new();

        for step in 0..2000_u64 {
            if live.is_empty() || rng.random_bool(0.6) {
                let handle = pool.insert(step);

                assert!(issued.insert(handle.id()), "identifier was reused");
                live.push((handle, step));
            } else {
                let (victim, expected) = live.swap_remove(rng.random_range(0..live.len()));

                assert_eq!(pool.destroy(victim).unwrap(), expected);
                retired.push(victim);
            }

            assert_eq!(pool.len(), live.len());
            assert_eq!(pool.dump().mappings().len(), live.len());
        }

        for (handle, value) in &live {
            assert_eq!(*pool.get(*handle).unwrap(), *value);
        }

        for handle in &retired {
            assert_invalid(pool.get(*handle), handle.id());
            assert!(!pool.contains_id(handle.id()));
        }

        let mut values = pool.values().to_vec();
        let mut expected = live.iter().map(|(_, value)| *value).collect::<Vec<_>>();
        values.sort_unstable();
        expected.sort_unstable();
        assert_eq!(values, expected);
    }
}
