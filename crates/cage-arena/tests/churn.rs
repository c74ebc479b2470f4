//! Spawn/despawn churn keeps handles honest.

use std::collections::HashMap;

use cage_arena::AgentArena;
use cage_core::{AgentId, AgentLookup, Sphere};
use glam::Vec3;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Spawn(f32),
    Despawn(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-10.0f32..10.0).prop_map(Op::Spawn),
        any::<usize>().prop_map(Op::Despawn),
    ]
}

proptest! {
    #[test]
    fn live_handles_always_resolve(ops in prop::collection::vec(op(), 1..200)) {
        let mut arena = AgentArena::new();
        let mut live: HashMap<AgentId, f32> = HashMap::new();
        let mut dead: Vec<AgentId> = Vec::new();

        for op in ops {
            match op {
                Op::Spawn(x) => {
                    let id = arena.spawn(Vec3::new(x, 0.0, 0.0), Some(Sphere::new(0.5))).unwrap();
                    prop_assert!(live.insert(id, x).is_none());
                }
                Op::Despawn(pick) if !live.is_empty() => {
                    let mut ids: Vec<AgentId> = live.keys().copied().collect();
                    ids.sort();
                    let id = ids[pick % ids.len()];
                    arena.despawn(id).unwrap();
                    live.remove(&id);
                    dead.push(id);
                }
                Op::Despawn(_) => {}
            }
        }

        prop_assert_eq!(arena.len(), live.len());
        for (id, x) in &live {
            prop_assert_eq!(arena.position(*id), Some(Vec3::new(*x, 0.0, 0.0)));
        }
        for id in &dead {
            prop_assert!(arena.body(*id).is_none());
        }
        prop_assert_eq!(arena.iter().count(), live.len());
    }
}
