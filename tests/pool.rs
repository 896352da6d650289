use stipple::prelude::*;

#[test]
fn builtin_prefix() {
    let world = World::new();

    // The four built-ins are registered first and pin the low indices.
    assert_eq!(world.system_component().index(), 0);
    assert_eq!(world.prefab_component().index(), 1);
    assert_eq!(world.relation_component().index(), 2);
    assert_eq!(world.child_of().index(), 3);
    assert_eq!(world.len(), 4);

    for c in &[
        world.system_component(),
        world.prefab_component(),
        world.relation_component(),
        world.child_of(),
    ] {
        assert!(world.is_alive(*c));
        assert_eq!(c.kind(), EntityKind::COMPONENT);
    }
}

#[test]
fn index_reuse() {
    let mut world = World::new();

    let mut v = Vec::new();
    for _ in 0..10 {
        v.push(world.create());
    }
    for e in &v {
        world.free(*e);
    }

    for _ in 0..10 {
        let e = world.create();
        assert!((e.index() as usize) < 4 + v.len());
        assert_ne!(v[e.index() as usize - 4].version(), e.version());
    }
}

#[test]
fn generational_safety() {
    let mut world = World::new();

    let e1 = world.create();
    world.free(e1);
    assert!(!world.is_alive(e1));

    // However often the index is recycled, the old value stays stale.
    for _ in 0..5 {
        let e = world.create();
        assert_eq!(e.index(), e1.index());
        assert!(e.version() > e1.version());
        assert!(!world.is_alive(e1));
        world.free(e);
        assert!(!world.is_alive(e));
    }
}

#[test]
fn kinds() {
    let mut world = World::new();

    assert_eq!(world.create().kind(), EntityKind::ENTITY);
    assert_eq!(world.register(4).kind(), EntityKind::COMPONENT);
    assert_eq!(world.register_tag().kind(), EntityKind::COMPONENT);
    assert_eq!(world.register_prefab(&[]).kind(), EntityKind::PREFAB);

    fn noop(_: &mut Row) {}
    assert_eq!(
        world.register_system(noop, &[]).kind(),
        EntityKind::SYSTEM
    );
}

#[test]
fn random_churn() {
    let mut world = World::new();
    let marker = world.register(4);

    let mut alive = Vec::new();
    let mut dead = Vec::new();

    for round in 0..5u32 {
        for i in 0..50u32 {
            let e = world.create();
            world.set_value(e, marker, round * 50 + i);
            alive.push(e);
        }

        let casualties = alive.len() / 2;
        for _ in 0..casualties {
            let len = alive.len();
            let victim = alive.swap_remove(rand::random::<usize>() % len);
            world.free(victim);
            dead.push(victim);
        }
    }

    for e in &alive {
        assert!(world.is_alive(*e));
        assert!(world.has(*e, marker));
    }
    for e in &dead {
        assert!(!world.is_alive(*e));
        assert!(!world.has(*e, marker));
    }

    // Payloads survived every swap-removal the churn caused.
    let mut seen = 0;
    world.query(&[marker], |row| {
        assert!(row.get::<u32>(0).is_some());
        assert!(alive.contains(&row.entity()));
        seen += 1;
    });
    assert_eq!(seen, alive.len());
}
