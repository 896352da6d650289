use stipple::prelude::*;

#[test]
fn round_trip() {
    let _ = env_logger::try_init();

    let mut world = World::new();
    let wants = world.register_tag();
    let food = world.create();

    let e1 = world.create();
    world.associate(e1, wants, food);

    assert!(world.has_relation(e1, wants));
    assert!(world.related(e1, food));
    assert!(world.has(e1, world.relation_component()));

    world.disassociate(e1);
    assert!(!world.has_relation(e1, wants));
    assert!(!world.related(e1, food));
    assert!(!world.has(e1, world.relation_component()));
}

#[test]
fn one_edge_per_entity() {
    let mut world = World::new();
    let wants = world.register_tag();
    let fears = world.register_tag();
    let food = world.create();
    let fire = world.create();

    let e1 = world.create();
    world.associate(e1, wants, food);
    world.associate(e1, fears, fire);

    // The second edge overwrote the first.
    assert!(!world.has_relation(e1, wants));
    assert!(!world.related(e1, food));
    assert!(world.has_relation(e1, fears));
    assert!(world.related(e1, fire));
}

#[test]
fn absent_is_not_an_error() {
    let mut world = World::new();
    let wants = world.register_tag();

    let e1 = world.create();
    let loner = world.create();
    assert!(!world.has_relation(loner, wants));
    assert!(!world.related(loner, e1));
}

#[test]
fn children_enumeration() {
    let mut world = World::new();
    let child_of = world.child_of();

    let parent = world.create();
    let other_parent = world.create();
    let children: Vec<_> = (0..3)
        .map(|_| {
            let c = world.create();
            world.associate(c, child_of, parent);
            c
        })
        .collect();
    let stepchild = world.create();
    world.associate(stepchild, child_of, other_parent);

    let mut visited = Vec::new();
    world.relations_of(parent, child_of, |row| {
        assert_eq!(row.len(), 1);
        assert_eq!(row.component(0), Some(child_of));
        let pair: Relation = row.get(0).unwrap();
        assert_eq!(pair.object, child_of);
        assert_eq!(pair.relation, parent);
        visited.push(row.entity());
    });

    assert_eq!(visited, children);

    let mut orphans = Vec::new();
    let nobody = world.create();
    world.relations_of(nobody, child_of, |row| orphans.push(row.entity()));
    assert!(orphans.is_empty());
}

#[test]
fn detached_children_drop_out() {
    let mut world = World::new();
    let child_of = world.child_of();

    let parent = world.create();
    let c1 = world.create();
    let c2 = world.create();
    world.associate(c1, child_of, parent);
    world.associate(c2, child_of, parent);

    world.disassociate(c1);

    let mut visited = Vec::new();
    world.relations_of(parent, child_of, |row| visited.push(row.entity()));
    assert_eq!(visited, vec![c2]);
}

#[test]
fn freed_entities_lose_their_edges() {
    let mut world = World::new();
    let child_of = world.child_of();

    let parent = world.create();
    let c1 = world.create();
    world.associate(c1, child_of, parent);
    world.free(c1);

    let mut visited = Vec::new();
    world.relations_of(parent, child_of, |row| visited.push(row.entity()));
    assert!(visited.is_empty());
}

#[test]
#[should_panic]
fn object_must_be_a_component() {
    let mut world = World::new();
    let not_a_component = world.create();
    let parent = world.create();

    let e1 = world.create();
    world.associate(e1, not_a_component, parent);
}

#[test]
#[should_panic]
fn predicate_must_be_a_plain_entity() {
    let mut world = World::new();
    let wants = world.register_tag();
    let also_a_component = world.register_tag();

    let e1 = world.create();
    world.associate(e1, wants, also_a_component);
}

#[test]
#[should_panic]
fn disassociate_requires_an_edge() {
    let mut world = World::new();
    let e1 = world.create();
    world.disassociate(e1);
}
