use super::handle::{Entity, EntityIndex, EntityKind};

/// `EntityPool` manages the manipulations of an `Entity` collection. It
/// keeps the canonical value of every entity ever minted in a dense
/// table indexed by `Entity::index`, and recycles freed indices from a
/// LIFO stack before growing the table.
///
/// A freed slot stays in the table with its version incremented and its
/// kind cleared, so stale copies of the old value can always be told
/// apart from whatever the slot holds next.
pub struct EntityPool {
    entities: Vec<Entity>,
    recyclable: Vec<EntityIndex>,
}

impl EntityPool {
    /// Constructs a new, empty `EntityPool`.
    pub fn new() -> Self {
        EntityPool {
            entities: Vec::new(),
            recyclable: Vec::new(),
        }
    }

    /// Constructs a new `EntityPool` with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        EntityPool {
            entities: Vec::with_capacity(capacity),
            recyclable: Vec::new(),
        }
    }

    /// Mints an unused `Entity` of the given kind, preferring a recycled
    /// index over growing the table.
    pub fn create(&mut self, kind: EntityKind) -> Entity {
        if let Some(index) = self.recyclable.pop() {
            let slot = &mut self.entities[index as usize];
            *slot = Entity::new(index, slot.version(), kind);
            *slot
        } else {
            let index = self.entities.len() as EntityIndex;
            let e = Entity::new(index, 0, kind);
            self.entities.push(e);
            e
        }
    }

    /// Returns true if this exact `Entity` value is the current occupant
    /// of its table slot. Stale copies fail the version comparison.
    #[inline]
    pub fn contains(&self, e: Entity) -> bool {
        (e.index() as usize) < self.entities.len() && self.entities[e.index() as usize] == e
    }

    /// Recycles the `Entity`'s index and invalidates every outstanding
    /// copy of its value. The caller is expected to have checked
    /// `contains` beforehand.
    pub fn free(&mut self, e: Entity) {
        let index = e.index();
        self.entities[index as usize] = Entity::new(index, e.version() + 1, EntityKind::ENTITY);
        self.recyclable.push(index);
    }

    /// Returns the number of entities that are currently live.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len() - self.recyclable.len()
    }

    /// Returns true if no entity is currently live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw entity table. Slots of freed entities are still
    /// present, holding the cleared value awaiting reuse.
    #[inline]
    pub fn slots(&self) -> &[Entity] {
        &self.entities
    }
}

impl Default for EntityPool {
    fn default() -> Self {
        EntityPool::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create() {
        let mut pool = EntityPool::new();
        assert_eq!(pool.len(), 0);

        let e1 = pool.create(EntityKind::ENTITY);
        assert_eq!(e1.index(), 0);
        assert_eq!(e1.version(), 0);
        assert!(pool.contains(e1));
        assert_eq!(pool.len(), 1);

        let e2 = pool.create(EntityKind::COMPONENT);
        assert_eq!(e2.index(), 1);
        assert_eq!(e2.kind(), EntityKind::COMPONENT);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn free_and_recycle() {
        let mut pool = EntityPool::new();
        let e1 = pool.create(EntityKind::ENTITY);
        let e2 = pool.create(EntityKind::ENTITY);

        pool.free(e1);
        assert!(!pool.contains(e1));
        assert!(pool.contains(e2));
        assert_eq!(pool.len(), 1);

        // The freed index comes back with a bumped version.
        let e3 = pool.create(EntityKind::ENTITY);
        assert_eq!(e3.index(), e1.index());
        assert!(e3.version() > e1.version());
        assert!(!pool.contains(e1));
        assert!(pool.contains(e3));
    }

    #[test]
    fn lifo_recycling() {
        let mut pool = EntityPool::new();
        let entities: Vec<_> = (0..4).map(|_| pool.create(EntityKind::ENTITY)).collect();

        for e in &entities {
            pool.free(*e);
        }

        // The most recently freed index is reused first.
        for e in entities.iter().rev() {
            assert_eq!(pool.create(EntityKind::ENTITY).index(), e.index());
        }
    }

    #[test]
    fn cleared_slot() {
        let mut pool = EntityPool::new();
        let e = pool.create(EntityKind::SYSTEM);
        pool.free(e);

        let slot = pool.slots()[e.index() as usize];
        assert_eq!(slot.kind(), EntityKind::ENTITY);
        assert_eq!(slot.version(), e.version() + 1);
    }
}
