//! The world owns every entity and storage, and exposes the whole
//! lifecycle and component surface.

use std::mem;

use crate::errors::{Error, Result};
use crate::utils::handle::{Entity, EntityKind};
use crate::utils::pool::EntityPool;

use super::component::{ComponentSet, Prefab, Relation, System, SystemFn};
use super::storage::Storage;

/// The built-in component entities, registered first so their indices
/// are fixed at 0 through 3. They are owned by the world instance; two
/// worlds never alias each other's ids.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Builtins {
    pub system: Entity,
    pub prefab: Entity,
    pub relation: Entity,
    pub child_of: Entity,
}

/// The `World` struct contains all the data, which is entities and
/// their components: the generational entity table, and one packed
/// storage per registered component. Dropping the world releases every
/// buffer it owns.
///
/// All access is single-threaded by design; a multi-threaded host must
/// hold an exclusive lock around any call into the world.
pub struct World {
    pub(crate) entities: EntityPool,
    pub(crate) storages: Vec<Storage>,
    pub(crate) builtins: Builtins,
}

impl World {
    /// Constructs a new `World` and registers the built-in components:
    /// system, prefab and relation as sized payloads, and the child-of
    /// tag with no payload at all.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new `World` with an entity table preallocated for
    /// the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut world = World {
            entities: EntityPool::with_capacity(capacity),
            storages: Vec::new(),
            builtins: Builtins {
                system: Entity::nil(),
                prefab: Entity::nil(),
                relation: Entity::nil(),
                child_of: Entity::nil(),
            },
        };

        world.builtins.system = world.register(mem::size_of::<System>());
        world.builtins.prefab = world.register(mem::size_of::<Prefab>());
        world.builtins.relation = world.register(mem::size_of::<Relation>());
        world.builtins.child_of = world.register_tag();
        world
    }

    /// The built-in component carrying `System` payloads.
    #[inline]
    pub fn system_component(&self) -> Entity {
        self.builtins.system
    }

    /// The built-in component carrying `Prefab` payloads.
    #[inline]
    pub fn prefab_component(&self) -> Entity {
        self.builtins.prefab
    }

    /// The built-in component carrying `Relation` payloads.
    #[inline]
    pub fn relation_component(&self) -> Entity {
        self.builtins.relation
    }

    /// The built-in parent-link tag, meant as the `object` of
    /// `associate(child, child_of, parent)`.
    #[inline]
    pub fn child_of(&self) -> Entity {
        self.builtins.child_of
    }

    /// Creates and returns an unused plain `Entity`.
    #[inline]
    pub fn create(&mut self) -> Entity {
        self.entities.create(EntityKind::ENTITY)
    }

    /// Returns true if this exact `Entity` value is still the live
    /// occupant of its table slot.
    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        self.entities.contains(e)
    }

    /// Returns the number of current live entities in this `World`,
    /// built-ins included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the world holds no live entities. Never the case
    /// after `new`, which registers the built-ins.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registers a new component type with `stride` bytes of payload per
    /// entity, and returns the entity identifying it.
    pub fn register(&mut self, stride: usize) -> Entity {
        let e = self.entities.create(EntityKind::COMPONENT);
        if self.storage_index(e).is_some() {
            // A freed component's index was recycled; its storage lives
            // for the world's lifetime and answers to the index already.
            return e;
        }
        self.storages.push(Storage::new(e, stride));
        info!("[World] registers component {} ({} bytes).", e, stride);
        e
    }

    /// Registers a payload-less component. Tags still occupy a storage,
    /// so `attach`/`detach`/`has` work on them, and they serve as the
    /// `object` of relations.
    #[inline]
    pub fn register_tag(&mut self) -> Entity {
        self.register(0)
    }

    /// Mints a system entity: `callback` will run under `step` against
    /// every entity carrying all of `components`. Systems start enabled.
    pub fn register_system(&mut self, callback: SystemFn, components: &[Entity]) -> Entity {
        let e = self.entities.create(EntityKind::SYSTEM);
        self.attach_to_storage(e, self.builtins.system)
            .unwrap_or_else(|err| panic!("{}", err));

        let payload = System {
            callback: Some(callback),
            components: ComponentSet::new(components),
            enabled: true,
        };
        self.write_builtin(e, self.builtins.system, payload);
        info!(
            "[World] registers system {} over {} components.",
            e,
            components.len()
        );
        e
    }

    /// Mints a prefab entity: attaching it to a target attaches every
    /// component in `components` instead. Entries may themselves be
    /// prefabs, nesting the expansion.
    pub fn register_prefab(&mut self, components: &[Entity]) -> Entity {
        let e = self.entities.create(EntityKind::PREFAB);
        self.attach_to_storage(e, self.builtins.prefab)
            .unwrap_or_else(|err| panic!("{}", err));

        let payload = Prefab {
            components: ComponentSet::new(components),
        };
        self.write_builtin(e, self.builtins.prefab, payload);
        info!(
            "[World] registers prefab {} over {} components.",
            e,
            components.len()
        );
        e
    }

    /// Destroys a live entity: removes it from every storage (in
    /// reverse registration order), bumps its slot version and recycles
    /// its index. Every outstanding copy of the value turns stale.
    pub fn free(&mut self, e: Entity) {
        assert!(self.is_alive(e), "{}", Error::StaleEntity(e));

        for i in (0..self.storages.len()).rev() {
            if self.storages[i].has(e) {
                self.storages[i].remove(e);
            }
        }
        self.entities.free(e);
    }

    /// Attaches `component` to `entity`, leaving the payload slot
    /// zero-filled; use `set` to attach with data in one step. Attaching
    /// a prefab expands to its component list instead. Panics when the
    /// entity already has the component (attach is not an upsert), when
    /// either side is stale, or when `component` is a system or relation
    /// entity; `try_attach` is the non-panicking variant.
    pub fn attach(&mut self, entity: Entity, component: Entity) {
        self.try_attach(entity, component)
            .unwrap_or_else(|err| panic!("{}", err));
    }

    /// See `attach`.
    pub fn try_attach(&mut self, entity: Entity, component: Entity) -> Result<()> {
        match component.kind() {
            // Relation edges go through `associate`, and system entities
            // are not attachable payloads.
            EntityKind::SYSTEM | EntityKind::RELATION => Err(Error::NotAttachable(component)),
            EntityKind::PREFAB => {
                if !self.is_alive(component) {
                    return Err(Error::StaleEntity(component));
                }
                let prefab = self
                    .find(self.builtins.prefab)
                    .and_then(|storage| storage.read::<Prefab>(component))
                    .ok_or_else(|| Error::NotAttached(component, self.builtins.prefab))?;
                for c in prefab.components.iter() {
                    self.try_attach(entity, c)?;
                }
                Ok(())
            }
            _ => self.attach_to_storage(entity, component),
        }
    }

    /// Detaches `component` from `entity`. Panics when absent or stale;
    /// `try_detach` is the non-panicking variant.
    pub fn detach(&mut self, entity: Entity, component: Entity) {
        self.try_detach(entity, component)
            .unwrap_or_else(|err| panic!("{}", err));
    }

    /// See `detach`.
    pub fn try_detach(&mut self, entity: Entity, component: Entity) -> Result<()> {
        if !self.is_alive(entity) {
            return Err(Error::StaleEntity(entity));
        }
        if !self.is_alive(component) {
            return Err(Error::StaleEntity(component));
        }
        let index = self
            .storage_index(component)
            .ok_or_else(|| Error::UnregisteredComponent(component))?;
        if !self.storages[index].has(entity) {
            return Err(Error::NotAttached(entity, component));
        }
        self.storages[index].remove(entity);
        Ok(())
    }

    /// Upserts the payload of `(entity, component)`: overwrites in place
    /// when attached, attaches first when not. `data` must be exactly
    /// one stride long. Unlike `attach`, calling this twice is fine.
    pub fn set(&mut self, entity: Entity, component: Entity, data: &[u8]) {
        self.try_set(entity, component, data)
            .unwrap_or_else(|err| panic!("{}", err));
    }

    /// See `set`.
    pub fn try_set(&mut self, entity: Entity, component: Entity, data: &[u8]) -> Result<()> {
        let index = self.check_write(entity, component, data.len())?;
        let storage = &mut self.storages[index];
        let slot = if storage.has(entity) {
            storage.get_mut(entity)
        } else {
            storage.emplace(entity)
        };
        slot.copy_from_slice(data);
        Ok(())
    }

    /// Typed variant of `set`: upserts `value`'s byte image. The width
    /// of `T` must match the component's stride.
    pub fn set_value<T: Copy>(&mut self, entity: Entity, component: Entity, value: T) {
        match self.check_write(entity, component, mem::size_of::<T>()) {
            Ok(index) => self.storages[index].write(entity, value),
            Err(err) => panic!("{}", err),
        }
    }

    /// Returns the payload bytes of `(entity, component)`, or `None`
    /// when the entity does not carry the component, the component has
    /// no storage, or the entity is stale. Never panics.
    pub fn get(&self, entity: Entity, component: Entity) -> Option<&[u8]> {
        self.find(component)?.try_get(entity)
    }

    /// Mutable variant of `get`. Additionally yields `None` for the
    /// built-in system component, whose payloads are only mutated
    /// through the dedicated system operations.
    pub fn get_mut(&mut self, entity: Entity, component: Entity) -> Option<&mut [u8]> {
        if component.index() == self.builtins.system.index() {
            return None;
        }
        let index = self.storage_index(component)?;
        self.storages[index].try_get_mut(entity)
    }

    /// Typed variant of `get`: copies the payload out as a value.
    pub fn get_value<T: Copy>(&self, entity: Entity, component: Entity) -> Option<T> {
        self.find(component)?.read(entity)
    }

    /// Returns true if `entity` currently carries `component`. Never
    /// panics.
    #[inline]
    pub fn has(&self, entity: Entity, component: Entity) -> bool {
        self.find(component).map_or(false, |s| s.has(entity))
    }

    /// Records the single outgoing relation edge of `entity`: an
    /// `object` component tagged by a plain-entity `relation` predicate.
    /// Overwrites any edge the entity already holds.
    pub fn associate(&mut self, entity: Entity, object: Entity, relation: Entity) {
        assert!(self.is_alive(entity), "{}", Error::StaleEntity(entity));
        assert!(self.is_alive(object), "{}", Error::StaleEntity(object));
        assert_eq!(
            object.kind(),
            EntityKind::COMPONENT,
            "{} is not a component.",
            object
        );
        assert!(self.is_alive(relation), "{}", Error::StaleEntity(relation));
        assert_eq!(
            relation.kind(),
            EntityKind::ENTITY,
            "{} is not a plain entity.",
            relation
        );

        let index = self.builtin_index(self.builtins.relation);
        self.storages[index].write(entity, Relation { object, relation });
    }

    /// Drops the relation edge of `entity`. Panics when the entity holds
    /// none.
    pub fn disassociate(&mut self, entity: Entity) {
        assert!(self.is_alive(entity), "{}", Error::StaleEntity(entity));
        assert!(
            self.has(entity, self.builtins.relation),
            "{}",
            Error::NotAttached(entity, self.builtins.relation)
        );
        let index = self.builtin_index(self.builtins.relation);
        self.storages[index].remove(entity);
    }

    /// Returns true if the relation edge of `entity` points at `object`.
    /// False when the entity holds no edge at all. Never panics.
    pub fn has_relation(&self, entity: Entity, object: Entity) -> bool {
        self.find(self.builtins.relation)
            .and_then(|s| s.read::<Relation>(entity))
            .map_or(false, |pair| pair.object == object)
    }

    /// Returns true if the relation edge of `entity` is tagged by
    /// `relation`. False when the entity holds no edge at all. Never
    /// panics.
    pub fn related(&self, entity: Entity, relation: Entity) -> bool {
        self.find(self.builtins.relation)
            .and_then(|s| s.read::<Relation>(entity))
            .map_or(false, |pair| pair.relation == relation)
    }

    /// Starts building an entity fluently:
    ///
    /// ```ignore
    /// let e = world.build().with_value(position, Position { x: 0, y: 0 }).finish();
    /// ```
    pub fn build(&mut self) -> EntityBuilder {
        let entity = self.create();
        EntityBuilder {
            world: self,
            entity,
        }
    }

    fn attach_to_storage(&mut self, entity: Entity, component: Entity) -> Result<()> {
        if !self.is_alive(entity) {
            return Err(Error::StaleEntity(entity));
        }
        if !self.is_alive(component) {
            return Err(Error::StaleEntity(component));
        }
        let index = self
            .storage_index(component)
            .ok_or_else(|| Error::UnregisteredComponent(component))?;
        if self.storages[index].has(entity) {
            return Err(Error::AlreadyAttached(entity, component));
        }
        self.storages[index].emplace(entity);
        Ok(())
    }

    fn check_write(&self, entity: Entity, component: Entity, payload: usize) -> Result<usize> {
        if !self.is_alive(entity) {
            return Err(Error::StaleEntity(entity));
        }
        if !self.is_alive(component) {
            return Err(Error::StaleEntity(component));
        }
        // System payloads hold a callback pointer; raw bytes can not
        // fabricate one through the safe surface.
        if component.index() == self.builtins.system.index() {
            return Err(Error::NotWritable(component));
        }
        let index = self
            .storage_index(component)
            .ok_or_else(|| Error::UnregisteredComponent(component))?;
        let stride = self.storages[index].stride();
        if payload != stride {
            return Err(Error::PayloadSize(payload, stride, component));
        }
        Ok(index)
    }

    fn write_builtin<T: Copy>(&mut self, entity: Entity, component: Entity, value: T) {
        let index = self.builtin_index(component);
        self.storages[index].write(entity, value);
    }

    pub(crate) fn builtin_index(&self, component: Entity) -> usize {
        self.storage_index(component)
            .expect("a built-in storage is missing.")
    }

    /// Storage lookup goes by component index alone, the identity a
    /// storage keeps for the world's whole lifetime.
    pub(crate) fn storage_index(&self, component: Entity) -> Option<usize> {
        self.storages
            .iter()
            .position(|s| s.component().index() == component.index())
    }

    pub(crate) fn find(&self, component: Entity) -> Option<&Storage> {
        self.storage_index(component).map(|i| &self.storages[i])
    }
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

/// Fluent helper returned by `World::build`, upserting payloads onto a
/// freshly created entity.
pub struct EntityBuilder<'a> {
    world: &'a mut World,
    entity: Entity,
}

impl<'a> EntityBuilder<'a> {
    /// Upserts raw payload bytes, like `World::set`.
    pub fn with(self, component: Entity, data: &[u8]) -> Self {
        self.world.set(self.entity, component, data);
        self
    }

    /// Upserts a typed payload, like `World::set_value`.
    pub fn with_value<T: Copy>(self, component: Entity, value: T) -> Self {
        self.world.set_value(self.entity, component, value);
        self
    }

    /// Attaches a component with a zero-filled payload, like
    /// `World::attach`.
    pub fn with_default(self, component: Entity) -> Self {
        self.world.attach(self.entity, component);
        self
    }

    /// Finishes and returns the entity.
    pub fn finish(self) -> Entity {
        self.entity
    }
}
