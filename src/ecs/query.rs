//! Query rows and system execution.

use std::marker::PhantomData;
use std::{mem, ptr, slice};

use smallvec::SmallVec;

use crate::errors::Error;
use crate::utils::handle::{Entity, EntityKind};

use super::component::{Relation, System};
use super::world::World;

struct Field {
    component: Entity,
    ptr: *mut u8,
    len: usize,
    writable: bool,
}

/// One matching entity handed to a query or system callback, paired
/// with the requested component payloads in request order.
///
/// Fields are accessed by position. An out-of-range position, or a slot
/// whose recorded component is nil, reads as absent rather than
/// panicking, so callbacks can treat optional fields and bad indices
/// uniformly.
pub struct Row<'w> {
    entity: Entity,
    fields: SmallVec<[Field; 8]>,
    _world: PhantomData<&'w mut ()>,
}

impl<'w> Row<'w> {
    pub(crate) fn new(entity: Entity) -> Self {
        Row {
            entity,
            fields: SmallVec::new(),
            _world: PhantomData,
        }
    }

    pub(crate) fn push(&mut self, component: Entity, ptr: *mut u8, len: usize, writable: bool) {
        self.fields.push(Field {
            component,
            ptr,
            len,
            writable,
        });
    }

    /// The matching entity.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The number of fields carried by this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row carries no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The component recorded at a field position.
    pub fn component(&self, index: usize) -> Option<Entity> {
        self.fields.get(index).map(|f| f.component)
    }

    /// The payload bytes at a field position, or `None` when the
    /// position is out of range or the slot's component is nil.
    pub fn field(&self, index: usize) -> Option<&[u8]> {
        let f = self.fields.get(index)?;
        if f.component.is_nil() {
            return None;
        }
        Some(unsafe { slice::from_raw_parts(f.ptr, f.len) })
    }

    /// Mutable variant of `field`. Additionally `None` for read-only
    /// fields (the built-in system component's payloads).
    pub fn field_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let f = self.fields.get(index)?;
        if f.component.is_nil() || !f.writable {
            return None;
        }
        Some(unsafe { slice::from_raw_parts_mut(f.ptr, f.len) })
    }

    /// Reads the field at `index` as a value. The width of `T` must
    /// match the field width.
    pub fn get<T: Copy>(&self, index: usize) -> Option<T> {
        let bytes = self.field(index)?;
        assert_eq!(
            bytes.len(),
            mem::size_of::<T>(),
            "payload of {} bytes does not match the {} byte field.",
            mem::size_of::<T>(),
            bytes.len()
        );
        Some(unsafe { ptr::read_unaligned(bytes.as_ptr() as *const T) })
    }

    /// Writes `value` over the field at `index`. Panics when the field
    /// is absent or read-only, or when the width of `T` does not match.
    pub fn set<T: Copy>(&mut self, index: usize, value: T) {
        let bytes =
            unsafe { slice::from_raw_parts(&value as *const T as *const u8, mem::size_of::<T>()) };
        let slot = self
            .field_mut(index)
            .unwrap_or_else(|| panic!("field {} is absent or read-only.", index));
        assert_eq!(
            slot.len(),
            bytes.len(),
            "payload of {} bytes does not match the {} byte field.",
            bytes.len(),
            slot.len()
        );
        slot.copy_from_slice(bytes);
    }
}

impl World {
    /// Runs `callback` for every entity that carries all of
    /// `components`, in entity table order, handing it the payloads in
    /// request order.
    ///
    /// The scan walks raw table slots: slots whose entity was destroyed
    /// simply fail the component filter. With an empty component list
    /// nothing can fail it, and every slot is visited, tombstones
    /// included. Every component in the list must have a registered
    /// storage.
    ///
    /// The callback sees only its `Row`; the world stays borrowed for
    /// the whole scan, so structural changes wait until it returns.
    pub fn query<F>(&mut self, components: &[Entity], mut callback: F)
    where
        F: FnMut(&mut Row),
    {
        let slots = self.entities.slots().len();
        for i in 0..slots {
            let entity = self.entities.slots()[i];
            let mut row = Row::new(entity);
            let mut matches = true;

            for &component in components {
                let index = self
                    .storage_index(component)
                    .unwrap_or_else(|| panic!("{}", Error::UnregisteredComponent(component)));
                if !self.storages[index].has(entity) {
                    matches = false;
                    break;
                }

                let stride = self.storages[index].stride();
                let writable = component.index() != self.builtins.system.index();
                let ptr = self.storages[index].slot_ptr(entity);
                row.push(component, ptr, stride, writable);
            }

            if matches {
                callback(&mut row);
            }
        }
    }

    /// Runs a system entity's stored callback against its stored
    /// component list, whether or not the system is enabled.
    pub fn run_system(&mut self, system: Entity) {
        let payload = self.system_payload(system);
        let callback = payload
            .callback
            .unwrap_or_else(|| panic!("{} has no callback.", system));
        self.query(payload.components.as_slice(), |row| callback(row));
    }

    /// Runs every enabled system once, in system registration order.
    /// Meant to be driven once per simulation tick by the host's frame
    /// loop. Cost is proportional to the number of systems, not the
    /// number of entities.
    pub fn step(&mut self) {
        let index = self.builtin_index(self.builtins.system);
        let systems: SmallVec<[System; 8]> = {
            let storage = &self.storages[index];
            (0..storage.len())
                .map(|position| storage.read_at::<System>(position))
                .collect()
        };

        for system in systems {
            if !system.enabled {
                continue;
            }
            if let Some(callback) = system.callback {
                self.query(system.components.as_slice(), |row| callback(row));
            }
        }
    }

    /// Lets `step` run the system again.
    pub fn enable_system(&mut self, system: Entity) {
        self.set_system_enabled(system, true);
    }

    /// Makes `step` skip the system; `run_system` still works.
    pub fn disable_system(&mut self, system: Entity) {
        self.set_system_enabled(system, false);
    }

    /// Runs `callback` for every entity whose relation edge records
    /// `tag` as its object and `parent` as its predicate, handing it a
    /// single-field row over the `Relation` payload. With the built-in
    /// child-of tag this enumerates the children of `parent`.
    pub fn relations_of<F>(&mut self, parent: Entity, tag: Entity, mut callback: F)
    where
        F: FnMut(&mut Row),
    {
        let index = self.builtin_index(self.builtins.relation);
        let slots = self.entities.slots().len();
        for i in 0..slots {
            let entity = self.entities.slots()[i];
            let pair = match self.storages[index].read::<Relation>(entity) {
                Some(pair) => pair,
                None => continue,
            };
            if pair.object != tag || pair.relation != parent {
                continue;
            }

            let ptr = self.storages[index].slot_ptr(entity);
            let mut row = Row::new(entity);
            row.push(tag, ptr, mem::size_of::<Relation>(), true);
            callback(&mut row);
        }
    }

    fn set_system_enabled(&mut self, system: Entity, enabled: bool) {
        let mut payload = self.system_payload(system);
        payload.enabled = enabled;
        let index = self.builtin_index(self.builtins.system);
        self.storages[index].write(system, payload);
    }

    fn system_payload(&self, system: Entity) -> System {
        assert!(self.is_alive(system), "{}", Error::StaleEntity(system));
        assert_eq!(
            system.kind(),
            EntityKind::SYSTEM,
            "{} is not a system.",
            system
        );
        let index = self.builtin_index(self.builtins.system);
        self.storages[index]
            .read::<System>(system)
            .unwrap_or_else(|| panic!("{}", Error::NotAttached(system, self.builtins.system)))
    }
}
