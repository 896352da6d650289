//! Entity Component System (ECS)
//!
//! Entities are generational handles minted by a `World`; components
//! are runtime-registered payload types, each backed by its own packed
//! sparse-set storage; systems, prefabs and relations are built-in
//! components layered on the same machinery.

pub mod component;
pub mod query;
pub mod sparse;
pub mod storage;
pub mod world;

pub use self::component::{ComponentSet, Prefab, Relation, System, SystemFn};
pub use self::query::Row;
pub use self::sparse::SparseSet;
pub use self::storage::Storage;
pub use self::world::{EntityBuilder, World};
