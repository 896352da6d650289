pub use crate::ecs::{ComponentSet, Prefab, Relation, Row, System, SystemFn};
pub use crate::ecs::{EntityBuilder, World};
pub use crate::errors::{Error, Result};
pub use crate::utils::handle::{Entity, EntityKind};
