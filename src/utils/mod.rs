//! Commonly used utilities like handles and pools.

pub mod handle;
pub mod pool;

pub use self::handle::{Entity, EntityIndex, EntityKind, NIL_INDEX};
pub use self::pool::EntityPool;
