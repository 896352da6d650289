//! A tiny sparse-set entity component system.
//!
//! A `World` owns a generational entity table and one packed storage
//! per registered component. Components are registered at runtime by
//! payload width, attached and detached in O(1) through sparse sets,
//! and iterated densely by queries and systems. Prefabs compose
//! component lists, and relations record tagged subject -> object
//! edges between entities.
//!
//! ```
//! use stipple::prelude::*;
//!
//! #[derive(Debug, Copy, Clone, PartialEq)]
//! struct Position {
//!     x: f32,
//!     y: f32,
//! }
//!
//! let mut world = World::new();
//! let position = world.register(std::mem::size_of::<Position>());
//!
//! let e = world.build().with_value(position, Position { x: 1.0, y: 2.0 }).finish();
//! assert!(world.has(e, position));
//!
//! world.query(&[position], |row| {
//!     let p: Position = row.get(0).unwrap();
//!     assert_eq!(p, Position { x: 1.0, y: 2.0 });
//! });
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub mod ecs;
pub mod errors;
pub mod prelude;
pub mod utils;

pub use self::ecs::{Row, World};
pub use self::utils::handle::{Entity, EntityKind};
