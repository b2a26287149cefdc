//! 2D collision detection
//!
//! Shapes are `Hitbox` variants (point, circle, polygon, line segment).
//! `collide` dispatches a pair of hitboxes to the right narrow-phase test and
//! optionally reports a minimum translation vector that separates them.
//!
//! The module is purely functional over its inputs: no shared state, safe to
//! call repeatedly and in any order within a tick.

pub mod hitbox;
pub mod narrow;

pub use hitbox::{Aabb, Hitbox, ShapeError};
pub use narrow::collide;
