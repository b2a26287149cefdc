//! Gridfire - top-down arena shooter core
//!
//! Core modules:
//! - `collide`: Narrow-phase 2D collision detection (SAT, circles, segments,
//!   points) with minimum-translation-vector resolution
//! - `engine`: Entity registry and frame-stepped simulation (delta time,
//!   time dilation, tag queries, deferred deletion, camera follow)
//! - `config`: Engine configuration, loadable from JSON
//!
//! The core is headless: rendering, input, and audio are collaborators that
//! live outside this crate and talk to it through the entity hooks.

pub mod collide;
pub mod config;
pub mod engine;

pub use collide::{Aabb, Hitbox, ShapeError, collide};
pub use config::{ConfigError, DtMode, EngineConfig};
pub use engine::{Camera, Engine, Entity, EntityBase, EntityKey, EntitySpec};

/// Well-known entity tags consumed by the engine itself.
pub mod tags {
    /// Entities with this tag always receive the raw, unscaled time delta.
    pub const TIMESCALE_EXEMPT: &str = "timescale exempt";
    /// Entities with this tag survive non-forced purges.
    pub const PURGE_EXEMPT: &str = "purge exempt";
}
