//! The entity contract
//!
//! Every simulated object (walls, bodies, spawners) implements `Entity` and
//! embeds an `EntityBase` for the state the engine manages: tags, colliders,
//! position, health, and the deferred-deletion flag.

use std::any::Any;

use glam::Vec2;

use crate::collide::{Hitbox, collide};
use crate::engine::Engine;

slotmap::new_key_type! {
    /// Generational handle into the engine's entity arena.
    ///
    /// Keys outlive the entities they name: dereferencing a stale key via
    /// `Engine::get` yields `None` instead of a dangling reference.
    pub struct EntityKey;
}

/// Configuration for an entity's engine-managed state, applied in one step
/// at construction.
#[derive(Debug, Default)]
pub struct EntitySpec {
    pub tags: Vec<String>,
    pub colliders: Vec<Hitbox>,
    pub position: Vec2,
    pub max_health: f32,
}

/// Engine-managed state shared by every entity.
#[derive(Debug)]
pub struct EntityBase {
    /// Free-form labels for group queries. Duplicates are harmless.
    tags: Vec<String>,
    /// Hitboxes; empty means the entity never collides.
    pub colliders: Vec<Hitbox>,
    /// Authoritative world position. Colliders follow it only via explicit
    /// `set_collider_pos` calls.
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Deferred-deletion flag; the engine sweeps at end of tick.
    pub marked_for_delete: bool,
    key: EntityKey,
}

impl EntityBase {
    pub fn new(spec: EntitySpec) -> Self {
        Self {
            tags: spec.tags,
            colliders: spec.colliders,
            position: spec.position,
            health: spec.max_health,
            max_health: spec.max_health,
            marked_for_delete: false,
            key: EntityKey::default(),
        }
    }

    /// The entity's own handle, bound by `Engine::add_entity`. Null until
    /// the entity is registered.
    pub fn key(&self) -> EntityKey {
        self.key
    }

    pub(super) fn bind_key(&mut self, key: EntityKey) {
        self.key = key;
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Deals damage; at zero or below the entity is flagged for deletion,
    /// never removed inline.
    pub fn damage(&mut self, amount: f32) {
        self.health -= amount;
        if self.health <= 0.0 {
            self.marked_for_delete = true;
        }
    }

    /// Moves every collider to the given position.
    pub fn set_collider_pos(&mut self, pos: Vec2) {
        for c in &mut self.colliders {
            c.set_pos(pos);
        }
    }

    /// Rotates every collider (only polygons respond).
    pub fn set_collider_angle(&mut self, angle: f32) {
        for c in &mut self.colliders {
            c.set_angle(angle);
        }
    }

    /// Pairwise collider sweep against another entity, stopping at the first
    /// hit. Entities without colliders never overlap anything.
    pub fn overlaps(&self, other: &EntityBase, mut trans: Option<&mut Vec2>) -> bool {
        for a in &self.colliders {
            for b in &other.colliders {
                if collide(a, b, trans.as_deref_mut()) {
                    return true;
                }
            }
        }
        false
    }
}

/// Contract every simulated object implements.
///
/// The engine owns entities exclusively; an entity reaches back into the
/// simulation only through the `Engine` reference passed to its hooks.
pub trait Entity {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    /// Per-tick update with the effective time delta. Does nothing by
    /// default. The entity itself is absent from engine queries while its
    /// own update runs.
    fn update(&mut self, _engine: &mut Engine, _dt: f32) {}

    /// Runs exactly once, after the final tick in which deletion was
    /// flagged, before removal. Does nothing by default.
    fn on_death(&mut self, _engine: &mut Engine) {}

    /// Draws the entity to an opaque surface the core never interprets.
    /// Does nothing by default.
    fn render(&self, _surface: &mut dyn Any) {}
}
