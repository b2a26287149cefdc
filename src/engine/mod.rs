//! Entity registry and frame-stepped simulation
//!
//! The engine exclusively owns the live entity set and advances it one tick
//! at a time: sample the clock, update every entity in registration order,
//! sweep out entities flagged for deletion (death hooks first), then advance
//! the camera. Everything runs on the single simulation thread; deletion is
//! deferred to end-of-tick so mid-tick queries always see a stable set.

pub mod camera;
pub mod entity;

pub use camera::Camera;
pub use entity::{Entity, EntityBase, EntityKey, EntitySpec};

use std::any::Any;
use std::time::Instant;

use slotmap::SlotMap;

use crate::config::{DtMode, EngineConfig};
use crate::tags;

/// Owns the live entities and the simulation clock.
pub struct Engine {
    /// Slots hold `None` only while their entity's own update is running.
    entities: SlotMap<EntityKey, Option<Box<dyn Entity>>>,
    /// Registration order; drives update and render iteration.
    order: Vec<EntityKey>,
    last_sample: Instant,
    /// Raw delta of the latest tick, in the configured unit.
    dt: f32,
    /// Speed of time. Zero pauses non-exempt entities outright.
    time_scale: f32,
    dt_mode: DtMode,
    camera: Camera,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let mut camera = Camera::default();
        camera.set_tightness(config.camera_tightness);
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            last_sample: Instant::now(),
            dt: 0.0,
            time_scale: config.time_scale,
            dt_mode: config.dt_mode,
            camera,
        }
    }

    /// Registers an entity, binds its own key into its base, and returns the
    /// key. Registering the same entity twice is a caller bug the engine
    /// does not guard against.
    pub fn add_entity<E: Entity + 'static>(&mut self, entity: E) -> EntityKey {
        let key = self.entities.insert(Some(Box::new(entity)));
        if let Some(Some(ent)) = self.entities.get_mut(key) {
            ent.base_mut().bind_key(key);
        }
        self.order.push(key);
        key
    }

    /// Advances one frame using the wall clock.
    pub fn tick(&mut self) {
        let raw = self.sample_clock();
        self.step(raw);
    }

    /// Advances one frame with an explicit raw delta (fixed-step callers and
    /// tests drive the engine through this).
    ///
    /// Entities tagged timescale-exempt receive the raw delta; everyone else
    /// receives the scaled delta, or is skipped entirely when the scale is
    /// exactly zero. Entities added mid-tick are updated in the same tick.
    pub fn step(&mut self, raw_dt: f32) {
        self.dt = raw_dt;

        let mut i = 0;
        while i < self.order.len() {
            let key = self.order[i];
            i += 1;
            let Some(mut ent) = self.entities.get_mut(key).and_then(Option::take) else {
                continue;
            };

            if ent.base().has_tag(tags::TIMESCALE_EXEMPT) {
                ent.update(self, raw_dt);
            } else if self.time_scale != 0.0 {
                ent.update(self, raw_dt * self.time_scale);
            }

            // The slot is gone if the entity purged itself away mid-update.
            if let Some(slot) = self.entities.get_mut(key) {
                *slot = Some(ent);
            }
        }

        self.sweep_deleted();
        self.camera.advance();
    }

    /// Recomputes the time delta without updating entities. Call this while
    /// paused so that resuming doesn't apply one huge accumulated delta.
    pub fn update_time_only(&mut self) {
        self.dt = self.sample_clock();
    }

    fn sample_clock(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_sample);
        self.last_sample = now;
        match self.dt_mode {
            DtMode::Seconds => elapsed.as_secs_f32(),
            DtMode::Milliseconds => elapsed.as_secs_f32() * 1000.0,
        }
    }

    /// Death hooks for everything flagged during the update pass, then one
    /// removal sweep. The flag is re-checked as the walk advances, so an
    /// entity flagged inside another's death hook still gets its own hook
    /// when it sits later in registration order; entities the walk has
    /// already passed are removed without one.
    fn sweep_deleted(&mut self) {
        let mut i = 0;
        while i < self.order.len() {
            let key = self.order[i];
            i += 1;
            let dead = self
                .entities
                .get(key)
                .and_then(|slot| slot.as_ref())
                .is_some_and(|e| e.base().marked_for_delete);
            if !dead {
                continue;
            }
            if let Some(mut ent) = self.entities.get_mut(key).and_then(Option::take) {
                ent.on_death(self);
            }
            self.entities.remove(key);
        }

        self.entities
            .retain(|_, slot| !matches!(slot, Some(e) if e.base().marked_for_delete));
        self.order.retain(|k| self.entities.contains_key(*k));
    }

    /// All live entities carrying the tag, in registration order. Unknown
    /// tags yield an empty list, never an error. Safe to call from inside an
    /// entity update; the updating entity itself is not visible.
    pub fn tagged(&self, tag: &str) -> Vec<EntityKey> {
        self.order
            .iter()
            .copied()
            .filter(|k| {
                self.entities
                    .get(*k)
                    .and_then(|slot| slot.as_ref())
                    .is_some_and(|e| e.base().has_tag(tag))
            })
            .collect()
    }

    /// Dereferences a key. Stale keys (and the key of the entity whose
    /// update is currently running) yield `None`.
    pub fn get(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.entities
            .get(key)
            .and_then(|slot| slot.as_ref())
            .map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut dyn Entity> {
        match self.entities.get_mut(key) {
            Some(Some(ent)) => Some(ent.as_mut()),
            _ => None,
        }
    }

    /// Removes entities in bulk (level transitions). Non-forced purges spare
    /// purge-exempt entities; forced purges remove everything. Death hooks
    /// do not run: this is teardown, not a kill.
    pub fn purge(&mut self, force: bool) {
        let before = self.entities.len();
        if force {
            self.entities.clear();
        } else {
            self.entities.retain(|_, slot| match slot {
                // Mid-update slot: the entity will be restored after its
                // update; it survives non-forced purges.
                None => true,
                Some(e) => e.base().has_tag(tags::PURGE_EXEMPT),
            });
        }
        self.order.retain(|k| self.entities.contains_key(*k));
        log::debug!(
            "purge(force={force}) removed {} entities, {} remain",
            before - self.entities.len(),
            self.entities.len()
        );
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Latest raw delta with the time scale applied.
    pub fn delta_time(&self) -> f32 {
        self.dt * self.time_scale
    }

    /// Latest raw delta, unscaled.
    pub fn delta_time_raw(&self) -> f32 {
        self.dt
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_dt_mode(&mut self, mode: DtMode) {
        self.dt_mode = mode;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Invokes every live entity's render hook in registration order against
    /// an opaque surface. Kept separate from `tick` so the caller's game
    /// loop decides when (and whether) to draw.
    pub fn render(&self, surface: &mut dyn Any) {
        for key in &self.order {
            if let Some(Some(ent)) = self.entities.get(*key) {
                ent.render(surface);
            }
        }
    }
}
