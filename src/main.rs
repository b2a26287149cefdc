//! Gridfire headless demo
//!
//! Runs the simulation core without a renderer: four boundary walls, a
//! director that spawns drifting bodies and toggles slow motion, and a
//! camera following the oldest drifter. Useful for eyeballing engine
//! behavior from the logs.

use std::thread;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use gridfire::{ConfigError, Engine, EngineConfig, Entity, EntityBase, EntitySpec, Hitbox, tags};

const ARENA_SIZE: Vec2 = Vec2::new(1200.0, 800.0);
const WALL_THICKNESS: f32 = 32.0;
const VIEW_SIZE: Vec2 = Vec2::new(800.0, 600.0);
const DEMO_FRAMES: u32 = 600;

/// Static arena boundary.
struct Wall {
    base: EntityBase,
}

impl Wall {
    fn new(pos: Vec2, w: f32, h: f32) -> Self {
        Self {
            base: EntityBase::new(EntitySpec {
                tags: vec!["wall".into()],
                colliders: vec![Hitbox::rect(pos, w, h)],
                position: pos,
                max_health: 0.0,
            }),
        }
    }
}

impl Entity for Wall {
    fn base(&self) -> &EntityBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

/// A body that drifts, bounces off walls, and expires after a few seconds.
struct Drifter {
    base: EntityBase,
    vel: Vec2,
}

impl Drifter {
    const RADIUS: f32 = 12.0;
    const LIFESPAN: f32 = 6.0;

    fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            base: EntityBase::new(EntitySpec {
                tags: vec!["drifter".into()],
                colliders: vec![Hitbox::circle(pos, Self::RADIUS)],
                position: pos,
                max_health: Self::LIFESPAN,
            }),
            vel,
        }
    }
}

impl Entity for Drifter {
    fn base(&self) -> &EntityBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, engine: &mut Engine, dt: f32) {
        self.base.position += self.vel * dt;
        let pos = self.base.position;
        self.base.set_collider_pos(pos);

        // Resolve wall overlaps with the MTV and reflect off its normal.
        for key in engine.tagged("wall") {
            let Some(wall) = engine.get(key) else { continue };
            let mut mtv = Vec2::ZERO;
            if self.base.overlaps(wall.base(), Some(&mut mtv)) {
                self.base.position += mtv;
                let pos = self.base.position;
                self.base.set_collider_pos(pos);

                let n = mtv.normalize_or_zero();
                self.vel -= 2.0 * self.vel.dot(n) * n;
            }
        }

        // Drifters age out; expiry goes through the normal damage path so
        // the end-of-tick sweep handles removal.
        self.base.damage(dt);
    }

    fn on_death(&mut self, engine: &mut Engine) {
        log::debug!(
            "drifter expired at {:?} ({} entities live)",
            self.base.position,
            engine.entity_count()
        );
    }
}

/// Persistent manager: spawns drifters on an interval and periodically
/// toggles slow motion. Exempt from purges and from time scaling so it keeps
/// running while the rest of the world is slowed or paused.
struct Director {
    base: EntityBase,
    rng: Pcg32,
    spawn_timer: f32,
    slow_timer: f32,
    slow: bool,
}

impl Director {
    const SPAWN_INTERVAL: f32 = 0.4;
    const SLOW_INTERVAL: f32 = 3.0;

    fn new(seed: u64) -> Self {
        Self {
            base: EntityBase::new(EntitySpec {
                tags: vec![
                    tags::PURGE_EXEMPT.into(),
                    tags::TIMESCALE_EXEMPT.into(),
                ],
                ..Default::default()
            }),
            rng: Pcg32::seed_from_u64(seed),
            spawn_timer: 0.0,
            slow_timer: Self::SLOW_INTERVAL,
            slow: false,
        }
    }
}

impl Entity for Director {
    fn base(&self) -> &EntityBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, engine: &mut Engine, dt: f32) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer += Self::SPAWN_INTERVAL;
            let pos = Vec2::new(
                self.rng.random_range(100.0..ARENA_SIZE.x - 100.0),
                self.rng.random_range(100.0..ARENA_SIZE.y - 100.0),
            );
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(80.0..240.0);
            let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            engine.add_entity(Drifter::new(pos, vel));
        }

        self.slow_timer -= dt;
        if self.slow_timer <= 0.0 {
            self.slow_timer += Self::SLOW_INTERVAL;
            self.slow = !self.slow;
            engine.set_time_scale(if self.slow { 0.25 } else { 1.0 });
            log::info!(
                "time scale -> {} ({} entities live)",
                engine.time_scale(),
                engine.entity_count()
            );
        }

        // Camera chases the oldest drifter.
        if let Some(key) = engine.tagged("drifter").first().copied() {
            if let Some(target) = engine.get(key).map(|e| e.base().position) {
                engine.camera_mut().set_target(target);
            }
        }
    }
}

fn spawn_arena(engine: &mut Engine) {
    let (w, h, t) = (ARENA_SIZE.x, ARENA_SIZE.y, WALL_THICKNESS);
    engine.add_entity(Wall::new(Vec2::new(0.0, 0.0), w, t));
    engine.add_entity(Wall::new(Vec2::new(0.0, h - t), w, t));
    engine.add_entity(Wall::new(Vec2::new(0.0, t), t, h - 2.0 * t));
    engine.add_entity(Wall::new(Vec2::new(w - t, t), t, h - 2.0 * t));
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let config = EngineConfig::from_json(
        r#"{"dt_mode": "seconds", "time_scale": 1.0, "camera_tightness": 0.08}"#,
    )?;
    let mut engine = Engine::with_config(&config);

    engine.camera_mut().set_enabled(true);
    engine.camera_mut().set_offset(VIEW_SIZE / 2.0);
    engine.camera_mut().set_pos(ARENA_SIZE / 2.0);

    spawn_arena(&mut engine);
    engine.add_entity(Director::new(0xD1CE));

    for frame in 0..DEMO_FRAMES {
        engine.tick();
        thread::sleep(Duration::from_millis(8));

        if frame % 120 == 0 {
            log::info!(
                "frame {frame}: {} entities, camera at {:?}",
                engine.entity_count(),
                engine.camera().pos()
            );
        }
    }

    // Level transition: everything but the director goes.
    engine.purge(false);
    log::info!("after purge: {} entities", engine.entity_count());

    Ok(())
}
