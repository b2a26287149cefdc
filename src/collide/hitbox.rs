//! Hitbox shapes and their derived state
//!
//! Every mutator keeps derived state (world vertices, bounding boxes)
//! consistent immediately; there is no lazy recompute.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from hitbox construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("polygons must have at least three vertices, got {0}")]
    TooFewVertices(usize),
}

/// Axis-aligned bounding box, stored as min/max corners.
///
/// Used only as a fast rejection for polygon and circle pairs, never as the
/// final answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Tight box around a set of points.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Box around a circle.
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            min: center - Vec2::splat(radius),
            max: center + Vec2::splat(radius),
        }
    }

    /// Half-open interval overlap test on both axes: boxes that merely touch
    /// along an edge or corner do not count as overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Strict interior containment test for a point.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Shift the box by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.min += delta;
        self.max += delta;
    }
}

/// A collision shape with its position state.
///
/// Polygons carry their vertices in two frames: `local` offsets as authored,
/// and `world` = translation + rotation applied. The two always have the same
/// length, and `bbox` is always the tight box of the world vertices.
#[derive(Debug, Clone)]
pub enum Hitbox {
    Point {
        pos: Vec2,
    },
    Circle {
        pos: Vec2,
        radius: f32,
        radius_sq: f32,
        bbox: Aabb,
    },
    Polygon {
        local: Vec<Vec2>,
        world: Vec<Vec2>,
        pos: Vec2,
        angle: f32,
        bbox: Aabb,
    },
    Line {
        start: Vec2,
        end: Vec2,
    },
}

impl Hitbox {
    /// A point hitbox at an absolute position.
    pub fn point(pos: Vec2) -> Self {
        Hitbox::Point { pos }
    }

    /// A circle hitbox. The squared radius is precomputed for the
    /// point-in-circle fast path.
    pub fn circle(pos: Vec2, radius: f32) -> Self {
        Hitbox::Circle {
            pos,
            radius,
            radius_sq: radius * radius,
            bbox: Aabb::around_circle(pos, radius),
        }
    }

    /// A polygon hitbox from its local vertex offsets, placed at the origin.
    ///
    /// Fails for fewer than three vertices.
    pub fn polygon(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices(points.len()));
        }
        Ok(Self::new_polygon(points.to_vec()))
    }

    /// A polygon hitbox placed at `pos` in one step.
    pub fn polygon_at(points: &[Vec2], pos: Vec2) -> Result<Self, ShapeError> {
        let mut poly = Self::polygon(points)?;
        poly.set_pos(pos);
        Ok(poly)
    }

    /// An axis-aligned rectangle with its top-left corner at `pos`.
    pub fn rect(pos: Vec2, w: f32, h: f32) -> Self {
        let mut poly = Self::new_polygon(vec![
            Vec2::ZERO,
            Vec2::new(w, 0.0),
            Vec2::new(w, h),
            Vec2::new(0.0, h),
        ]);
        poly.set_pos(pos);
        poly
    }

    /// A line segment hitbox between two absolute endpoints.
    pub fn line(start: Vec2, end: Vec2) -> Self {
        Hitbox::Line { start, end }
    }

    fn new_polygon(local: Vec<Vec2>) -> Self {
        let world = local.clone();
        let bbox = Aabb::from_points(&world);
        Hitbox::Polygon {
            local,
            world,
            pos: Vec2::ZERO,
            angle: 0.0,
            bbox,
        }
    }

    /// Sets the hitbox's absolute position.
    ///
    /// For polygons the world vertices and bounding box are rebuilt from the
    /// local frame (rotation preserved). For lines, `start` moves to the new
    /// position and `end` keeps its offset from `start`.
    pub fn set_pos(&mut self, new_pos: Vec2) {
        match self {
            Hitbox::Point { pos } => *pos = new_pos,
            Hitbox::Circle {
                pos, radius, bbox, ..
            } => {
                *pos = new_pos;
                *bbox = Aabb::around_circle(new_pos, *radius);
            }
            Hitbox::Polygon {
                local,
                world,
                pos,
                angle,
                bbox,
            } => {
                *pos = new_pos;
                rebuild_world(local, world, new_pos, *angle);
                *bbox = Aabb::from_points(world);
            }
            Hitbox::Line { start, end } => {
                let delta = *end - *start;
                *start = new_pos;
                *end = new_pos + delta;
            }
        }
    }

    /// Moves the hitbox relative to its current position.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Hitbox::Point { pos } => *pos += delta,
            Hitbox::Circle { pos, bbox, .. } => {
                *pos += delta;
                bbox.translate(delta);
            }
            Hitbox::Polygon {
                world, pos, bbox, ..
            } => {
                *pos += delta;
                for p in world.iter_mut() {
                    *p += delta;
                }
                bbox.translate(delta);
            }
            Hitbox::Line { start, end } => {
                *start += delta;
                *end += delta;
            }
        }
    }

    /// Rotates a polygon about its translation point. Other shapes are
    /// unaffected (points and circles are rotation-invariant; lines are
    /// positioned by their endpoints).
    pub fn set_angle(&mut self, new_angle: f32) {
        if let Hitbox::Polygon {
            local,
            world,
            pos,
            angle,
            bbox,
        } = self
        {
            *angle = new_angle;
            rebuild_world(local, world, *pos, new_angle);
            *bbox = Aabb::from_points(world);
        }
    }

    /// The shape's bounding box. Points and lines don't carry one.
    pub fn aabb(&self) -> Option<Aabb> {
        match self {
            Hitbox::Circle { bbox, .. } | Hitbox::Polygon { bbox, .. } => Some(*bbox),
            _ => None,
        }
    }
}

fn rebuild_world(local: &[Vec2], world: &mut [Vec2], pos: Vec2, angle: f32) {
    let (sin, cos) = angle.sin_cos();
    for (w, l) in world.iter_mut().zip(local) {
        *w = pos + Vec2::new(l.x * cos - l.y * sin, l.x * sin + l.y * cos);
    }
}
