//! Lerp-follow camera
//!
//! Two states: following (interpolates toward the target every tick) and
//! static (moves only via explicit `set_pos`). Transitions are explicit.

use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Camera {
    pos: Vec2,
    target: Vec2,
    /// Screen-space offset, used to place a world position at a particular
    /// screen pixel (e.g. the viewport center).
    offset: Vec2,
    /// Convergence factor in (0, 1]; 1 snaps immediately.
    tightness: f32,
    enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            offset: Vec2::ZERO,
            tightness: 1.0,
            enabled: false,
        }
    }
}

impl Camera {
    /// Jumps the camera to a position. The follow target snaps with it so
    /// the next tick doesn't drag the view back.
    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
        self.target = pos;
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn set_tightness(&mut self, tightness: f32) {
        self.tightness = tightness;
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// One tick of follow movement; does nothing while static.
    pub(super) fn advance(&mut self) {
        if self.enabled {
            self.pos = self.pos.lerp(self.target, self.tightness);
        }
    }

    /// World position to screen position under this camera.
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.pos + self.offset
    }

    /// Whether a world position lands inside a view of the given pixel size.
    /// Coarse: ignores the entity's extent, so it produces some false
    /// negatives near the view edges.
    pub fn is_visible(&self, world: Vec2, view_size: Vec2) -> bool {
        let screen = self.to_screen(world);
        screen.x > 0.0 && screen.x < view_size.x && screen.y > 0.0 && screen.y < view_size.y
    }
}
