use crate::constants::{HALF_WORLD, WORLD_SIZE};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector pointing along `angle` in screen space (y grows downward).
    pub fn from_heading(angle: f64) -> Self {
        Vector2D::new(angle.cos(), -angle.sin())
    }

    pub fn wrapped(&self) -> Self {
        Vector2D::new(wrap(self.x), wrap(self.y))
    }
}

pub fn wrap_coordinate(value: f64, max: f64) -> f64 {
    let wrapped = value % max;
    if wrapped < 0.0 {
        // -0.0000001 % 256 + 256 rounds to exactly 256.0
        let folded = wrapped + max;
        if folded >= max { 0.0 } else { folded }
    } else {
        wrapped
    }
}

/// Folds a coordinate onto the torus, result in `[0, 256)`.
pub fn wrap(value: f64) -> f64 {
    wrap_coordinate(value, WORLD_SIZE)
}

/// Shortest per-axis distance between two coordinates on the torus (minimum image).
pub fn torus_delta(a: f64, b: f64) -> f64 {
    let d = (b - a).abs();
    if d > HALF_WORLD { WORLD_SIZE - d } else { d }
}

pub fn circles_collide(a: Vector2D, ra: f64, b: Vector2D, rb: f64) -> bool {
    let dx = torus_delta(a.x, b.x);
    let dy = torus_delta(a.y, b.y);
    let reach = ra + rb;
    dx * dx + dy * dy <= reach * reach
}
