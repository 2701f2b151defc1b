//! Boundary between the simulation and whatever draws it.
//!
//! The game hands a read-only [`Snapshot`] to a [`Presenter`] once per frame.
//! Presenters turn it into a flat list of [`DrawCommand`]s, one per entity per
//! toroidal image, so anything straddling an edge shows up on both sides.

use std::io;

use crate::audio::AudioSink;
use crate::constants::*;
use crate::entities::{Asteroid, Bullet, Ship};
use crate::types::Vector2D;

pub struct Snapshot<'a> {
    pub ship: &'a Ship,
    pub asteroids: &'a [Asteroid],
    pub bullets: &'a [Bullet],
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub playing: bool,
    pub invincibility: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawShape {
    Ship { nose: Vector2D, left: Vector2D, right: Vector2D },
    Asteroid { center: Vector2D, radius: f64 },
    Bullet { position: Vector2D },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub shape: DrawShape,
    /// Added to every point of `shape`; non-zero for wrap-around copies.
    pub offset: Vector2D,
}

/// Renderer and audio output for one frame.
pub trait Presenter: AudioSink {
    fn present(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

/// Translations at which an entity of `radius` centred on `center` must be drawn.
pub fn wrap_offsets(center: Vector2D, radius: f64) -> Vec<Vector2D> {
    let axis = |v: f64| {
        let mut shifts = vec![0.0];
        if v - radius < 0.0 {
            shifts.push(WORLD_SIZE);
        }
        if v + radius > WORLD_SIZE {
            shifts.push(-WORLD_SIZE);
        }
        shifts
    };
    let ys = axis(center.y);
    axis(center.x)
        .into_iter()
        .flat_map(|dx| ys.iter().map(move |&dy| Vector2D::new(dx, dy)))
        .collect()
}

/// Blink at 4Hz while invincible.
pub fn ship_visible(invincibility: f64) -> bool {
    invincibility <= 0.0 || (invincibility * FLICKER_RATE) % 2.0 > 0.5
}

fn push_wrapped(commands: &mut Vec<DrawCommand>, shape: DrawShape, center: Vector2D, radius: f64) {
    commands.extend(
        wrap_offsets(center, radius)
            .into_iter()
            .map(|offset| DrawCommand { shape, offset }),
    );
}

pub fn build_draw_list(snapshot: &Snapshot) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    for asteroid in snapshot.asteroids {
        let shape = DrawShape::Asteroid { center: asteroid.position, radius: asteroid.radius };
        push_wrapped(&mut commands, shape, asteroid.position, asteroid.radius);
    }

    for bullet in snapshot.bullets.iter().filter(|b| !b.removed) {
        let shape = DrawShape::Bullet { position: bullet.position };
        push_wrapped(&mut commands, shape, bullet.position, BULLET_RADIUS);
    }

    if snapshot.playing && ship_visible(snapshot.invincibility) {
        let [nose, left, right] = snapshot.ship.probe_points();
        let shape = DrawShape::Ship { nose, left, right };
        push_wrapped(&mut commands, shape, snapshot.ship.position, PLAYER_LENGTH);
    }

    commands
}
