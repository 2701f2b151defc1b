use crate::constants::*;
use crate::types::{Vector2D, circles_collide};
use rand::Rng;
use log::{debug, warn};

// --- Ship ---
#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub angle: f64, // Radians, counter-clockwise, 0 = east
}

impl Ship {
    pub fn new(x: f64, y: f64) -> Self {
        Ship {
            position: Vector2D::new(x, y),
            velocity: Vector2D::default(),
            angle: std::f64::consts::FRAC_PI_2, // Facing upwards initially
        }
    }

    /// Nose plus the two rear tips of the silhouette.
    pub fn probe_points(&self) -> [Vector2D; 3] {
        let half = PLAYER_ANGLE / 2.0;
        let tip = |angle: f64| {
            self.position
                .sub(Vector2D::from_heading(angle).scale(PLAYER_LENGTH))
        };
        [self.position, tip(self.angle + half), tip(self.angle - half)]
    }

    pub fn rotate(&mut self, direction: f64, delta_time: f64) {
        self.angle += direction * PLAYER_TURN_RATE * delta_time;
    }

    pub fn thrust(&mut self, delta_time: f64) {
        let thrust_vector = Vector2D::from_heading(self.angle).scale(PLAYER_SPEED * delta_time);
        self.velocity = self.velocity.add(thrust_vector);
    }

    pub fn update(&mut self, delta_time: f64) {
        self.position = self.position.add(self.velocity.scale(delta_time)).wrapped();
    }

    /// Jumps to a random spot. No overlap check, landing on a rock is the gamble.
    pub fn teleport(&mut self, rng: &mut impl Rng) {
        self.position = Vector2D::new(rng.gen_range(0.0..WORLD_SIZE), rng.gen_range(0.0..WORLD_SIZE));
        debug!("Teleported to ({:.1}, {:.1})", self.position.x, self.position.y);
    }
}

// --- Asteroid ---
#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
    /// Position before this frame's move, restored after a bump.
    pub previous: Vector2D,
}

impl Asteroid {
    pub fn new(position: Vector2D, velocity: Vector2D, radius: f64) -> Self {
        Asteroid { position, velocity, radius, previous: position }
    }

    /// Random asteroid with radius in `[0.7, 1.0] * max_radius`.
    pub fn spawn(x: f64, y: f64, max_radius: f64, rng: &mut impl Rng) -> Self {
        let radius = 0.7 * max_radius + 0.3 * max_radius * rng.r#gen::<f64>();
        let velocity = Vector2D::new(
            rng.gen_range(-ASTEROID_SPEED..=ASTEROID_SPEED),
            rng.gen_range(-ASTEROID_SPEED..=ASTEROID_SPEED),
        );
        Asteroid::new(Vector2D::new(x, y), velocity, radius)
    }

    pub fn mass(&self) -> f64 {
        self.radius * self.radius
    }

    pub fn update(&mut self, delta_time: f64) {
        self.previous = self.position;
        self.position = self.position.add(self.velocity.scale(delta_time)).wrapped();
    }

    pub fn revert_move(&mut self) {
        self.position = self.previous;
    }

    pub fn can_split(&self) -> bool {
        self.radius > ASTEROID_MIN_SPLIT_RADIUS
    }

    /// Halves the rock along the perpendicular of `travel`.
    pub fn split(&self, travel: Vector2D) -> (Asteroid, Asteroid) {
        let length = travel.length();
        let perpendicular = if length > 0.0 {
            Vector2D::new(-travel.y / length, travel.x / length)
        } else {
            Vector2D::new(1.0, 0.0)
        };
        let offset = perpendicular.scale(self.radius / 2.0);
        let radius = self.radius / 2.0;
        let spin = Vector2D::new(self.velocity.y / 2.0, -self.velocity.x / 2.0);

        let a = Asteroid::new(self.position.add(offset).wrapped(), spin, radius);
        let b = Asteroid::new(self.position.sub(offset).wrapped(), spin.scale(-1.0), radius);
        (a, b)
    }
}

/// Builds a fresh field for `level`, keeping rocks apart from each other and from the ship.
pub fn fill_asteroids(level: u32, ship: &Ship, rng: &mut impl Rng) -> Vec<Asteroid> {
    let count = BASE_ASTEROID_COUNT + ASTEROIDS_PER_LEVEL * level as usize;
    let mut asteroids: Vec<Asteroid> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = Vector2D::new(rng.gen_range(0.0..WORLD_SIZE), rng.gen_range(0.0..WORLD_SIZE));
            let overlaps_rock = asteroids
                .iter()
                .any(|a| circles_collide(a.position, ASTEROID_MAX_RADIUS, candidate, ASTEROID_MAX_RADIUS));
            let overlaps_ship = circles_collide(ship.position, PLAYER_SAFE_RADIUS, candidate, ASTEROID_MAX_RADIUS);
            if !overlaps_rock && !overlaps_ship {
                asteroids.push(Asteroid::spawn(candidate.x, candidate.y, ASTEROID_MAX_RADIUS, rng));
                placed = true;
                break;
            }
        }
        if !placed {
            warn!(
                "No free spot for asteroid {} of {} after {} attempts, skipping",
                asteroids.len() + 1,
                count,
                MAX_PLACEMENT_ATTEMPTS
            );
        }
    }

    asteroids
}

// --- Bullet ---
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub position: Vector2D,
    pub previous: Vector2D,
    pub velocity: Vector2D,
    pub removed: bool,
}

impl Bullet {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        let position = Vector2D::new(x, y);
        Bullet {
            position,
            previous: position,
            velocity: Vector2D::from_heading(angle).scale(BULLET_SPEED),
            removed: false,
        }
    }

    /// Point `k` of `BULLET_SUBSTEPS` along last frame's travel, clamped to the field.
    pub fn sample(&self, k: u32) -> Vector2D {
        let t = k as f64 / BULLET_SUBSTEPS as f64;
        let travel = self.position.sub(self.previous);
        let p = self.previous.add(travel.scale(t));
        Vector2D::new(p.x.clamp(0.0, WORLD_MAX), p.y.clamp(0.0, WORLD_MAX))
    }

    pub fn update(&mut self, delta_time: f64) {
        self.previous = self.position;
        self.position = self.position.add(self.velocity.scale(BULLET_SPEED * delta_time));
        if !self.in_bounds() {
            self.removed = true;
        }
    }

    pub fn in_bounds(&self) -> bool {
        let inside = |v: f64| (0.0..=WORLD_MAX).contains(&v);
        inside(self.position.x) && inside(self.position.y)
    }
}
