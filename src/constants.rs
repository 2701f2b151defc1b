// --- World ---
pub const WORLD_SIZE: f64 = 256.0;
pub const HALF_WORLD: f64 = WORLD_SIZE / 2.0;
pub const WORLD_MAX: f64 = 255.0; // Bullets leave play past this on either axis

// --- Player ---
pub const PLAYER_SPEED: f64 = 150.0; // Thrust acceleration per second
pub const PLAYER_TURN_RATE: f64 = std::f64::consts::PI; // Radians per second
pub const PLAYER_LENGTH: f64 = 10.0;
pub const PLAYER_ANGLE: f64 = 0.6; // Full opening angle of the silhouette
pub const PLAYER_SAFE_RADIUS: f64 = 30.0; // Keep-out zone when filling the field
pub const INITIAL_LIVES: u32 = 3;
pub const INVINCIBILITY_SECONDS: f64 = 3.0;

// --- Asteroids ---
pub const ASTEROID_SPEED: f64 = 23.0;
pub const ASTEROID_MAX_RADIUS: f64 = 20.0;
pub const ASTEROID_MIN_SPLIT_RADIUS: f64 = 5.0; // At or below this a hit destroys
pub const BASE_ASTEROID_COUNT: usize = 10;
pub const ASTEROIDS_PER_LEVEL: usize = 2;
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

// --- Bullets ---
pub const BULLET_SPEED: f64 = 50.0;
pub const BULLET_RADIUS: f64 = 1.0;
pub const BULLET_SUBSTEPS: u32 = 20;

pub const SCORE_PER_HIT: u32 = 10;

// --- Presentation ---
pub const FLICKER_RATE: f64 = 8.0;
pub const TERMINAL_ASPECT_RATIO_COMPENSATION: f64 = 2.0; // Character cells are about twice as tall as wide
