use std::io;
use rand::Rng;
use log::{debug, info};

use crate::audio::SoundCue;
use crate::collision::{check_player_collision, resolve_asteroid_collisions, resolve_bullet_hits};
use crate::constants::*;
use crate::entities::{Asteroid, Bullet, Ship, fill_asteroids};
use crate::input::InputState;
use crate::presentation::{Presenter, Snapshot};
use crate::state::GameState;

pub struct Game<R: Rng> {
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub state: GameState,
    /// Written by the host between frames, read once per frame.
    pub input: InputState,
    previous_input: InputState,
    last_elapsed: Option<f64>,
    rng: R,
    cues: Vec<SoundCue>,
}

impl<R: Rng> Game<R> {
    pub fn new(mut rng: R) -> Self {
        let ship = Ship::new(HALF_WORLD, HALF_WORLD);
        let asteroids = fill_asteroids(0, &ship, &mut rng);
        Game {
            ship,
            asteroids,
            bullets: Vec::new(),
            state: GameState::new(),
            input: InputState::default(),
            previous_input: InputState::default(),
            last_elapsed: None,
            rng,
            cues: Vec::new(),
        }
    }

    /// Fresh ship, score and level-0 field. Clock and input history are kept.
    pub fn restart(&mut self) {
        self.ship = Ship::new(HALF_WORLD, HALF_WORLD);
        self.state = GameState::new();
        self.bullets.clear();
        self.asteroids = fill_asteroids(0, &self.ship, &mut self.rng);
        info!("New game started with {} asteroids", self.asteroids.len());
    }

    /// Seconds since the previous frame. `elapsed_ms` is the host's monotonic clock.
    fn delta_time(&mut self, elapsed_ms: f64) -> f64 {
        let delta = match self.last_elapsed {
            Some(previous) => (elapsed_ms - previous) / 1000.0,
            None => 0.0,
        };
        if elapsed_ms.is_finite() {
            self.last_elapsed = Some(elapsed_ms);
        }
        if delta.is_finite() && delta >= 0.0 { delta } else { 0.0 }
    }

    fn move_asteroids(&mut self, delta_time: f64) {
        for asteroid in self.asteroids.iter_mut() {
            asteroid.update(delta_time);
        }
        resolve_asteroid_collisions(&mut self.asteroids, &mut self.cues);
    }

    fn apply_input(&mut self, delta_time: f64) {
        if self.input.left {
            self.ship.rotate(1.0, delta_time);
        }
        if self.input.right {
            self.ship.rotate(-1.0, delta_time);
        }
        if self.input.up {
            self.ship.thrust(delta_time);
        }
        if self.input.fire_pressed(&self.previous_input) {
            self.bullets.push(Bullet::new(self.ship.position.x, self.ship.position.y, self.ship.angle));
            self.cues.push(SoundCue::Laser);
        }
        if self.input.down_pressed(&self.previous_input) {
            self.ship.teleport(&mut self.rng);
        }
    }

    /// Advances the simulation to `elapsed_ms`.
    pub fn update(&mut self, elapsed_ms: f64) {
        let delta_time = self.delta_time(elapsed_ms);

        if !self.state.playing() {
            // Field keeps drifting behind the game-over overlay
            self.move_asteroids(delta_time);
            if self.input.fire_pressed(&self.previous_input) {
                self.restart();
            }
            self.previous_input = self.input;
            return;
        }

        self.state.invincibility -= delta_time;

        self.move_asteroids(delta_time);
        check_player_collision(&self.ship, &self.asteroids, &mut self.state, &mut self.cues);

        resolve_bullet_hits(
            &mut self.bullets,
            &mut self.asteroids,
            &mut self.state,
            &self.ship,
            &mut self.rng,
            &mut self.cues,
        );
        for bullet in self.bullets.iter_mut().filter(|b| !b.removed) {
            bullet.update(delta_time);
        }
        self.bullets.retain(|b| !b.removed);

        self.apply_input(delta_time);
        self.ship.update(delta_time);

        self.previous_input = self.input;
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            ship: &self.ship,
            asteroids: &self.asteroids,
            bullets: &self.bullets,
            score: self.state.score,
            lives: self.state.lives,
            level: self.state.level,
            playing: self.state.playing(),
            invincibility: self.state.invincibility,
        }
    }

    /// One host callback: simulate, flush sound cues, then draw.
    pub fn frame<P: Presenter>(&mut self, elapsed_ms: f64, presenter: &mut P) -> io::Result<()> {
        self.update(elapsed_ms);
        for cue in self.cues.drain(..) {
            presenter.play(cue);
        }
        debug!(
            "Frame at {:.1}ms: {} asteroids, {} bullets",
            elapsed_ms,
            self.asteroids.len(),
            self.bullets.len()
        );
        presenter.present(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioSink, RecordingAudio};
    use crate::state::Phase;
    use crate::types::Vector2D;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const EPS: f64 = 1e-9;

    fn game() -> Game<StdRng> {
        Game::new(StdRng::seed_from_u64(1234))
    }

    /// Game with a single parked rock well away from the ship.
    fn quiet_game() -> Game<StdRng> {
        let mut g = game();
        g.asteroids = vec![Asteroid::new(Vector2D::new(20.0, 20.0), Vector2D::default(), 5.0)];
        g
    }

    #[derive(Default)]
    struct TestPresenter {
        audio: RecordingAudio,
        frames: Vec<(u32, usize)>,
    }

    impl AudioSink for TestPresenter {
        fn play(&mut self, cue: SoundCue) {
            self.audio.play(cue);
        }
    }

    impl Presenter for TestPresenter {
        fn present(&mut self, snapshot: &Snapshot) -> io::Result<()> {
            self.frames.push((snapshot.lives, snapshot.asteroids.len()));
            Ok(())
        }
    }

    #[test]
    fn new_game_starts_at_level_zero_with_ten_rocks() {
        let g = game();
        assert_eq!(g.asteroids.len(), 10);
        assert_eq!(g.state, GameState::new());
        assert_eq!(g.ship.position, Vector2D::new(128.0, 128.0));
    }

    #[test]
    fn first_frame_does_not_move_anything() {
        let mut g = game();
        let before = g.asteroids.clone();
        g.update(5000.0);
        let positions: Vec<_> = g.asteroids.iter().map(|a| a.position).collect();
        let expected: Vec<_> = before.iter().map(|a| a.position).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn non_finite_delta_is_treated_as_zero() {
        let mut g = quiet_game();
        g.asteroids[0].velocity = Vector2D::new(10.0, 0.0);
        g.update(0.0);
        g.update(f64::NAN);
        g.update(f64::INFINITY);
        assert_eq!(g.asteroids[0].position, Vector2D::new(20.0, 20.0));
        g.update(100.0);
        assert!((g.asteroids[0].position.x - 21.0).abs() < EPS);
    }

    #[test]
    fn invincibility_runs_down_with_time() {
        let mut g = quiet_game();
        g.state.invincibility = 1.0;
        g.update(0.0);
        g.update(250.0);
        assert!((g.state.invincibility - 0.75).abs() < EPS);
    }

    #[test]
    fn bullet_leaving_the_field_is_removed() {
        let mut g = quiet_game();
        g.bullets.push(Bullet::new(254.0, 100.0, 0.0));
        g.update(0.0);
        assert_eq!(g.bullets.len(), 1);
        g.update(FRAME_MS);
        assert!(g.bullets.is_empty());
    }

    #[test]
    fn fire_edge_shoots_once_while_held() {
        let mut g = quiet_game();
        g.input.fire = true;
        g.update(0.0);
        assert_eq!(g.bullets.len(), 1);
        assert_eq!(g.cues, vec![SoundCue::Laser]);

        g.update(FRAME_MS);
        assert_eq!(g.bullets.len(), 1);
        assert!(g.bullets[0].position.y < 128.0);

        g.input.fire = false;
        g.update(2.0 * FRAME_MS);
        g.input.fire = true;
        g.update(3.0 * FRAME_MS);
        assert_eq!(g.bullets.len(), 2);
    }

    #[test]
    fn steering_and_thrust_follow_input() {
        let mut g = quiet_game();
        g.update(0.0);
        g.input.left = true;
        g.update(500.0);
        assert!((g.ship.angle - std::f64::consts::PI).abs() < EPS);

        g.input.left = false;
        g.input.up = true;
        g.update(600.0);
        // Facing west now, 150 * 0.1 s of thrust
        assert!((g.ship.velocity.x + 15.0).abs() < 1e-6);
        assert!(g.ship.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn down_edge_teleports_the_ship() {
        let mut g = quiet_game();
        g.input.down = true;
        g.update(0.0);
        assert_ne!(g.ship.position, Vector2D::new(128.0, 128.0));
        let landed = g.ship.position;
        g.update(FRAME_MS);
        assert_eq!(g.ship.position, landed);
    }

    #[test]
    fn losing_the_last_life_ends_the_round() {
        let mut g = quiet_game();
        g.state.lives = 1;
        g.asteroids = vec![Asteroid::new(Vector2D::new(128.0, 128.0), Vector2D::default(), 8.0)];
        g.update(0.0);
        assert_eq!(g.state.lives, 0);
        assert_eq!(g.state.phase, Phase::GameOver);
        assert!(g.cues.contains(&SoundCue::Explosion2));
    }

    #[test]
    fn fire_edge_after_game_over_restarts() {
        let mut g = quiet_game();
        g.state = GameState { score: 120, lives: 0, level: 3, invincibility: 0.0, phase: Phase::GameOver };
        g.bullets.push(Bullet::new(10.0, 10.0, 0.0));
        g.update(0.0);
        assert!(!g.state.playing());

        g.input.fire = true;
        g.update(FRAME_MS);
        assert_eq!(g.state, GameState::new());
        assert_eq!(g.asteroids.len(), 10);
        assert!(g.bullets.is_empty());
        assert_eq!(g.ship.position, Vector2D::new(128.0, 128.0));

        // The restarting press does not also fire
        g.update(2.0 * FRAME_MS);
        assert!(g.bullets.is_empty());
    }

    #[test]
    fn frame_hands_cues_and_snapshot_to_the_presenter() {
        let mut g = quiet_game();
        let mut presenter = TestPresenter::default();
        g.input.fire = true;
        g.frame(0.0, &mut presenter).unwrap();
        assert_eq!(presenter.audio.played, vec![SoundCue::Laser]);
        assert_eq!(presenter.frames, vec![(3, 1)]);
        assert!(g.cues.is_empty());
    }
}
