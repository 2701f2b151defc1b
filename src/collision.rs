use crate::audio::SoundCue;
use crate::constants::*;
use crate::entities::{Asteroid, Bullet, Ship, fill_asteroids};
use crate::state::{GameState, Phase};
use crate::types::{Vector2D, circles_collide};
use rand::Rng;
use log::{debug, info};

/// 1D elastic collision formula applied per axis. Returns the new (v1, v2).
pub fn elastic_collision(m1: f64, v1: Vector2D, m2: f64, v2: Vector2D) -> (Vector2D, Vector2D) {
    let total = m1 + m2;
    let v1_after = v1.scale((m1 - m2) / total).add(v2.scale(2.0 * m2 / total));
    let v2_after = v1.scale(2.0 * m1 / total).add(v2.scale((m2 - m1) / total));
    (v1_after, v2_after)
}

/// Bounces overlapping asteroids off each other. Each asteroid resolves at most
/// its first partner per frame; both partners go back to where they started
/// the frame. Returns the number of bumps.
pub fn resolve_asteroid_collisions(asteroids: &mut [Asteroid], cues: &mut Vec<SoundCue>) -> usize {
    let mut bumps = 0;
    for i in 0..asteroids.len() {
        for j in (i + 1)..asteroids.len() {
            let (head, tail) = asteroids.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            if !circles_collide(a.position, a.radius, b.position, b.radius) {
                continue;
            }
            let (va, vb) = elastic_collision(a.mass(), a.velocity, b.mass(), b.velocity);
            a.velocity = va;
            b.velocity = vb;
            a.revert_move();
            b.revert_move();
            cues.push(SoundCue::Bump);
            bumps += 1;
            break;
        }
    }
    bumps
}

/// Tests the ship's nose and tips against every asteroid and applies damage.
/// Returns true when the ship was hit this frame.
pub fn check_player_collision(
    ship: &Ship,
    asteroids: &[Asteroid],
    state: &mut GameState,
    cues: &mut Vec<SoundCue>,
) -> bool {
    if state.invincible() {
        return false;
    }
    let probes = ship.probe_points();
    let hit = asteroids.iter().any(|asteroid| {
        probes
            .iter()
            .any(|&p| circles_collide(p, 0.0, asteroid.position, asteroid.radius))
    });
    if !hit {
        return false;
    }

    cues.push(SoundCue::Explosion2);
    state.lives = state.lives.saturating_sub(1);
    if state.lives == 0 {
        state.phase = Phase::GameOver;
        info!("Ship destroyed, game over with score {}", state.score);
    } else {
        state.invincibility = INVINCIBILITY_SECONDS;
        info!("Ship hit, {} lives left", state.lives);
    }
    true
}

/// Sub-samples the bullet's last move so fast shots cannot tunnel through rocks.
pub fn bullet_hits_asteroid(bullet: &Bullet, asteroid: &Asteroid) -> bool {
    (0..BULLET_SUBSTEPS).any(|k| circles_collide(bullet.sample(k), BULLET_RADIUS, asteroid.position, asteroid.radius))
}

/// Scores bullet hits, splitting or destroying the asteroid struck. A bullet
/// takes out at most one asteroid. Clearing the field moves to the next level.
pub fn resolve_bullet_hits(
    bullets: &mut [Bullet],
    asteroids: &mut Vec<Asteroid>,
    state: &mut GameState,
    ship: &Ship,
    rng: &mut impl Rng,
    cues: &mut Vec<SoundCue>,
) -> u32 {
    let mut hits = 0;
    for bullet in bullets.iter_mut().filter(|b| !b.removed) {
        let Some(index) = asteroids.iter().position(|a| bullet_hits_asteroid(bullet, a)) else {
            continue;
        };

        hits += 1;
        state.score += SCORE_PER_HIT;
        cues.push(SoundCue::Explosion);
        bullet.removed = true;

        if asteroids[index].can_split() {
            let (first, second) = asteroids[index].split(bullet.velocity);
            debug!("Asteroid split into two of radius {:.2}", first.radius);
            asteroids[index] = first;
            asteroids.push(second);
        } else {
            asteroids.swap_remove(index);
            if asteroids.is_empty() {
                state.level += 1;
                info!("Field cleared, starting level {}", state.level);
                *asteroids = fill_asteroids(state.level, ship, rng);
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-9;

    fn rock(x: f64, y: f64, vx: f64, vy: f64, r: f64) -> Asteroid {
        Asteroid::new(Vector2D::new(x, y), Vector2D::new(vx, vy), r)
    }

    fn bullet_at(x: f64, y: f64) -> Bullet {
        Bullet::new(x, y, 0.0)
    }

    #[test]
    fn elastic_collision_conserves_momentum() {
        let cases = [
            (400.0, Vector2D::new(3.0, -1.0), 25.0, Vector2D::new(-7.0, 2.5)),
            (100.0, Vector2D::new(0.0, 0.0), 100.0, Vector2D::new(5.0, 5.0)),
            (9.0, Vector2D::new(-20.0, 11.0), 361.0, Vector2D::new(1.5, -22.0)),
        ];
        for (m1, v1, m2, v2) in cases {
            let (a, b) = elastic_collision(m1, v1, m2, v2);
            let before = v1.scale(m1).add(v2.scale(m2));
            let after = a.scale(m1).add(b.scale(m2));
            assert!((before.x - after.x).abs() < 1e-6);
            assert!((before.y - after.y).abs() < 1e-6);
        }
    }

    #[test]
    fn equal_masses_swap_velocities() {
        let (a, b) = elastic_collision(4.0, Vector2D::new(1.0, 2.0), 4.0, Vector2D::new(-3.0, 0.5));
        assert!((a.x + 3.0).abs() < EPS && (a.y - 0.5).abs() < EPS);
        assert!((b.x - 1.0).abs() < EPS && (b.y - 2.0).abs() < EPS);
    }

    #[test]
    fn bump_reverts_this_frames_move_and_plays_cue() {
        let mut rocks = vec![rock(100.0, 100.0, 10.0, 0.0, 10.0), rock(118.0, 100.0, -10.0, 0.0, 10.0)];
        for r in rocks.iter_mut() {
            r.update(0.1);
        }
        let mut cues = Vec::new();
        assert_eq!(resolve_asteroid_collisions(&mut rocks, &mut cues), 1);
        assert_eq!(cues, vec![SoundCue::Bump]);
        assert_eq!(rocks[0].position, Vector2D::new(100.0, 100.0));
        assert_eq!(rocks[1].position, Vector2D::new(118.0, 100.0));
        assert!((rocks[0].velocity.x + 10.0).abs() < EPS);
        assert!((rocks[1].velocity.x - 10.0).abs() < EPS);
    }

    #[test]
    fn only_first_partner_is_resolved_per_asteroid() {
        // 0 touches both 1 and 2; 1 and 2 are apart
        let mut rocks = vec![
            rock(100.0, 100.0, 0.0, 0.0, 10.0),
            rock(115.0, 100.0, -5.0, 0.0, 10.0),
            rock(85.0, 100.0, 5.0, 0.0, 10.0),
        ];
        let mut cues = Vec::new();
        let bumps = resolve_asteroid_collisions(&mut rocks, &mut cues);
        // 0-1 for asteroid 0, then 1 and 2 have no later partners
        assert_eq!(bumps, 1);
        assert_eq!(rocks[2].velocity, Vector2D::new(5.0, 0.0));
    }

    #[test]
    fn rocks_bump_across_the_seam() {
        let mut rocks = vec![rock(2.0, 50.0, -1.0, 0.0, 5.0), rock(252.0, 50.0, 1.0, 0.0, 5.0)];
        let mut cues = Vec::new();
        assert_eq!(resolve_asteroid_collisions(&mut rocks, &mut cues), 1);
    }

    #[test]
    fn ship_hit_costs_a_life_and_grants_invincibility() {
        let ship = Ship::new(128.0, 128.0);
        let rocks = vec![rock(128.0, 128.0, 0.0, 0.0, 5.0)];
        let mut state = GameState::new();
        let mut cues = Vec::new();
        assert!(check_player_collision(&ship, &rocks, &mut state, &mut cues));
        assert_eq!(state.lives, 2);
        assert_eq!(state.invincibility, INVINCIBILITY_SECONDS);
        assert!(state.playing());
        assert_eq!(cues, vec![SoundCue::Explosion2]);

        // Immune now
        assert!(!check_player_collision(&ship, &rocks, &mut state, &mut cues));
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn last_life_lost_ends_the_round() {
        let ship = Ship::new(128.0, 128.0);
        let rocks = vec![rock(130.0, 128.0, 0.0, 0.0, 4.0)];
        let mut state = GameState { lives: 1, ..GameState::new() };
        let mut cues = Vec::new();
        assert!(check_player_collision(&ship, &rocks, &mut state, &mut cues));
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn silhouette_tip_counts_as_a_hit() {
        let ship = Ship::new(128.0, 128.0);
        let tip = ship.probe_points()[1];
        let rocks = vec![rock(tip.x + 1.5, tip.y, 0.0, 0.0, 2.0)];
        assert!(!circles_collide(ship.position, 0.0, rocks[0].position, rocks[0].radius));
        let mut state = GameState::new();
        assert!(check_player_collision(&ship, &rocks, &mut state, &mut Vec::new()));
    }

    #[test]
    fn fast_bullet_cannot_tunnel_through() {
        let target = rock(150.0, 100.0, 0.0, 0.0, 3.0);
        let mut b = bullet_at(110.0, 100.0);
        b.position = Vector2D::new(190.0, 100.0);
        assert!(!circles_collide(b.position, BULLET_RADIUS, target.position, target.radius));
        assert!(!circles_collide(b.previous, BULLET_RADIUS, target.position, target.radius));
        assert!(bullet_hits_asteroid(&b, &target));
    }

    #[test]
    fn radius_six_splits_into_two_radius_three() {
        let mut rng = StdRng::seed_from_u64(1);
        let ship = Ship::new(20.0, 20.0);
        let mut state = GameState::new();
        let mut rocks = vec![rock(100.0, 100.0, 2.0, 4.0, 6.0), rock(200.0, 200.0, 0.0, 0.0, 10.0)];
        let mut bullets = vec![bullet_at(100.0, 100.0)];
        let mut cues = Vec::new();

        let hits = resolve_bullet_hits(&mut bullets, &mut rocks, &mut state, &ship, &mut rng, &mut cues);
        assert_eq!(hits, 1);
        assert_eq!(state.score, 10);
        assert!(bullets[0].removed);
        assert_eq!(rocks.len(), 3);
        assert_eq!(rocks[0].radius, 3.0);
        assert_eq!(rocks[2].radius, 3.0);
        assert_eq!(rocks[0].velocity, Vector2D::new(2.0, -1.0));
        assert_eq!(rocks[2].velocity, Vector2D::new(-2.0, 1.0));
        assert_eq!(cues, vec![SoundCue::Explosion]);
    }

    #[test]
    fn small_asteroid_is_destroyed() {
        let mut rng = StdRng::seed_from_u64(1);
        let ship = Ship::new(20.0, 20.0);
        let mut state = GameState::new();
        let mut rocks = vec![rock(100.0, 100.0, 0.0, 0.0, 4.0), rock(200.0, 200.0, 0.0, 0.0, 10.0)];
        let mut bullets = vec![bullet_at(101.0, 100.0)];
        resolve_bullet_hits(&mut bullets, &mut rocks, &mut state, &ship, &mut rng, &mut Vec::new());
        assert_eq!(rocks.len(), 1);
        assert_eq!(rocks[0].radius, 10.0);
    }

    #[test]
    fn clearing_the_field_advances_the_level() {
        let mut rng = StdRng::seed_from_u64(9);
        let ship = Ship::new(128.0, 128.0);
        let mut state = GameState::new();
        let mut rocks = vec![rock(40.0, 40.0, 0.0, 0.0, 5.0)];
        let mut bullets = vec![bullet_at(40.0, 40.0)];
        resolve_bullet_hits(&mut bullets, &mut rocks, &mut state, &ship, &mut rng, &mut Vec::new());
        assert_eq!(state.level, 1);
        assert_eq!(rocks.len(), 12);
    }

    #[test]
    fn one_bullet_scores_at_most_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let ship = Ship::new(20.0, 20.0);
        let mut state = GameState::new();
        let mut rocks = vec![rock(100.0, 100.0, 0.0, 0.0, 4.0), rock(102.0, 100.0, 0.0, 0.0, 4.0)];
        let mut bullets = vec![bullet_at(101.0, 100.0), bullet_at(200.0, 30.0)];
        let hits = resolve_bullet_hits(&mut bullets, &mut rocks, &mut state, &ship, &mut rng, &mut Vec::new());
        assert_eq!(hits, 1);
        assert_eq!(state.score, 10);
        assert_eq!(rocks.len(), 1);
        assert!(!bullets[1].removed);
    }
}
