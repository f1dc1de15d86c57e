//! Cart-centering task used to exercise the trainer end to end.
//!
//! The cart starts offset from the origin with a small random velocity. Each
//! tick the network sees the normalized state and may push left and/or
//! right; the episode ends when the cart leaves the track or the tick budget
//! runs out. Fitness counts survived ticks, with a bonus for ticks spent
//! near the center, so evolved specimens learn to brake instead of
//! oscillating off the edge.

use evoflock_network::EvoNet;
use rand::Rng;

/// Observation vector length fed to the network.
pub(crate) const INPUTS: usize = 4;

const TRACK_LIMIT: f32 = 2.0;
const MAX_START_SPEED: f32 = 0.05;
const PUSH: f32 = 0.002;
const MAX_TICKS: i32 = 2000;
const TICKS_PER_STAGE: i32 = 100;
const CENTER_ZONE: f32 = 0.2;

pub(crate) struct EpisodeResult {
    pub score: i32,
    pub stage: i32,
}

pub(crate) fn run_episode<R>(net: &mut EvoNet, rng: &mut R) -> EpisodeResult
where
    R: Rng + ?Sized,
{
    let mut position = rng.random_range(-1.0..1.0f32);
    let mut velocity = rng.random_range(-MAX_START_SPEED..MAX_START_SPEED);
    let mut score = 0;
    let mut ticks = 0;
    while ticks < MAX_TICKS {
        let observation = [
            position / TRACK_LIMIT,
            velocity / MAX_START_SPEED,
            position.abs() / TRACK_LIMIT,
            1.0,
        ];
        let (left, right) = net.predict(&observation);
        if left {
            velocity -= PUSH;
        }
        if right {
            velocity += PUSH;
        }
        position += velocity;
        ticks += 1;
        if position.abs() > TRACK_LIMIT {
            break;
        }
        score += 1;
        if position.abs() < CENTER_ZONE {
            score += 1;
        }
    }
    EpisodeResult {
        score,
        stage: ticks / TICKS_PER_STAGE,
    }
}
