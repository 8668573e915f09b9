//! Automatic fire from the leader and every follower

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::crowd::CrowdState;
use super::entity::{IdAllocator, Player, Projectile};
use super::spawn::RepeatingTimer;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShootingController {
    timer: Option<RepeatingTimer>,
    interval: f32,
    step: f32,
    min_interval: f32,
}

impl ShootingController {
    pub fn new(tuning: &Tuning) -> Self {
        let interval = tuning.fire_interval.max(tuning.min_fire_interval);
        Self {
            timer: Some(RepeatingTimer::new(interval)),
            interval,
            step: tuning.fire_interval_step,
            min_interval: tuning.min_fire_interval,
        }
    }

    /// Current seconds between volleys
    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    /// Shorten the interval by one step (floored) and reinstall the
    /// schedule. Returns the new interval.
    pub fn increase_fire_rate(&mut self) -> f32 {
        self.interval = (self.interval - self.step).max(self.min_interval);
        if self.timer.is_some() {
            self.timer = Some(RepeatingTimer::new(self.interval));
        }
        log::info!("Fire rate up: {:.2}s between volleys", self.interval);
        self.interval
    }

    /// Advance the schedule; returns how many volleys are due
    pub fn update(&mut self, dt: f32) -> u32 {
        self.timer.as_mut().map_or(0, |t| t.advance(dt))
    }
}

/// Fire one shot from the leader and one from each follower.
/// Returns the number of projectiles spawned.
pub fn fire_volley(
    player: &Player,
    crowd: &CrowdState,
    tuning: &Tuning,
    viewport_height: f32,
    projectiles: &mut Vec<Projectile>,
    ids: &mut IdAllocator,
) -> usize {
    let size = tuning.sizes.projectile;
    let destination_y = viewport_height / 2.0 + size.y;

    let shooters = std::iter::once((player.pos, player.size.y))
        .chain(crowd.members().iter().map(|m| (m.pos, m.size.y)));

    let mut fired = 0;
    for (origin, height) in shooters {
        let start = Vec2::new(origin.x, origin.y + height / 2.0);
        if destination_y - start.y <= 0.0 {
            continue;
        }
        projectiles.push(Projectile {
            id: ids.next_id(),
            pos: start,
            size,
            speed: tuning.projectile_speed,
            destination_y,
            alive: true,
        });
        fired += 1;
    }
    fired
}
