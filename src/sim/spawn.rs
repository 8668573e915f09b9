//! Row and zombie spawning
//!
//! Two independent timers drive spawning. The row timer places gates and
//! barrels in the side lanes using a weighted pattern. The faster zombie
//! timer rolls a difficulty-scaled chance to drop a zombie in the centre
//! lane, so zombies never share a slot with row objects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyModel;
use super::entity::{Barrel, BarrelKind, Gate, IdAllocator, WorldObject, WorldObjectKind, Zombie};
use super::random::RandomSource;
use super::state::GameEvent;
use crate::consts::{LANE_COUNT, SPAWN_MARGIN};
use crate::tuning::Tuning;

const LEFT_LANE: usize = 0;
const CENTER_LANE: usize = 1;
const RIGHT_LANE: usize = 2;

/// Accumulator-based repeating timer. Replacing the timer is the only way
/// to change its interval, so two schedules can never overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatingTimer {
    interval: f32,
    accumulator: f32,
}

impl RepeatingTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            accumulator: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advance by `dt`; returns how many times the timer fired
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut fired = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// Which side lanes a row fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPattern {
    LeftOnly,
    RightOnly,
    Both,
    Empty,
}

impl SpawnPattern {
    pub const ALL: [SpawnPattern; 4] = [
        SpawnPattern::LeftOnly,
        SpawnPattern::RightOnly,
        SpawnPattern::Both,
        SpawnPattern::Empty,
    ];

    /// Lane indices filled by this pattern (never repeats a lane)
    pub fn lanes(self) -> &'static [usize] {
        match self {
            SpawnPattern::LeftOnly => &[LEFT_LANE],
            SpawnPattern::RightOnly => &[RIGHT_LANE],
            SpawnPattern::Both => &[LEFT_LANE, RIGHT_LANE],
            SpawnPattern::Empty => &[],
        }
    }
}

/// Shared inputs for one spawn decision
pub struct SpawnParams<'a> {
    pub tuning: &'a Tuning,
    pub model: &'a DifficultyModel,
    pub factor: f32,
    /// World Y just above the visible top edge
    pub spawn_y: f32,
    /// Current world scroll speed
    pub scroll_speed: f32,
}

impl SpawnParams<'_> {
    /// World Y for new rows given the current scroll offset
    pub fn spawn_y_for(viewport_height: f32, scroll_offset: f32) -> f32 {
        viewport_height / 2.0 + scroll_offset + SPAWN_MARGIN
    }

    /// Params for a firing that came due `periods` intervals before the
    /// latest one in the same tick. Its objects have already scrolled down
    /// by that much, so they never share a slot with the later firing.
    fn backdated(&self, periods: u32, interval: f32) -> Self {
        Self {
            spawn_y: self.spawn_y - periods as f32 * interval * self.scroll_speed,
            ..*self
        }
    }
}

/// Advance an optional timer; returns the firing count and the interval
fn fire(timer: Option<&mut RepeatingTimer>, dt: f32) -> (u32, f32) {
    timer.map_or((0, 0.0), |t| (t.advance(dt), t.interval()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    lanes: Vec<f32>,
    row_timer: Option<RepeatingTimer>,
    zombie_timer: Option<RepeatingTimer>,
}

impl SpawnScheduler {
    pub fn new(viewport_width: f32, tuning: &Tuning) -> Self {
        Self {
            lanes: Self::lane_positions(viewport_width),
            row_timer: Some(RepeatingTimer::new(tuning.row_interval)),
            zombie_timer: Some(RepeatingTimer::new(tuning.zombie_interval)),
        }
    }

    /// Lane centres for a viewport centred on the origin
    pub fn lane_positions(viewport_width: f32) -> Vec<f32> {
        if viewport_width.is_nan() || viewport_width <= 0.0 {
            log::warn!("Viewport width {} leaves no spawn lanes", viewport_width);
            return Vec::new();
        }
        let lane_width = viewport_width / LANE_COUNT as f32;
        vec![-lane_width, 0.0, lane_width]
    }

    pub fn lanes(&self) -> &[f32] {
        &self.lanes
    }

    pub fn is_active(&self) -> bool {
        self.row_timer.is_some() || self.zombie_timer.is_some()
    }

    /// Stop all spawning for good
    pub fn cancel(&mut self) {
        self.row_timer = None;
        self.zombie_timer = None;
    }

    /// Advance both timers and spawn whatever came due
    pub fn update<R: RandomSource + ?Sized>(
        &mut self,
        dt: f32,
        rng: &mut R,
        params: &SpawnParams<'_>,
        objects: &mut Vec<WorldObject>,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) {
        let (rows, row_interval) = fire(self.row_timer.as_mut(), dt);
        for k in 0..rows {
            let params = params.backdated(rows - 1 - k, row_interval);
            if let Some(pattern) = self.spawn_row(rng, &params, objects, ids) {
                events.push(GameEvent::RowSpawned { pattern });
            }
        }

        let (zombie_rolls, zombie_interval) = fire(self.zombie_timer.as_mut(), dt);
        for k in 0..zombie_rolls {
            let params = params.backdated(zombie_rolls - 1 - k, zombie_interval);
            self.try_spawn_zombie(rng, &params, objects, ids);
        }
    }

    /// Spawn one row of gates/barrels. No-op without lane geometry.
    pub fn spawn_row<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        params: &SpawnParams<'_>,
        objects: &mut Vec<WorldObject>,
        ids: &mut IdAllocator,
    ) -> Option<SpawnPattern> {
        if self.lanes.len() < LANE_COUNT {
            log::warn!("Row spawn skipped: lanes not computed");
            return None;
        }

        let w = &params.tuning.weights;
        let weights = [
            w.left_only,
            w.right_only,
            params.model.both_lanes_weight(w.both, params.factor),
            w.empty,
        ];
        let pattern = SpawnPattern::ALL[rng.weighted_index(&weights)?];

        for &lane in pattern.lanes() {
            let pos = Vec2::new(self.lanes[lane], params.spawn_y);
            let object = roll_row_object(rng, params, pos, ids);
            log::debug!("Spawning {:?} at ({:.0}, {:.0})", object.kind, pos.x, pos.y);
            objects.push(object);
        }
        Some(pattern)
    }

    /// Roll the zombie chance; spawns in the centre lane on success
    pub fn try_spawn_zombie<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        params: &SpawnParams<'_>,
        objects: &mut Vec<WorldObject>,
        ids: &mut IdAllocator,
    ) -> bool {
        if self.lanes.len() < LANE_COUNT {
            log::warn!("Zombie spawn skipped: lanes not computed");
            return false;
        }
        if !rng.chance(params.model.zombie_chance(params.factor)) {
            return false;
        }
        let pos = Vec2::new(self.lanes[CENTER_LANE], params.spawn_y);
        log::debug!("Spawning zombie at ({:.0}, {:.0})", pos.x, pos.y);
        objects.push(WorldObject {
            id: ids.next_id(),
            pos,
            size: params.tuning.zombie_size(),
            kind: WorldObjectKind::Zombie(Zombie::default()),
            alive: true,
        });
        true
    }
}

/// Roll the type and starting value of a row object
fn roll_row_object<R: RandomSource + ?Sized>(
    rng: &mut R,
    params: &SpawnParams<'_>,
    pos: Vec2,
    ids: &mut IdAllocator,
) -> WorldObject {
    let w = &params.tuning.weights;
    let factor = params.factor;
    let roll = rng.weighted_index(&[w.gate, w.hazard_barrel, w.fire_rate_barrel]);

    let (kind, size) = match roll {
        Some(1) => {
            let (lo, hi) = params.model.hazard_health_range(factor);
            let barrel = Barrel::new(BarrelKind::Hazard, rng.int_in(lo, hi));
            (WorldObjectKind::Barrel(barrel), params.tuning.sizes.barrel)
        }
        Some(2) => {
            let (lo, hi) = params.model.fire_rate_hits_range(factor);
            let barrel = Barrel::new(BarrelKind::FireRateUp, rng.int_in(lo, hi));
            (WorldObjectKind::Barrel(barrel), params.tuning.sizes.barrel)
        }
        _ => {
            let (lo, hi) = params.model.gate_value_range(factor);
            let gate = Gate::new(rng.int_in(lo, hi));
            (WorldObjectKind::Gate(gate), params.tuning.gate_size())
        }
    };

    WorldObject {
        id: ids.next_id(),
        pos,
        size,
        kind,
        alive: true,
    }
}
