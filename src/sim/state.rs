//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::ContactTracker;
use super::crowd::CrowdState;
use super::difficulty::{DifficultyModel, DifficultySnapshot};
use super::entity::{BarrelKind, EntityId, IdAllocator, Player, Projectile, WorldObject};
use super::shooting::ShootingController;
use super::spawn::{SpawnPattern, SpawnScheduler};
use crate::consts::{BACKGROUND_TILE_COUNT, PLAYER_BOTTOM_MARGIN};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Built but not started
    Ready,
    /// Active gameplay
    Running,
    /// Run ended; terminal
    GameOver,
}

/// Things that happened during a tick, for audio/render layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RowSpawned { pattern: SpawnPattern },
    GateHit { id: EntityId, value: i32 },
    /// Gate touched by the leader; `value` is the crowd delta applied
    GateOpened { id: EntityId, value: i32 },
    BarrelHit { id: EntityId, remaining: i32 },
    BarrelDepleted { id: EntityId, kind: BarrelKind },
    FireRateIncreased { interval: f32 },
    ZombieKilled { id: EntityId },
    CrowdChanged { count: usize },
    GameOver { score: u64 },
    /// Presentation delay elapsed; the host should leave the game scene
    LeaveGameScene { score: u64 },
}

/// One tile of the two-tile background ring (world space)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackgroundTile {
    pub y: f32,
    pub height: f32,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    pub difficulty_model: DifficultyModel,
    /// Viewport size; screen space is centred on the origin
    pub viewport: Vec2,
    pub phase: GamePhase,
    /// Seconds of play
    pub elapsed: f32,
    pub scroll_speed: f32,
    /// Total world scroll; object screen Y is world Y minus this
    pub scroll_offset: f32,
    /// Distance scrolled, used for scoring
    pub distance: f32,
    pub score: u64,
    pub difficulty: DifficultySnapshot,
    pub player: Player,
    pub crowd: CrowdState,
    /// Projectile layer (screen space, does not scroll)
    pub projectiles: Vec<Projectile>,
    /// Object layer: gates, barrels, zombies (world space)
    pub objects: Vec<WorldObject>,
    pub background: Vec<BackgroundTile>,
    pub spawner: SpawnScheduler,
    pub shooting: ShootingController,
    pub contacts: ContactTracker,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    pub ids: IdAllocator,
}

impl GameState {
    /// Build a fresh state for the given viewport. Starts in `Ready`.
    pub fn new(tuning: Tuning, viewport: Vec2) -> Self {
        let mut ids = IdAllocator::default();
        let player_size = tuning.sizes.player;
        let player = Player {
            id: ids.next_id(),
            pos: Vec2::new(
                0.0,
                -viewport.y / 2.0 + player_size.y + PLAYER_BOTTOM_MARGIN,
            ),
            size: player_size,
        };
        let background = (0..BACKGROUND_TILE_COUNT)
            .map(|i| BackgroundTile {
                y: i as f32 * viewport.y,
                height: viewport.y,
            })
            .collect();

        Self {
            difficulty_model: DifficultyModel::new(tuning.difficulty.clone()),
            spawner: SpawnScheduler::new(viewport.x, &tuning),
            shooting: ShootingController::new(&tuning),
            scroll_speed: tuning.initial_scroll_speed,
            tuning,
            viewport,
            phase: GamePhase::Ready,
            elapsed: 0.0,
            scroll_offset: 0.0,
            distance: 0.0,
            score: 0,
            difficulty: DifficultySnapshot::default(),
            player,
            crowd: CrowdState::new(),
            projectiles: Vec::new(),
            objects: Vec::new(),
            background,
            contacts: ContactTracker::default(),
            events: Vec::new(),
            ids,
        }
    }

    /// Enter `Running`
    pub fn begin(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Running;
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Index of a live object by id
    pub fn live_object(&self, id: EntityId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id && o.alive)
    }

    /// Index of a live projectile by id
    pub fn live_projectile(&self, id: EntityId) -> Option<usize> {
        self.projectiles.iter().position(|p| p.id == id && p.alive)
    }

    /// Recruit followers at the leader's formation slots
    pub fn recruit(&mut self, n: usize) {
        self.crowd.add_members(
            n,
            self.player.pos,
            &self.tuning.formation_offsets,
            self.tuning.sizes.crowd_member,
            &mut self.ids,
        );
        self.events.push(GameEvent::CrowdChanged {
            count: self.crowd.count(),
        });
    }

    /// Sacrifice up to `n` followers, newest first
    pub fn sacrifice(&mut self, n: usize) {
        if self.crowd.remove_members(n) > 0 {
            self.events.push(GameEvent::CrowdChanged {
                count: self.crowd.count(),
            });
        }
    }

    /// Leader was hit: lose one follower, or the game if there are none
    pub fn leader_hit(&mut self) {
        if self.crowd.has_no_followers() {
            self.trigger_game_over();
        } else {
            self.sacrifice(1);
        }
    }

    /// Score from distance and crowd size; never decreases during a run
    pub fn update_score(&mut self) {
        let points = (self.distance / self.tuning.score_factor).floor() as u64;
        let raw = points.saturating_mul(self.crowd.count() as u64);
        self.score = self.score.max(raw);
    }

    /// Running -> GameOver. Stops spawning and shooting, clears shots in
    /// flight and zeroes the crowd. Objects stay where they are.
    pub fn trigger_game_over(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.spawner.cancel();
        self.shooting.cancel();
        self.projectiles.clear();
        self.contacts.clear();
        self.crowd.eliminate();
        log::info!(
            "GAME OVER after {:.1}s, distance {:.0}, score {}",
            self.elapsed,
            self.distance,
            self.score
        );
        self.events.push(GameEvent::GameOver { score: self.score });
    }
}
