//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta only (no clocks)
//! - Injected RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod crowd;
pub mod difficulty;
pub mod entity;
pub mod motion;
pub mod random;
pub mod shooting;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Contact, ContactTracker, resolve_contacts};
pub use crowd::CrowdState;
pub use difficulty::{DifficultyModel, DifficultySnapshot};
pub use entity::{
    Aabb, Barrel, BarrelKind, Category, CrowdMember, EntityId, Gate, HitOutcome, IdAllocator, Player,
    Projectile, WorldObject, WorldObjectKind, Zombie, ZombieState,
};
pub use random::RandomSource;
pub use shooting::ShootingController;
pub use spawn::{RepeatingTimer, SpawnParams, SpawnPattern, SpawnScheduler};
pub use state::{BackgroundTile, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
