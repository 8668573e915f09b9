//! Entity types
//!
//! Screen space has its origin at the viewport centre with +Y pointing up.
//! The leader, crowd members and projectiles live in screen space; gates,
//! barrels and zombies live in world space and scroll with the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identifier, unique within a session
pub type EntityId = u32;

/// Hands out entity ids in spawn order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Collision category of an entity.
///
/// Declaration order ranks contact pairs: the lower category is always
/// handled as the first body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Projectile,
    Gate,
    Barrel,
    Zombie,
    CrowdMember,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = (self.size + other.size) / 2.0;
        d.x < reach.x && d.y < reach.y
    }
}

/// The player-controlled leader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Player {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A follower trailing the leader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdMember {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
}

impl CrowdMember {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Move a fraction of the remaining distance toward `target`
    pub fn follow(&mut self, target: Vec2, follow_speed_factor: f32, dt: f32) {
        let t = (follow_speed_factor * dt).min(1.0);
        self.pos += (target - self.pos) * t;
    }
}

/// A shot travelling straight up the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Screen Y at which the shot expires
    pub destination_y: f32,
    pub alive: bool,
}

impl Projectile {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Advance toward the destination; returns true once it is reached
    pub fn advance(&mut self, dt: f32) -> bool {
        self.pos.y = (self.pos.y + self.speed * dt).min(self.destination_y);
        self.pos.y >= self.destination_y
    }
}

/// A crowd modifier. Shooting it raises its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub value: i32,
}

impl Gate {
    pub fn new(value: i32) -> Self {
        Self { value }
    }

    pub fn hit_by_projectile(&mut self) {
        self.value += 1;
    }

    /// Whether the gate currently recruits (drawn green)
    pub fn is_positive(&self) -> bool {
        self.value >= 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrelKind {
    /// Hurts the crowd on contact while not depleted
    Hazard,
    /// Grants a faster fire rate once shot empty
    FireRateUp,
}

/// What a single projectile hit did to a barrel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Barrel was already depleted
    Ignored,
    Damaged { remaining: i32 },
    /// This hit emptied the barrel
    Depleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrel {
    pub kind: BarrelKind,
    /// Health (hazard) or required hits (fire rate)
    pub remaining: i32,
    pub depleted: bool,
}

impl Barrel {
    pub fn new(kind: BarrelKind, initial: i32) -> Self {
        Self {
            kind,
            remaining: initial.max(1),
            depleted: false,
        }
    }

    pub fn hit_by_projectile(&mut self) -> HitOutcome {
        if self.depleted {
            return HitOutcome::Ignored;
        }
        self.remaining -= 1;
        if self.remaining <= 0 {
            self.depleted = true;
            HitOutcome::Depleted
        } else {
            HitOutcome::Damaged {
                remaining: self.remaining,
            }
        }
    }

    /// Whether touching this barrel costs a crowd member
    pub fn is_hazard_on_contact(&self) -> bool {
        !self.depleted && self.kind == BarrelKind::Hazard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZombieState {
    Walking,
    /// Playing the death sequence; no longer collidable
    Dying { remaining: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zombie {
    pub state: ZombieState,
}

impl Default for Zombie {
    fn default() -> Self {
        Self {
            state: ZombieState::Walking,
        }
    }
}

impl Zombie {
    /// Start the death sequence; returns false if already dying
    pub fn kill(&mut self, death_secs: f32) -> bool {
        match self.state {
            ZombieState::Walking => {
                self.state = ZombieState::Dying {
                    remaining: death_secs,
                };
                true
            }
            ZombieState::Dying { .. } => false,
        }
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, ZombieState::Dying { .. })
    }

    /// Advance the death sequence; returns true once it has finished
    pub fn advance(&mut self, dt: f32) -> bool {
        match &mut self.state {
            ZombieState::Walking => false,
            ZombieState::Dying { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldObjectKind {
    Gate(Gate),
    Barrel(Barrel),
    Zombie(Zombie),
}

/// A scrolling obstacle in the object layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: EntityId,
    /// World-space centre; screen Y is `pos.y - scroll_offset`
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: WorldObjectKind,
    pub alive: bool,
}

impl WorldObject {
    pub fn category(&self) -> Category {
        match self.kind {
            WorldObjectKind::Gate(_) => Category::Gate,
            WorldObjectKind::Barrel(_) => Category::Barrel,
            WorldObjectKind::Zombie(_) => Category::Zombie,
        }
    }

    /// Live and able to produce new contacts
    pub fn is_collidable(&self) -> bool {
        if !self.alive {
            return false;
        }
        match &self.kind {
            WorldObjectKind::Gate(_) => true,
            WorldObjectKind::Barrel(barrel) => !barrel.depleted,
            WorldObjectKind::Zombie(zombie) => !zombie.is_dying(),
        }
    }

    pub fn screen_aabb(&self, scroll_offset: f32) -> Aabb {
        Aabb::new(Vec2::new(self.pos.x, self.pos.y - scroll_offset), self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&Aabb::new(Vec2::new(9.0, 0.0), Vec2::new(10.0, 10.0))));
        // Touching edges only
        assert!(!a.overlaps(&Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(0.0, 20.0), Vec2::new(10.0, 10.0))));
    }

    #[test]
    fn test_gate_hits_raise_value() {
        let mut gate = Gate::new(-1);
        assert!(!gate.is_positive());
        gate.hit_by_projectile();
        gate.hit_by_projectile();
        assert_eq!(gate.value, 1);
        assert!(gate.is_positive());
    }

    #[test]
    fn test_barrel_single_hit_depletes_at_one() {
        let mut barrel = Barrel::new(BarrelKind::Hazard, 1);
        assert!(barrel.is_hazard_on_contact());
        assert_eq!(barrel.hit_by_projectile(), HitOutcome::Depleted);
        assert!(!barrel.is_hazard_on_contact());
    }

    #[test]
    fn test_barrel_depletion_is_idempotent() {
        let mut barrel = Barrel::new(BarrelKind::FireRateUp, 2);
        assert_eq!(barrel.hit_by_projectile(), HitOutcome::Damaged { remaining: 1 });
        assert_eq!(barrel.hit_by_projectile(), HitOutcome::Depleted);
        assert_eq!(barrel.hit_by_projectile(), HitOutcome::Ignored);
        assert_eq!(barrel.remaining, 0);
        assert!(barrel.depleted);
    }

    #[test]
    fn test_barrel_initial_value_floor() {
        assert_eq!(Barrel::new(BarrelKind::Hazard, -4).remaining, 1);
    }

    #[test]
    fn test_fire_rate_barrel_is_not_a_hazard() {
        assert!(!Barrel::new(BarrelKind::FireRateUp, 5).is_hazard_on_contact());
    }

    #[test]
    fn test_zombie_death_sequence() {
        let mut zombie = Zombie::default();
        assert!(zombie.kill(0.5));
        assert!(!zombie.kill(0.5));
        assert!(!zombie.advance(0.3));
        assert!(zombie.advance(0.3));
    }

    #[test]
    fn test_category_order() {
        let order = [
            Category::Player,
            Category::Projectile,
            Category::Gate,
            Category::Barrel,
            Category::Zombie,
            Category::CrowdMember,
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_projectile_stops_at_destination() {
        let mut shot = Projectile {
            id: 1,
            pos: Vec2::new(0.0, 0.0),
            size: Vec2::new(5.0, 10.0),
            speed: 600.0,
            destination_y: 100.0,
            alive: true,
        };
        assert!(!shot.advance(0.1));
        assert!((shot.pos.y - 60.0).abs() < 1e-4);
        assert!(shot.advance(0.1));
        assert_eq!(shot.pos.y, 100.0);
    }

    #[test]
    fn test_follow_is_partial() {
        let mut member = CrowdMember {
            id: 1,
            pos: Vec2::ZERO,
            size: Vec2::splat(24.0),
        };
        member.follow(Vec2::new(100.0, 0.0), 8.0, 0.05);
        assert!((member.pos.x - 40.0).abs() < 1e-4);
    }
}
