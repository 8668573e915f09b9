//! Contact detection and resolution
//!
//! Each tick runs one broad pass over the typed entity pairs that can
//! interact, keeps only contacts that began this tick, then dispatches each
//! to exactly one handler keyed by the pair's categories. Handlers re-check
//! liveness, so an entity destroyed earlier in the tick is skipped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entity::{Aabb, BarrelKind, Category, EntityId, HitOutcome, WorldObjectKind};
use super::state::{GameEvent, GameState};

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Body {
    pub id: EntityId,
    pub category: Category,
}

/// An unordered touching pair, stored with the lower category first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub first: Body,
    pub second: Body,
}

impl Contact {
    pub fn new(a: Body, b: Body) -> Self {
        if (a.category, a.id) <= (b.category, b.id) {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    fn key(&self) -> (EntityId, EntityId) {
        (self.first.id, self.second.id)
    }
}

/// Remembers which pairs were touching last tick so a lingering overlap
/// resolves only once
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactTracker {
    active: HashSet<(EntityId, EntityId)>,
}

impl ContactTracker {
    /// Replace the touching set; returns contacts that were not touching
    /// last tick, in enumeration order
    pub fn begin_contacts(&mut self, touching: Vec<Contact>) -> Vec<Contact> {
        let mut current = HashSet::with_capacity(touching.len());
        let mut began = Vec::new();
        for contact in touching {
            let key = contact.key();
            if current.insert(key) && !self.active.contains(&key) {
                began.push(contact);
            }
        }
        self.active = current;
        began
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

type Handler = fn(&mut GameState, EntityId, EntityId);

/// Dispatch table for canonically ordered category pairs
fn handler_for(first: Category, second: Category) -> Option<Handler> {
    use Category::*;
    match (first, second) {
        (Projectile, Gate) => Some(projectile_gate),
        (Projectile, Barrel) => Some(projectile_barrel),
        (Projectile, Zombie) => Some(projectile_zombie),
        (Player, Gate) => Some(player_gate),
        (Player, Barrel) => Some(player_barrel),
        (Player, Zombie) => Some(player_zombie),
        (Barrel, CrowdMember) => Some(barrel_crowd_member),
        (Zombie, CrowdMember) => Some(zombie_crowd_member),
        _ => None,
    }
}

/// Whether two categories ever produce a contact
pub fn interacts(a: Category, b: Category) -> bool {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    handler_for(first, second).is_some()
}

/// All overlapping interacting pairs, in screen space.
///
/// Order: projectiles, then the leader, then followers, each against the
/// object layer in spawn order.
pub fn find_contacts(state: &GameState) -> Vec<Contact> {
    let scroll = state.scroll_offset;
    let objects: Vec<(Body, Aabb)> = state
        .objects
        .iter()
        .filter(|o| o.is_collidable())
        .map(|o| {
            (
                Body {
                    id: o.id,
                    category: o.category(),
                },
                o.screen_aabb(scroll),
            )
        })
        .collect();

    let mut movers: Vec<(Body, Aabb)> = Vec::new();
    movers.extend(state.projectiles.iter().filter(|p| p.alive).map(|p| {
        (
            Body {
                id: p.id,
                category: Category::Projectile,
            },
            p.aabb(),
        )
    }));
    if state.crowd.leader_alive() {
        movers.push((
            Body {
                id: state.player.id,
                category: Category::Player,
            },
            state.player.aabb(),
        ));
    }
    movers.extend(state.crowd.members().iter().map(|m| {
        (
            Body {
                id: m.id,
                category: Category::CrowdMember,
            },
            m.aabb(),
        )
    }));

    let mut contacts = Vec::new();
    for (mover, mover_box) in &movers {
        for (object, object_box) in &objects {
            if interacts(mover.category, object.category) && mover_box.overlaps(object_box) {
                contacts.push(Contact::new(*mover, *object));
            }
        }
    }
    contacts
}

/// Resolve contacts in order. Stops as soon as the game is over.
pub fn resolve_contacts(state: &mut GameState, contacts: &[Contact]) {
    for contact in contacts {
        if !state.is_running() {
            break;
        }
        if let Some(handler) = handler_for(contact.first.category, contact.second.category) {
            handler(state, contact.first.id, contact.second.id);
        }
    }
}

/// Detect, filter to newly begun contacts, and resolve
pub fn run(state: &mut GameState) {
    let touching = find_contacts(state);
    let began = state.contacts.begin_contacts(touching);
    resolve_contacts(state, &began);
}

// === Handlers ===
// Arguments arrive in canonical order (lower category first).

fn projectile_gate(state: &mut GameState, projectile: EntityId, gate: EntityId) {
    let (Some(p), Some(o)) = (state.live_projectile(projectile), state.live_object(gate)) else {
        return;
    };
    let WorldObjectKind::Gate(g) = &mut state.objects[o].kind else {
        return;
    };
    g.hit_by_projectile();
    let value = g.value;
    state.projectiles[p].alive = false;
    state.events.push(GameEvent::GateHit { id: gate, value });
}

fn projectile_barrel(state: &mut GameState, projectile: EntityId, barrel: EntityId) {
    let (Some(p), Some(o)) = (state.live_projectile(projectile), state.live_object(barrel)) else {
        return;
    };
    let WorldObjectKind::Barrel(b) = &mut state.objects[o].kind else {
        return;
    };
    let kind = b.kind;
    let outcome = b.hit_by_projectile();
    match outcome {
        HitOutcome::Ignored => return,
        HitOutcome::Damaged { remaining } => {
            state.events.push(GameEvent::BarrelHit { id: barrel, remaining });
        }
        HitOutcome::Depleted => {
            state.objects[o].alive = false;
            log::debug!("{:?} barrel {} depleted", kind, barrel);
            state.events.push(GameEvent::BarrelDepleted { id: barrel, kind });
            if kind == BarrelKind::FireRateUp {
                let interval = state.shooting.increase_fire_rate();
                state.events.push(GameEvent::FireRateIncreased { interval });
            }
        }
    }
    state.projectiles[p].alive = false;
}

/// Starts the death sequence of a live, walking zombie
fn kill_zombie(state: &mut GameState, zombie: EntityId) -> bool {
    let death_secs = state.tuning.zombie_death_secs();
    let Some(o) = state.live_object(zombie) else {
        return false;
    };
    let WorldObjectKind::Zombie(z) = &mut state.objects[o].kind else {
        return false;
    };
    if !z.kill(death_secs) {
        return false;
    }
    if death_secs <= 0.0 {
        state.objects[o].alive = false;
    }
    state.events.push(GameEvent::ZombieKilled { id: zombie });
    true
}

fn projectile_zombie(state: &mut GameState, projectile: EntityId, zombie: EntityId) {
    let Some(p) = state.live_projectile(projectile) else {
        return;
    };
    if kill_zombie(state, zombie) {
        state.projectiles[p].alive = false;
    }
}

fn player_gate(state: &mut GameState, _player: EntityId, gate: EntityId) {
    let Some(o) = state.live_object(gate) else {
        return;
    };
    let WorldObjectKind::Gate(g) = &state.objects[o].kind else {
        return;
    };
    let value = g.value;
    state.objects[o].alive = false;
    log::debug!("Leader opened gate {} worth {}", gate, value);
    state.events.push(GameEvent::GateOpened { id: gate, value });

    if value > 0 {
        state.recruit(value as usize);
    } else if value < 0 {
        let loss = value.unsigned_abs() as usize;
        if loss >= state.crowd.count() {
            log::info!(
                "Gate {} exceeds crowd of {}, leader lost",
                value,
                state.crowd.count()
            );
            state.trigger_game_over();
        } else {
            state.sacrifice(loss);
        }
    }
}

fn player_barrel(state: &mut GameState, _player: EntityId, barrel: EntityId) {
    let Some(o) = state.live_object(barrel) else {
        return;
    };
    let WorldObjectKind::Barrel(b) = &state.objects[o].kind else {
        return;
    };
    // The barrel stays put and can still hit followers
    if b.is_hazard_on_contact() {
        log::debug!("Leader hit hazard barrel {}", barrel);
        state.leader_hit();
    }
}

fn player_zombie(state: &mut GameState, _player: EntityId, zombie: EntityId) {
    if kill_zombie(state, zombie) {
        log::debug!("Leader hit zombie {}", zombie);
        state.leader_hit();
    }
}

fn barrel_crowd_member(state: &mut GameState, barrel: EntityId, member: EntityId) {
    let Some(o) = state.live_object(barrel) else {
        return;
    };
    let WorldObjectKind::Barrel(b) = &state.objects[o].kind else {
        return;
    };
    if !b.is_hazard_on_contact() || !state.crowd.contains(member) {
        return;
    }
    if state.crowd.remove_specific_member(member) {
        state.events.push(GameEvent::CrowdChanged {
            count: state.crowd.count(),
        });
    }
}

fn zombie_crowd_member(state: &mut GameState, zombie: EntityId, member: EntityId) {
    if !state.crowd.contains(member) {
        return;
    }
    if kill_zombie(state, zombie) && state.crowd.remove_specific_member(member) {
        state.events.push(GameEvent::CrowdChanged {
            count: state.crowd.count(),
        });
    }
}
