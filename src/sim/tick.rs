//! Simulation tick
//!
//! One call advances the run by `dt` seconds: motion, spawning, shooting,
//! contacts, cleanup, score. Everything random goes through the
//! [`RandomSource`] passed in, so a seeded source replays exactly.

use super::collision;
use super::motion;
use super::random::RandomSource;
use super::shooting::fire_volley;
use super::spawn::SpawnParams;
use super::state::GameState;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested leader X (screen space), e.g. from pointer drag
    pub target_x: Option<f32>,
}

/// Advance the game state by `dt` seconds.
///
/// Does nothing unless the run is in progress; a zero or negative delta
/// only applies input.
pub fn tick<R: RandomSource + ?Sized>(state: &mut GameState, input: &TickInput, rng: &mut R, dt: f32) {
    if !state.is_running() {
        return;
    }
    if dt <= 0.0 {
        motion::step(state, input.target_x, 0.0);
        return;
    }

    state.elapsed += dt;
    state.difficulty.update(&state.difficulty_model, state.elapsed);

    motion::step(state, input.target_x, dt);

    // Spawning
    let params = SpawnParams {
        tuning: &state.tuning,
        model: &state.difficulty_model,
        factor: state.difficulty.factor,
        spawn_y: SpawnParams::spawn_y_for(state.viewport.y, state.scroll_offset),
        scroll_speed: state.scroll_speed,
    };
    state.spawner.update(
        dt,
        rng,
        &params,
        &mut state.objects,
        &mut state.ids,
        &mut state.events,
    );

    // Shooting; volleys missed during a long frame collapse into one
    if state.shooting.update(dt) > 0 {
        fire_volley(
            &state.player,
            &state.crowd,
            &state.tuning,
            state.viewport.y,
            &mut state.projectiles,
            &mut state.ids,
        );
    }

    collision::run(state);

    state.objects.retain(|o| o.alive);
    state.projectiles.retain(|p| p.alive);

    if state.is_running() {
        state.update_score();
    }
}
