//! Host-facing game session
//!
//! Wraps the simulation with the pieces a host needs: frame delta clamping,
//! latched input, high score bookkeeping and the short presentation delay
//! between game over and leaving the game scene.

use glam::Vec2;

use crate::highscores::ScoreStore;
use crate::sim::{self, GameEvent, GamePhase, GameState, RandomSource, TickInput};
use crate::tuning::Tuning;

pub struct GameSession<S: ScoreStore, R: RandomSource> {
    tuning: Tuning,
    viewport: Vec2,
    store: S,
    rng: R,
    state: GameState,
    input: TickInput,
    /// Host clock at the previous `update_at`
    last_update: Option<f64>,
    high_score: u64,
    /// Seconds since game over; `None` until the final score is recorded
    game_over_elapsed: Option<f32>,
    left_game_scene: bool,
}

impl<S: ScoreStore, R: RandomSource> GameSession<S, R> {
    /// Build a session for a viewport of `viewport` pixels. Nothing runs
    /// until [`start`](Self::start). A tuning that fails validation is
    /// replaced by the defaults.
    pub fn new(tuning: Tuning, viewport: Vec2, store: S, rng: R) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Using default tuning: {}", e);
                Tuning::default()
            }
        };
        let high_score = store.load_high_score();
        Self {
            state: GameState::new(tuning.clone(), viewport),
            tuning,
            viewport,
            store,
            rng,
            input: TickInput::default(),
            last_update: None,
            high_score,
            game_over_elapsed: None,
            left_game_scene: false,
        }
    }

    /// Begin a fresh run. Ignored while a run is in progress.
    pub fn start(&mut self) {
        if self.state.is_running() {
            log::warn!("start() ignored: a run is already in progress");
            return;
        }
        if self.tuning.assets.zombie_death_secs.is_none() {
            log::warn!("No zombie death animation length; dying zombies vanish immediately");
        }

        self.state = GameState::new(self.tuning.clone(), self.viewport);
        self.state.begin();
        self.input = TickInput::default();
        self.last_update = None;
        self.game_over_elapsed = None;
        self.left_game_scene = false;
        self.high_score = self.store.load_high_score();
        log::info!(
            "Run started: viewport {}x{}, high score {}",
            self.viewport.x,
            self.viewport.y,
            self.high_score
        );
    }

    /// Latch the requested leader X; applied on the next tick
    pub fn handle_input(&mut self, target_x: f32) {
        if target_x.is_finite() {
            self.input.target_x = Some(target_x);
        }
    }

    /// Advance by `delta_time` seconds, clamped to `[0, max_frame_delta]`
    pub fn tick(&mut self, delta_time: f32) {
        let dt = if delta_time.is_finite() {
            delta_time.clamp(0.0, self.tuning.max_frame_delta)
        } else {
            0.0
        };

        match self.state.phase {
            GamePhase::Ready => {}
            GamePhase::Running => {
                sim::tick(&mut self.state, &self.input, &mut self.rng, dt);
                if self.state.phase == GamePhase::GameOver {
                    self.record_final_score();
                }
            }
            GamePhase::GameOver => match self.game_over_elapsed {
                None => self.record_final_score(),
                Some(elapsed) => self.advance_presentation(elapsed + dt),
            },
        }
    }

    /// Drive the session from a host clock in seconds. The first call
    /// only sets the reference point.
    pub fn update_at(&mut self, now_secs: f64) {
        let delta = match self.last_update {
            Some(last) => (now_secs - last) as f32,
            None => 0.0,
        };
        self.last_update = Some(now_secs);
        self.tick(delta);
    }

    fn record_final_score(&mut self) {
        let score = self.state.score;
        if score > self.high_score {
            log::info!("New high score: {} (was {})", score, self.high_score);
            self.high_score = score;
            self.store.save_high_score(score);
        }
        self.game_over_elapsed = Some(0.0);
    }

    fn advance_presentation(&mut self, elapsed: f32) {
        self.game_over_elapsed = Some(elapsed);
        if !self.left_game_scene && elapsed >= self.tuning.game_over_delay {
            self.left_game_scene = true;
            self.state.events.push(GameEvent::LeaveGameScene {
                score: self.state.score,
            });
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    pub fn current_score(&self) -> u64 {
        self.state.score
    }

    pub fn current_crowd_count(&self) -> usize {
        self.state.crowd.count()
    }

    /// Best score known to the store, including the current run once over
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn should_leave_game_scene(&self) -> bool {
        self.left_game_scene
    }

    /// Read-only view for rendering
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryScoreStore;
    use crate::sim::{Barrel, BarrelKind, WorldObject, WorldObjectKind};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    type TestSession = GameSession<MemoryScoreStore, Pcg32>;

    fn session_with_best(best: u64) -> TestSession {
        let store = MemoryScoreStore { best, saves: 0 };
        GameSession::new(
            Tuning::default(),
            Vec2::new(390.0, 844.0),
            store,
            Pcg32::seed_from_u64(9),
        )
    }

    /// Park a hazard barrel on the leader so the next tick ends the run
    fn place_barrel_on_leader(session: &mut TestSession) {
        let state = &mut session.state;
        let id = state.ids.next_id();
        let pos = Vec2::new(state.player.pos.x, state.player.pos.y + state.scroll_offset);
        state.objects.push(WorldObject {
            id,
            pos,
            size: state.tuning.sizes.barrel,
            kind: WorldObjectKind::Barrel(Barrel::new(BarrelKind::Hazard, 99)),
            alive: true,
        });
    }

    #[test]
    fn test_nothing_runs_before_start() {
        let mut session = session_with_best(0);
        session.tick(0.05);
        assert!(!session.is_game_over());
        assert_eq!(session.current_score(), 0);
        assert_eq!(session.state().distance, 0.0);
    }

    #[test]
    fn test_start_reports_initial_state() {
        let mut session = session_with_best(77);
        session.start();
        assert_eq!(session.current_crowd_count(), 1);
        assert_eq!(session.high_score(), 77);
        assert!(!session.is_game_over());
    }

    #[test]
    fn test_invalid_tuning_replaced_by_defaults() {
        let tuning = Tuning {
            row_interval: 0.0,
            ..Default::default()
        };
        let mut session = GameSession::new(
            tuning,
            Vec2::new(390.0, 844.0),
            MemoryScoreStore::default(),
            Pcg32::seed_from_u64(1),
        );
        session.start();
        assert_eq!(session.state().tuning.row_interval, 1.5);
        session.tick(0.1);
        assert!(session.state().objects.is_empty());
    }

    #[test]
    fn test_frame_delta_clamped() {
        let mut session = session_with_best(0);
        session.start();
        session.tick(5.0);
        // One clamped 0.1s frame at ~150 px/s
        assert!(session.state().distance < 16.0);
        session.tick(-1.0);
        session.tick(f32::NAN);
        assert!(session.state().distance < 16.0);
    }

    #[test]
    fn test_input_applied_on_tick() {
        let mut session = session_with_best(0);
        session.start();
        session.handle_input(80.0);
        assert_eq!(session.state().player.pos.x, 0.0);
        session.tick(0.016);
        assert_eq!(session.state().player.pos.x, 80.0);
    }

    #[test]
    fn test_update_at_first_call_has_zero_delta() {
        let mut session = session_with_best(0);
        session.start();
        session.update_at(1000.0);
        assert_eq!(session.state().distance, 0.0);
        session.update_at(1000.05);
        assert!(session.state().distance > 0.0);
    }

    #[test]
    fn test_game_over_records_new_high_score() {
        let mut session = session_with_best(3);
        session.start();
        for _ in 0..30 {
            session.tick(0.05);
        }
        place_barrel_on_leader(&mut session);
        session.tick(0.016);

        assert!(session.is_game_over());
        assert_eq!(session.current_crowd_count(), 0);
        let score = session.current_score();
        assert!(score > 3);
        assert_eq!(session.high_score(), score);
        assert_eq!(session.store().best, score);
        assert_eq!(session.store().saves, 1);
    }

    #[test]
    fn test_lower_score_not_saved() {
        let mut session = session_with_best(1_000_000);
        session.start();
        place_barrel_on_leader(&mut session);
        session.tick(0.016);

        assert!(session.is_game_over());
        assert_eq!(session.store().saves, 0);
        assert_eq!(session.high_score(), 1_000_000);
    }

    #[test]
    fn test_leave_scene_after_delay() {
        let mut session = session_with_best(0);
        session.start();
        place_barrel_on_leader(&mut session);
        session.tick(0.016);
        assert!(session.is_game_over());
        let score = session.current_score();

        session.tick(0.1);
        session.tick(0.1);
        assert!(!session.should_leave_game_scene());
        for _ in 0..4 {
            session.tick(0.1);
        }
        assert!(session.should_leave_game_scene());
        // Score stays frozen through the presentation
        assert_eq!(session.current_score(), score);

        let events = session.take_events();
        let leaves = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LeaveGameScene { .. }))
            .count();
        assert_eq!(leaves, 1);
        assert!(events.contains(&GameEvent::GameOver { score }));

        session.tick(0.1);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut session = session_with_best(0);
        session.start();
        place_barrel_on_leader(&mut session);
        session.tick(0.016);
        assert!(session.is_game_over());

        session.start();
        assert!(!session.is_game_over());
        assert!(!session.should_leave_game_scene());
        assert_eq!(session.current_score(), 0);
        assert_eq!(session.current_crowd_count(), 1);
        assert!(session.state().objects.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_play_keeps_invariants(
            seed in any::<u64>(),
            moves in prop::collection::vec(-250.0f32..250.0, 200..400),
        ) {
            let mut session = GameSession::new(
                Tuning::default(),
                Vec2::new(390.0, 844.0),
                MemoryScoreStore::default(),
                Pcg32::seed_from_u64(seed),
            );
            session.start();
            let mut last_score = 0;
            for x in moves {
                session.handle_input(x);
                for _ in 0..6 {
                    session.tick(1.0 / 60.0);
                }
                let state = session.state();
                prop_assert_eq!(
                    state.crowd.count(),
                    usize::from(state.crowd.leader_alive()) + state.crowd.members().len()
                );
                prop_assert!(session.current_score() >= last_score);
                last_score = session.current_score();

                if session.is_game_over() {
                    prop_assert_eq!(session.current_crowd_count(), 0);
                    prop_assert!(state.projectiles.is_empty());
                    prop_assert!(session.high_score() >= session.current_score());
                } else {
                    prop_assert!(session.current_crowd_count() >= 1);
                    let half = 390.0 / 2.0 - state.player.size.x / 2.0;
                    prop_assert!(state.player.pos.x.abs() <= half);
                }
            }
        }
    }
}
