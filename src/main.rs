//! Horde Rush headless runner
//!
//! Plays one run with a simple lane-picking autopilot at a fixed timestep
//! and prints the final score. Usage:
//!
//! ```text
//! horde-rush [seed] [tuning.json]
//! ```

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use horde_rush::consts::{MAX_SUBSTEPS, SIM_DT};
use horde_rush::sim::{GameState, WorldObjectKind};
use horde_rush::{GameSession, HighScoreFile, Tuning};

/// Portrait phone-sized viewport
const VIEWPORT: Vec2 = Vec2::new(390.0, 844.0);
/// Host frame length fed to the accumulator (30 fps)
const FRAME_DT: f32 = 1.0 / 30.0;
/// Stop a run that the autopilot survives for this long
const MAX_RUN_SECS: f32 = 600.0;
/// How far ahead of the leader the autopilot looks
const LOOKAHEAD: f32 = 450.0;
const SCORES_PATH: &str = "horde_rush_scores.json";

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };

    log::info!("Horde Rush (headless) starting, seed {}", seed);

    let store = HighScoreFile::open(SCORES_PATH);
    let mut session = GameSession::new(tuning, VIEWPORT, store, Pcg32::seed_from_u64(seed));
    session.start();

    let mut accumulator = 0.0;
    let mut clock = 0.0;
    while !session.should_leave_game_scene() && clock < MAX_RUN_SECS {
        clock += FRAME_DT;
        accumulator += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if let Some(x) = choose_lane(session.state()) {
                session.handle_input(x);
            }
            session.tick(SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in session.take_events() {
            log::debug!("{:?}", event);
        }
    }

    let state = session.state();
    log::info!(
        "Run finished after {:.1}s: distance {:.0}, score {}",
        state.elapsed,
        state.distance,
        session.current_score()
    );
    println!(
        "score {} (crowd {}, high score {})",
        session.current_score(),
        session.current_crowd_count(),
        session.high_score()
    );
}

/// Pick the X of the lane with the best upcoming objects
fn choose_lane(state: &GameState) -> Option<f32> {
    let lanes = state.spawner.lanes();
    if lanes.is_empty() {
        return None;
    }
    let lane_width = state.viewport.x / lanes.len() as f32;
    let crowd = state.crowd.count() as i32;
    let leader_y = state.player.pos.y;

    let mut ratings = vec![0i32; lanes.len()];
    for object in state.objects.iter().filter(|o| o.is_collidable()) {
        let ahead = object.screen_aabb(state.scroll_offset).center.y - leader_y;
        if !(0.0..LOOKAHEAD).contains(&ahead) {
            continue;
        }
        let Some(lane) = lanes
            .iter()
            .position(|&x| (object.pos.x - x).abs() < lane_width / 2.0)
        else {
            continue;
        };
        ratings[lane] += match &object.kind {
            WorldObjectKind::Gate(g) if g.value > -crowd => g.value * 10,
            WorldObjectKind::Gate(_) => -1000,
            WorldObjectKind::Barrel(b) if b.is_hazard_on_contact() => -200,
            WorldObjectKind::Barrel(_) => 0,
            WorldObjectKind::Zombie(_) => -100,
        };
    }

    // Ties keep the current lane
    let current = lanes
        .iter()
        .enumerate()
        .min_by(|a, b| {
            (a.1 - state.player.pos.x)
                .abs()
                .total_cmp(&(b.1 - state.player.pos.x).abs())
        })
        .map(|(i, _)| i)?;
    let best = (0..lanes.len()).fold(current, |best, i| {
        if ratings[i] > ratings[best] { i } else { best }
    });
    Some(lanes[best])
}
