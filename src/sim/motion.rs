//! World scrolling and entity movement

use glam::Vec2;

use super::crowd::CrowdState;
use super::entity::{Player, Projectile, WorldObject, WorldObjectKind};
use super::state::{BackgroundTile, GameState};
use crate::tuning::Tuning;

/// Move the leader to `target_x`, kept fully on screen
pub fn apply_input(player: &mut Player, target_x: f32, viewport_width: f32) {
    let max_x = (viewport_width / 2.0 - player.size.x / 2.0).max(0.0);
    player.pos.x = target_x.clamp(-max_x, max_x);
}

/// Accelerate toward the speed cap
pub fn accelerate(scroll_speed: f32, tuning: &Tuning, dt: f32) -> f32 {
    if scroll_speed >= tuning.max_scroll_speed {
        return scroll_speed;
    }
    (scroll_speed + tuning.scroll_acceleration * dt).min(tuning.max_scroll_speed)
}

/// Move background tiles that fell below the screen two tiles up
pub fn recycle_tiles(tiles: &mut [BackgroundTile], scroll_offset: f32, viewport_height: f32) {
    let bottom = -viewport_height / 2.0;
    let ring = tiles.len() as f32;
    for tile in tiles.iter_mut() {
        let screen_top = tile.y - scroll_offset + tile.height / 2.0;
        if screen_top < bottom {
            tile.y += ring * tile.height;
        }
    }
}

/// Drop objects whose top edge scrolled below the screen.
/// Returns how many were removed.
pub fn cull_objects(objects: &mut Vec<WorldObject>, scroll_offset: f32, viewport_height: f32) -> usize {
    let bottom = -viewport_height / 2.0;
    let before = objects.len();
    objects.retain(|o| o.screen_aabb(scroll_offset).top() >= bottom);
    before - objects.len()
}

/// Fly projectiles upward, removing the ones that reached their bound
pub fn advance_projectiles(projectiles: &mut Vec<Projectile>, dt: f32) {
    for shot in projectiles.iter_mut() {
        if shot.advance(dt) {
            shot.alive = false;
        }
    }
    projectiles.retain(|p| p.alive);
}

/// Play out zombie death sequences; finished zombies are removed
pub fn advance_dying(objects: &mut Vec<WorldObject>, dt: f32) {
    for object in objects.iter_mut() {
        if let WorldObjectKind::Zombie(zombie) = &mut object.kind {
            if zombie.advance(dt) {
                object.alive = false;
            }
        }
    }
    objects.retain(|o| o.alive);
}

/// Ease every follower toward its formation slot behind the leader
pub fn follow_leader(crowd: &mut CrowdState, leader_pos: Vec2, tuning: &Tuning, dt: f32) {
    for (index, member) in crowd.members_mut().iter_mut().enumerate() {
        let target = leader_pos + CrowdState::slot_offset(index, &tuning.formation_offsets);
        member.follow(target, tuning.follow_speed_factor, dt);
    }
}

/// Run the motion step of a tick. A zero delta moves nothing.
pub fn step(state: &mut GameState, target_x: Option<f32>, dt: f32) {
    if let Some(x) = target_x {
        apply_input(&mut state.player, x, state.viewport.x);
    }
    if dt <= 0.0 {
        return;
    }

    state.scroll_speed = accelerate(state.scroll_speed, &state.tuning, dt);
    let scrolled = state.scroll_speed * dt;
    state.scroll_offset += scrolled;
    state.distance += scrolled;

    recycle_tiles(&mut state.background, state.scroll_offset, state.viewport.y);
    let culled = cull_objects(&mut state.objects, state.scroll_offset, state.viewport.y);
    if culled > 0 {
        log::trace!("Culled {} off-screen objects", culled);
    }
    advance_projectiles(&mut state.projectiles, dt);
    advance_dying(&mut state.objects, dt);
    follow_leader(&mut state.crowd, state.player.pos, &state.tuning, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Gate, Zombie};

    fn object_at(id: u32, y: f32, kind: WorldObjectKind) -> WorldObject {
        WorldObject {
            id,
            pos: Vec2::new(0.0, y),
            size: Vec2::new(40.0, 60.0),
            kind,
            alive: true,
        }
    }

    #[test]
    fn test_input_clamped_to_screen() {
        let mut player = Player {
            id: 1,
            pos: Vec2::ZERO,
            size: Vec2::splat(32.0),
        };
        apply_input(&mut player, 1000.0, 400.0);
        assert_eq!(player.pos.x, 184.0);
        apply_input(&mut player, -1000.0, 400.0);
        assert_eq!(player.pos.x, -184.0);
        apply_input(&mut player, 12.0, 400.0);
        assert_eq!(player.pos.x, 12.0);
    }

    #[test]
    fn test_speed_capped() {
        let tuning = Tuning::default();
        assert_eq!(accelerate(150.0, &tuning, 0.5), 151.0);
        assert_eq!(accelerate(299.5, &tuning, 1.0), 300.0);
        assert_eq!(accelerate(300.0, &tuning, 1.0), 300.0);
    }

    #[test]
    fn test_tiles_recycle_two_heights_up() {
        let mut tiles = vec![
            BackgroundTile { y: 0.0, height: 800.0 },
            BackgroundTile { y: 800.0, height: 800.0 },
        ];
        // First tile's top (400) is still at the bottom edge
        recycle_tiles(&mut tiles, 800.0, 800.0);
        assert_eq!(tiles[0].y, 0.0);
        recycle_tiles(&mut tiles, 801.0, 800.0);
        assert_eq!(tiles[0].y, 1600.0);
        assert_eq!(tiles[1].y, 800.0);
    }

    #[test]
    fn test_cull_only_fully_offscreen() {
        let mut objects = vec![
            object_at(1, -420.0, WorldObjectKind::Gate(Gate::new(1))),
            object_at(2, -431.0, WorldObjectKind::Gate(Gate::new(1))),
        ];
        // Bottom edge at -400; object 1 top at -390, object 2 top at -401
        assert_eq!(cull_objects(&mut objects, 0.0, 800.0), 1);
        assert_eq!(objects[0].id, 1);
    }

    #[test]
    fn test_dying_zombie_removed_after_sequence() {
        let mut zombie = Zombie::default();
        zombie.kill(0.5);
        let mut objects = vec![object_at(1, 0.0, WorldObjectKind::Zombie(zombie))];
        advance_dying(&mut objects, 0.3);
        assert_eq!(objects.len(), 1);
        advance_dying(&mut objects, 0.3);
        assert!(objects.is_empty());
    }

    #[test]
    fn test_zero_delta_moves_nothing() {
        let mut state = GameState::new(Tuning::default(), Vec2::new(400.0, 800.0));
        state.begin();
        state.recruit(1);
        state.player.pos.x = 100.0;
        let member_before = state.crowd.members()[0].pos;
        step(&mut state, None, 0.0);
        assert_eq!(state.scroll_offset, 0.0);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.crowd.members()[0].pos, member_before);
    }

    #[test]
    fn test_step_scrolls_and_follows() {
        let mut state = GameState::new(Tuning::default(), Vec2::new(400.0, 800.0));
        state.begin();
        state.recruit(1);
        let start = state.crowd.members()[0].pos;
        step(&mut state, Some(100.0), 0.05);

        assert!((state.distance - 150.1 * 0.05).abs() < 1e-3);
        assert_eq!(state.scroll_offset, state.distance);
        let member = state.crowd.members()[0].pos;
        // Moved part of the way toward the new slot, not snapped
        assert!(member.x > start.x && member.x < start.x + 100.0);
    }
}
