//! Crowd of followers behind the leader
//!
//! Members are kept in recruitment order. The newest member is the first
//! sacrificed, and a member's index picks its formation slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{CrowdMember, EntityId, IdAllocator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdState {
    leader_alive: bool,
    members: Vec<CrowdMember>,
}

impl Default for CrowdState {
    fn default() -> Self {
        Self::new()
    }
}

impl CrowdState {
    /// A crowd of one: the leader alone
    pub fn new() -> Self {
        Self {
            leader_alive: true,
            members: Vec::new(),
        }
    }

    /// Leader plus followers; zero once the leader is lost
    pub fn count(&self) -> usize {
        usize::from(self.leader_alive) + self.members.len()
    }

    pub fn leader_alive(&self) -> bool {
        self.leader_alive
    }

    /// True when only the leader is left
    pub fn has_no_followers(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[CrowdMember] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [CrowdMember] {
        &mut self.members
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Formation offset for the member at `index`
    pub fn slot_offset(index: usize, offsets: &[Vec2]) -> Vec2 {
        if offsets.is_empty() {
            return Vec2::ZERO;
        }
        offsets[index % offsets.len()]
    }

    /// Recruit `n` followers, each placed directly on its formation slot
    pub fn add_members(
        &mut self,
        n: usize,
        leader_pos: Vec2,
        offsets: &[Vec2],
        size: Vec2,
        ids: &mut IdAllocator,
    ) {
        if !self.leader_alive || n == 0 {
            return;
        }
        self.members.reserve(n);
        for _ in 0..n {
            let slot = self.members.len();
            self.members.push(CrowdMember {
                id: ids.next_id(),
                pos: leader_pos + Self::slot_offset(slot, offsets),
                size,
            });
        }
        log::debug!("Recruited {} members, crowd now {}", n, self.count());
    }

    /// Sacrifice up to `n` followers, newest first. The leader is never
    /// removed here. Returns how many were removed.
    pub fn remove_members(&mut self, n: usize) -> usize {
        let removed = n.min(self.members.len());
        let keep = self.members.len() - removed;
        self.members.truncate(keep);
        if removed > 0 {
            log::debug!("Lost {} members, crowd now {}", removed, self.count());
        }
        removed
    }

    /// Remove one particular follower (the one that was hit)
    pub fn remove_specific_member(&mut self, id: EntityId) -> bool {
        match self.members.iter().position(|m| m.id == id) {
            Some(index) => {
                self.members.remove(index);
                log::debug!("Member {} lost, crowd now {}", id, self.count());
                true
            }
            None => false,
        }
    }

    /// Drop everyone including the leader (game over)
    pub fn eliminate(&mut self) {
        self.members.clear();
        self.leader_alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn offsets() -> Vec<Vec2> {
        vec![Vec2::new(-30.0, -40.0), Vec2::new(30.0, -40.0), Vec2::new(0.0, -60.0)]
    }

    fn crowd_with(n: usize, ids: &mut IdAllocator) -> CrowdState {
        let mut crowd = CrowdState::new();
        crowd.add_members(n, Vec2::ZERO, &offsets(), Vec2::splat(24.0), ids);
        crowd
    }

    #[test]
    fn test_leader_counts_as_one() {
        let crowd = CrowdState::new();
        assert_eq!(crowd.count(), 1);
        assert!(crowd.has_no_followers());
    }

    #[test]
    fn test_members_start_on_their_slot() {
        let mut ids = IdAllocator::default();
        let crowd = crowd_with(4, &mut ids);
        assert_eq!(crowd.count(), 5);
        assert_eq!(crowd.members()[0].pos, Vec2::new(-30.0, -40.0));
        assert_eq!(crowd.members()[2].pos, Vec2::new(0.0, -60.0));
        // Slot table wraps around
        assert_eq!(crowd.members()[3].pos, Vec2::new(-30.0, -40.0));
    }

    #[test]
    fn test_remove_is_lifo() {
        let mut ids = IdAllocator::default();
        let mut crowd = crowd_with(3, &mut ids);
        let first = crowd.members()[0].id;
        assert_eq!(crowd.remove_members(2), 2);
        assert_eq!(crowd.members().len(), 1);
        assert_eq!(crowd.members()[0].id, first);
    }

    #[test]
    fn test_remove_clamps_to_followers() {
        let mut ids = IdAllocator::default();
        let mut crowd = crowd_with(2, &mut ids);
        assert_eq!(crowd.remove_members(10), 2);
        assert_eq!(crowd.count(), 1);
        assert!(crowd.leader_alive());
    }

    #[test]
    fn test_remove_specific_member() {
        let mut ids = IdAllocator::default();
        let mut crowd = crowd_with(3, &mut ids);
        let middle = crowd.members()[1].id;
        assert!(crowd.remove_specific_member(middle));
        assert!(!crowd.contains(middle));
        assert_eq!(crowd.count(), 3);
        assert!(!crowd.remove_specific_member(middle));
    }

    #[test]
    fn test_eliminate_zeroes_crowd() {
        let mut ids = IdAllocator::default();
        let mut crowd = crowd_with(3, &mut ids);
        crowd.eliminate();
        assert_eq!(crowd.count(), 0);
        crowd.add_members(2, Vec2::ZERO, &offsets(), Vec2::splat(24.0), &mut ids);
        assert_eq!(crowd.count(), 0);
    }

    proptest! {
        #[test]
        fn prop_recruit_then_sacrifice_round_trips(start in 0usize..20, n in 0usize..50) {
            let mut ids = IdAllocator::default();
            let mut crowd = crowd_with(start, &mut ids);
            let before = crowd.count();
            crowd.add_members(n, Vec2::ZERO, &offsets(), Vec2::splat(24.0), &mut ids);
            prop_assert_eq!(crowd.count(), before + n);
            crowd.remove_members(n);
            prop_assert_eq!(crowd.count(), before);
            prop_assert_eq!(crowd.count(), 1 + crowd.members().len());
        }
    }
}
