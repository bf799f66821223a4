//! Backward-chaining placement search.
//!
//! `solve(course, bound, depth)` finds some admissible slot at or below
//! `bound` for the goal course, recursively placing every prerequisite
//! (strictly earlier) and co-requisite (no later) it transitively
//! depends on. Each slot trial tentatively places the course, attempts
//! its requirement groups, and either commits or reverts exactly the
//! mutations the trial made before moving to the next candidate.
//!
//! Termination is guarded twice: a depth ceiling converts cyclic
//! requirement chains into ordinary failures, and a shared iteration
//! budget bounds the total number of slot trials in one solve.
//!
//! # Reference
//! Russell & Norvig (2020), "AIMA", Ch. 9.4: Backward Chaining

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::models::{
    capstone_part, capstone_partner, is_work_term, CapstonePart, Catalog, Course, ProgramProfile,
    ReqGroup, SlotIndex, TermGrid, SLOT_COUNT,
};

use super::validity::{capstone_adjacency_holds, slot_admits};

/// Recursion ceiling; beyond it a chain fails instead of overflowing.
pub(crate) const MAX_DEPTH: usize = 32;

/// Request-scoped working state of one solve.
///
/// Owns every mutable structure the search touches; nothing is shared
/// across solves.
#[derive(Debug)]
pub(crate) struct SearchState<'a> {
    pub catalog: &'a Catalog,
    pub profile: &'a ProgramProfile,
    pub grid: TermGrid,
    /// Courses already bound to a slot or otherwise satisfied (exempt
    /// credit, manual placements). Superset of the grid's placements.
    pub taken: BTreeSet<String>,
    /// Courses still awaiting placement.
    pub remaining: BTreeSet<String>,
    /// Slot trials left before the search gives up.
    budget: u64,
}

impl<'a> SearchState<'a> {
    pub fn new(
        catalog: &'a Catalog,
        profile: &'a ProgramProfile,
        grid: TermGrid,
        budget: u64,
    ) -> Self {
        Self {
            catalog,
            profile,
            grid,
            taken: BTreeSet::new(),
            remaining: BTreeSet::new(),
            budget,
        }
    }

    /// Attempts to place a goal course anywhere in the plan.
    pub fn place_goal(&mut self, id: &str) -> bool {
        let placed = self.solve(id, Some(SLOT_COUNT - 1), 0);
        debug!(course = id, placed, "goal placement finished");
        placed
    }

    /// The backward-chaining search.
    ///
    /// `bound` is the largest admissible slot index; `None` means no
    /// slot may be used and only vacuous satisfaction can succeed.
    fn solve(&mut self, id: &str, bound: Option<SlotIndex>, depth: usize) -> bool {
        if let Some(index) = self.grid.placement(id) {
            return bound.is_some_and(|b| index <= b);
        }
        if self.taken.contains(id) {
            // Satisfied outside the grid (exempt credit).
            return true;
        }
        let Some(course) = self.catalog.get(id).cloned() else {
            // Unknown to the catalog: vacuously satisfied.
            return true;
        };
        if depth >= MAX_DEPTH {
            return false;
        }
        let Some(bound) = bound else {
            return false;
        };

        let start = self.lower_bound(&course);
        if start > bound {
            return false;
        }

        for index in self.candidate_order(&course.id, start, bound, depth) {
            if !self.charge_budget() {
                return false;
            }
            if !slot_admits(&self.grid, &course, index) {
                continue;
            }

            trace!(course = %course.id, slot = index, depth, "trying slot");
            self.grid.place(&course, index);
            self.taken.insert(course.id.clone());

            let satisfied = self.satisfy_groups(course.prereqs.groups(), index.checked_sub(1), depth)
                && self.satisfy_groups(course.coreqs.groups(), Some(index), depth)
                && capstone_adjacency_holds(&self.grid, &course, index);

            if satisfied {
                self.remaining.remove(&course.id);
                debug!(course = %course.id, slot = index, depth, "placed");
                return true;
            }

            self.grid.remove(&course, index);
            self.taken.remove(&course.id);
        }

        false
    }

    /// Resolves a set of AND-groups; every group needs one alternative
    /// satisfied within `bound`.
    fn satisfy_groups(&mut self, groups: &[ReqGroup], bound: Option<SlotIndex>, depth: usize) -> bool {
        groups.iter().cloned().all(|group| {
            group
                .alternatives()
                .iter()
                .any(|alt| self.solve(alt, bound, depth + 1))
        })
    }

    /// Earliest slot the course may consider.
    ///
    /// One past the latest already-placed prerequisite alternative,
    /// further floored by the level-ordering rule, a placed capstone
    /// part A, and (for work terms only) the standard-sequence entry,
    /// which is a hard floor rather than a preference.
    fn lower_bound(&self, course: &Course) -> SlotIndex {
        let mut start = 0;
        for group in course.prereqs.groups() {
            for alt in group.alternatives() {
                if let Some(index) = self.grid.placement(alt) {
                    start = start.max(index + 1);
                }
            }
        }

        if crate::models::course_level(&course.id).is_some_and(|l| l >= 4) {
            if let Some(latest_200) = self.grid.latest_slot_of_level(2) {
                start = start.max(latest_200 + 1);
            }
        }

        if capstone_part(&course.id) == Some(CapstonePart::B) {
            if let Some(partner) = capstone_partner(&course.id) {
                if let Some(a_index) = self.grid.placement(&partner) {
                    start = start.max(a_index + 1);
                }
            }
        }

        if is_work_term(&course.id) {
            if let Some(preferred) = self.profile.standard_sequence.preferred_slot(&course.id) {
                start = start.max(preferred);
            }
        }

        start
    }

    /// Candidate slots in trial order.
    ///
    /// With a standard-sequence entry: by distance from it, closest
    /// first. Otherwise earliest-first for top-level goals and
    /// latest-first in nested calls, which packs a dependency as close
    /// as possible to the slot just before its dependent.
    fn candidate_order(
        &self,
        id: &str,
        start: SlotIndex,
        bound: SlotIndex,
        depth: usize,
    ) -> Vec<SlotIndex> {
        let mut candidates: Vec<SlotIndex> = (start..=bound.min(SLOT_COUNT - 1)).collect();
        if let Some(preferred) = self.profile.standard_sequence.preferred_slot(id) {
            candidates.sort_by_key(|&i| (i.abs_diff(preferred), i));
        } else if depth > 0 {
            candidates.reverse();
        }
        candidates
    }

    fn charge_budget(&mut self) -> bool {
        if self.budget == 0 {
            debug!("iteration budget exhausted");
            return false;
        }
        self.budget -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{slot_index, slot_season, CourseRecord, Season};

    fn state_for<'a>(
        catalog: &'a Catalog,
        profile: &'a ProgramProfile,
    ) -> SearchState<'a> {
        SearchState::new(catalog, profile, TermGrid::new(), 200_000)
    }

    #[test]
    fn test_prerequisite_placed_strictly_earlier() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("XRAY200").with_credit(3.0).offered_every_season(),
            CourseRecord::new("XRAY300")
                .with_credit(3.0)
                .with_prerequisites("XRAY 200")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("XRAY300"));
        let dep = state.grid.placement("XRAY300").expect("dependent placed");
        let pre = state.grid.placement("XRAY200").expect("prereq placed");
        assert!(pre < dep);
    }

    #[test]
    fn test_corequisite_may_share_slot() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("MECH351").with_credit(3.0).offered_every_season(),
            CourseRecord::new("MECH390")
                .with_credit(3.0)
                .with_corequisites("MECH 351")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("MECH390"));
        let dep = state.grid.placement("MECH390").expect("dependent");
        let co = state.grid.placement("MECH351").expect("coreq");
        assert!(co <= dep);
    }

    #[test]
    fn test_unknown_reference_is_vacuously_satisfied() {
        let catalog = Catalog::from_records(&[CourseRecord::new("XRAY300")
            .with_credit(3.0)
            .with_prerequisites("GHST 101")
            .offered_every_season()])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("XRAY300"));
        assert_eq!(state.grid.placement("GHST101"), None);
        assert_eq!(state.grid.placement_count(), 1);
    }

    #[test]
    fn test_already_placed_respects_bound() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("XRAY200").with_credit(3.0).offered(false, false, true),
            CourseRecord::new("XRAY300")
                .with_credit(3.0)
                .with_prerequisites("XRAY 200")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        // Pin the prerequisite into the final Winter slot: nothing can
        // come after it, so the dependent must fail.
        let c = catalog.get("XRAY200").expect("course").clone();
        state.grid.place(&c, SLOT_COUNT - 1);
        state.taken.insert("XRAY200".into());

        assert!(!state.place_goal("XRAY300"));
        assert_eq!(state.grid.placement("XRAY300"), None);
    }

    #[test]
    fn test_exempt_credit_satisfies_without_slot() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("XRAY200").with_credit(3.0).with_kind("ECP"),
            CourseRecord::new("XRAY300")
                .with_credit(3.0)
                .with_prerequisites("XRAY 200")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);
        state.taken.insert("XRAY200".into());

        assert!(state.place_goal("XRAY300"));
        assert_eq!(state.grid.placement("XRAY200"), None);
    }

    #[test]
    fn test_top_level_prefers_earliest_slot() {
        let catalog = Catalog::from_records(&[CourseRecord::new("XRAY200")
            .with_credit(3.0)
            .offered_every_season()])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("XRAY200"));
        assert_eq!(state.grid.placement("XRAY200"), Some(0));
    }

    #[test]
    fn test_nested_dependency_packs_late() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("XRAY200").with_credit(3.0).offered_every_season(),
            CourseRecord::new("XRAY300")
                .with_credit(3.0)
                .with_prerequisites("XRAY 200")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("XRAY300"));
        let dep = state.grid.placement("XRAY300").expect("dependent");
        let pre = state.grid.placement("XRAY200").expect("prereq");
        // Latest-first nested ordering puts the prerequisite right
        // before its dependent.
        assert_eq!(pre, dep - 1);
    }

    #[test]
    fn test_standard_sequence_biases_candidates() {
        let catalog = Catalog::from_records(&[CourseRecord::new("XRAY200")
            .with_credit(3.0)
            .offered_every_season()])
        .expect("catalog");
        let preferred = slot_index(2, Season::Fall);
        let profile = ProgramProfile::default().with_standard_sequence(
            crate::models::StandardSequence::new().with_entry("XRAY200", preferred),
        );
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("XRAY200"));
        assert_eq!(state.grid.placement("XRAY200"), Some(preferred));
    }

    #[test]
    fn test_work_term_floor_is_hard() {
        let catalog = Catalog::from_records(&[CourseRecord::new("WT1").offered_every_season()])
            .expect("catalog");
        let floor = slot_index(2, Season::Summer);
        let profile = ProgramProfile::default().with_standard_sequence(
            crate::models::StandardSequence::new().with_entry("WT1", floor),
        );
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("WT1"));
        assert!(state.grid.placement("WT1").expect("placed") >= floor);
    }

    #[test]
    fn test_capstone_pair_lands_adjacent() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("MECH490A").with_credit(2.0).offered(false, true, false),
            CourseRecord::new("MECH490B")
                .with_credit(2.0)
                .with_prerequisites("MECH 490A")
                .offered(false, false, true),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        assert!(state.place_goal("MECH490B"));
        let a = state.grid.placement("MECH490A").expect("A placed");
        let b = state.grid.placement("MECH490B").expect("B placed");
        assert_eq!(b, a + 1);
        assert_eq!(slot_season(a), Season::Fall);
        assert_eq!(slot_season(b), Season::Winter);
    }

    #[test]
    fn test_depth_guard_fails_cyclic_chain() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("AAAA201")
                .with_credit(3.0)
                .with_prerequisites("BBBB202")
                .offered_every_season(),
            CourseRecord::new("BBBB202")
                .with_credit(3.0)
                .with_prerequisites("AAAA201")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = state_for(&catalog, &profile);

        // Must terminate; the cycle cannot be satisfied.
        assert!(!state.place_goal("AAAA201"));
    }

    #[test]
    fn test_budget_exhaustion_degrades_to_failure() {
        let catalog = Catalog::from_records(&[
            CourseRecord::new("XRAY200").with_credit(3.0).offered_every_season(),
            CourseRecord::new("XRAY300")
                .with_credit(3.0)
                .with_prerequisites("XRAY 200")
                .offered_every_season(),
        ])
        .expect("catalog");
        let profile = ProgramProfile::default();
        let mut state = SearchState::new(&catalog, &profile, TermGrid::new(), 1);

        // One trial is not enough to place the chain; the search must
        // give up cleanly.
        assert!(!state.place_goal("XRAY300"));
    }
}
