//! Slot validity: may a course legally occupy a slot right now?
//!
//! A pure predicate over the current grid state. Rules are checked in
//! order and the first failure wins:
//!
//! 1. The slot must exist (year ≤ 7) and its caps must be non-zero.
//! 2. The course must be offered in the slot's season.
//! 3. Work terms are exclusive occupants, in both directions.
//! 4. Accounted credit/count must stay within the slot's caps;
//!    credit-exempt courses skip the accounting but not exclusivity.
//! 5. Level ordering: a level-≥4 course may not sit at or before any
//!    placed level-2 course, and a level-2 course may not sit at or
//!    after any placed level-≥4 course.
//! 6. Capstone pairing: part A only in Fall; part B only in Winter, and
//!    only immediately after its placed part A.

use crate::models::{
    capstone_part, capstone_partner, course_level, slot_season, CapstonePart, Course, Season,
    SlotIndex, TermGrid, SLOT_COUNT,
};

/// Whether `course` may occupy `index` given the current grid state.
pub fn slot_admits(grid: &TermGrid, course: &Course, index: SlotIndex) -> bool {
    if index >= SLOT_COUNT {
        return false;
    }
    let limits = grid.limits(index);
    if limits.is_closed() {
        return false;
    }

    if !course.offered.offers(slot_season(index)) {
        return false;
    }

    let slot = grid.slot(index);
    if slot.has_work_term() {
        return false;
    }
    if course.is_work_term() && !slot.is_empty() {
        return false;
    }

    if !course.is_credit_exempt() {
        if slot.credits + course.credit > limits.max_credits {
            return false;
        }
        if slot.counted + 1 > limits.max_courses {
            return false;
        }
    }

    if let Some(level) = course_level(&course.id) {
        if level >= 4 {
            if let Some(latest_200) = grid.latest_slot_of_level(2) {
                if index <= latest_200 {
                    return false;
                }
            }
        }
        if level == 2 {
            if let Some(earliest_400) = grid.earliest_slot_at_min_level(4) {
                if index >= earliest_400 {
                    return false;
                }
            }
        }
    }

    match capstone_part(&course.id) {
        Some(CapstonePart::A) => {
            if slot_season(index) != Season::Fall {
                return false;
            }
        }
        Some(CapstonePart::B) => {
            if slot_season(index) != Season::Winter {
                return false;
            }
            if let Some(partner) = capstone_partner(&course.id) {
                if let Some(a_index) = grid.placement(&partner) {
                    if index != a_index + 1 {
                        return false;
                    }
                }
            }
        }
        None => {}
    }

    true
}

/// Re-checks capstone adjacency for a placed part-B course.
///
/// During the search, a part B can be admitted before its part A exists
/// and the prerequisite resolution places A afterwards; the trial must
/// then confirm adjacency before committing.
pub fn capstone_adjacency_holds(grid: &TermGrid, course: &Course, index: SlotIndex) -> bool {
    if capstone_part(&course.id) != Some(CapstonePart::B) {
        return true;
    }
    let Some(partner) = capstone_partner(&course.id) else {
        return true;
    };
    match grid.placement(&partner) {
        Some(a_index) => index == a_index + 1,
        None => true,
    }
}
