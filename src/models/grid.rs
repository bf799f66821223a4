//! Term grid: the mutable placement state of one solve.
//!
//! Seven years of three seasons give 21 slots, addressed by an ordinal
//! index `(year - 1) * 3 + season offset`. The grid tracks, per slot,
//! the courses held, the accounted credit sum, and the accounted course
//! count; credit-exempt courses (work terms, repeat shadows) occupy a
//! slot without touching the accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{course, Course, Season};

/// Ordinal slot index, `0..SLOT_COUNT`.
pub type SlotIndex = usize;

/// Years in a plan.
pub const YEARS: usize = 7;

/// Total addressable slots.
pub const SLOT_COUNT: usize = YEARS * Season::ALL.len();

/// Slot index for a (year, season) pair. Year is 1-based.
#[inline]
pub fn slot_index(year: usize, season: Season) -> SlotIndex {
    (year - 1) * Season::ALL.len() + season.offset()
}

/// Year (1-based) of a slot index.
#[inline]
pub fn slot_year(index: SlotIndex) -> usize {
    index / Season::ALL.len() + 1
}

/// Season of a slot index.
#[inline]
pub fn slot_season(index: SlotIndex) -> Season {
    Season::ALL[index % Season::ALL.len()]
}

/// Per-slot capacity.
///
/// A cap of zero closes the slot for every course, including
/// credit-exempt ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotLimits {
    /// Maximum accounted credits.
    pub max_credits: f64,
    /// Maximum accounted course count.
    pub max_courses: usize,
}

impl SlotLimits {
    /// Creates explicit limits.
    pub fn new(max_credits: f64, max_courses: usize) -> Self {
        Self {
            max_credits,
            max_courses,
        }
    }

    /// Program defaults: Summer trades credit room for count room.
    pub fn defaults_for(season: Season) -> Self {
        match season {
            Season::Summer => Self::new(8.0, 6),
            Season::Fall | Season::Winter => Self::new(14.0, 5),
        }
    }

    /// Whether the slot admits nothing at all.
    pub fn is_closed(&self) -> bool {
        self.max_credits <= 0.0 || self.max_courses == 0
    }
}

/// Contents of one slot, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    /// Course ids held, oldest first.
    pub courses: Vec<String>,
    /// Accounted credit sum (exempt courses contribute nothing).
    pub credits: f64,
    /// Accounted course count (exempt courses contribute nothing).
    pub counted: usize,
}

impl SlotState {
    /// Whether the slot holds no courses at all.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Whether the slot holds a work-term course.
    pub fn has_work_term(&self) -> bool {
        self.courses.iter().any(|id| course::is_work_term(id))
    }
}

/// The full placement grid plus the course → slot binding.
#[derive(Debug, Clone, PartialEq)]
pub struct TermGrid {
    slots: Vec<SlotState>,
    limits: Vec<SlotLimits>,
    placements: BTreeMap<String, SlotIndex>,
}

impl TermGrid {
    /// Creates an empty grid with seasonal default limits.
    pub fn new() -> Self {
        Self {
            slots: vec![SlotState::default(); SLOT_COUNT],
            limits: (0..SLOT_COUNT)
                .map(|i| SlotLimits::defaults_for(slot_season(i)))
                .collect(),
            placements: BTreeMap::new(),
        }
    }

    /// Creates an empty grid with the given seasonal defaults.
    pub fn with_defaults(summer: SlotLimits, study: SlotLimits) -> Self {
        let mut grid = Self::new();
        for i in 0..SLOT_COUNT {
            grid.limits[i] = match slot_season(i) {
                Season::Summer => summer,
                Season::Fall | Season::Winter => study,
            };
        }
        grid
    }

    /// Overrides the limits of one slot.
    pub fn set_limits(&mut self, index: SlotIndex, limits: SlotLimits) {
        self.limits[index] = limits;
    }

    /// Limits of one slot.
    pub fn limits(&self, index: SlotIndex) -> SlotLimits {
        self.limits[index]
    }

    /// Contents of one slot.
    pub fn slot(&self, index: SlotIndex) -> &SlotState {
        &self.slots[index]
    }

    /// The slot a course is bound to, if placed.
    pub fn placement(&self, id: &str) -> Option<SlotIndex> {
        self.placements.get(id).copied()
    }

    /// All placements, ordered by course id.
    pub fn placements(&self) -> impl Iterator<Item = (&str, SlotIndex)> {
        self.placements.iter().map(|(id, &idx)| (id.as_str(), idx))
    }

    /// Number of placed courses.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Binds a course to a slot, updating the slot accounting.
    pub fn place(&mut self, course: &Course, index: SlotIndex) {
        let slot = &mut self.slots[index];
        slot.courses.push(course.id.clone());
        if !course.is_credit_exempt() {
            slot.credits += course.credit;
            slot.counted += 1;
        }
        self.placements.insert(course.id.clone(), index);
    }

    /// Reverts a placement made by [`TermGrid::place`].
    pub fn remove(&mut self, course: &Course, index: SlotIndex) {
        let slot = &mut self.slots[index];
        if let Some(pos) = slot.courses.iter().rposition(|id| id == &course.id) {
            slot.courses.remove(pos);
            if !course.is_credit_exempt() {
                slot.credits -= course.credit;
                slot.counted -= 1;
            }
        }
        self.placements.remove(&course.id);
    }

    /// Total accounted credit across all slots.
    pub fn total_credits(&self) -> f64 {
        self.slots.iter().map(|s| s.credits).sum()
    }

    /// Latest slot holding a course of exactly the given level.
    pub fn latest_slot_of_level(&self, level: u32) -> Option<SlotIndex> {
        self.placements
            .iter()
            .filter(|(id, _)| course::course_level(id) == Some(level))
            .map(|(_, &idx)| idx)
            .max()
    }

    /// Earliest slot holding a course at or above the given level.
    pub fn earliest_slot_at_min_level(&self, min_level: u32) -> Option<SlotIndex> {
        self.placements
            .iter()
            .filter(|(id, _)| course::course_level(id).is_some_and(|l| l >= min_level))
            .map(|(_, &idx)| idx)
            .min()
    }

    /// Earliest slot holding a work term.
    pub fn first_work_term_slot(&self) -> Option<SlotIndex> {
        self.placements
            .iter()
            .filter(|(id, _)| course::is_work_term(id))
            .map(|(_, &idx)| idx)
            .min()
    }

    /// Latest slot holding a work term.
    pub fn last_work_term_slot(&self) -> Option<SlotIndex> {
        self.placements
            .iter()
            .filter(|(id, _)| course::is_work_term(id))
            .map(|(_, &idx)| idx)
            .max()
    }
}

impl Default for TermGrid {
    fn default() -> Self {
        Self::new()
    }
}
