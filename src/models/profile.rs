//! Per-program configuration.
//!
//! Everything program-specific that used to live as embedded literals is
//! externalized here and loaded as data: the total-credit ceiling, the
//! seasonal slot defaults, the structural-warning thresholds, and the
//! standard-sequence bias table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Season, SlotIndex, SlotLimits};

/// Advisory mapping from course id to its typical slot in the reference
/// program plan.
///
/// Orders candidate slots (closest preferred first); it never constrains
/// feasibility. The one exception is work terms, whose entry is a hard
/// placement floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardSequence {
    slots: BTreeMap<String, SlotIndex>,
}

impl StandardSequence {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds one entry.
    pub fn with_entry(mut self, id: impl Into<String>, slot: SlotIndex) -> Self {
        self.slots.insert(id.into(), slot);
        self
    }

    /// Preferred slot for a course, if the table lists one.
    pub fn preferred_slot(&self, id: &str) -> Option<SlotIndex> {
        self.slots.get(id).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Program-level limits and reference data for one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramProfile {
    /// Program name, used only for display.
    pub name: String,
    /// Total accounted-credit ceiling enforced by the trimmer.
    pub credit_ceiling: f64,
    /// Default limits for Summer slots.
    pub summer_limits: SlotLimits,
    /// Default limits for Fall and Winter slots.
    pub study_limits: SlotLimits,
    /// Reference plan used to bias candidate-slot ordering.
    pub standard_sequence: StandardSequence,
    /// Mandatory credits expected before the first work term.
    pub min_credits_before_work_term: f64,
    /// Accounted credits that count as a full-time study term.
    pub full_time_credits: f64,
}

impl ProgramProfile {
    /// Creates a profile with the standard defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credit_ceiling: 120.0,
            summer_limits: SlotLimits::defaults_for(Season::Summer),
            study_limits: SlotLimits::defaults_for(Season::Fall),
            standard_sequence: StandardSequence::new(),
            min_credits_before_work_term: 24.0,
            full_time_credits: 12.0,
        }
    }

    /// Sets the credit ceiling.
    pub fn with_credit_ceiling(mut self, ceiling: f64) -> Self {
        self.credit_ceiling = ceiling;
        self
    }

    /// Sets the Summer slot defaults.
    pub fn with_summer_limits(mut self, limits: SlotLimits) -> Self {
        self.summer_limits = limits;
        self
    }

    /// Sets the Fall/Winter slot defaults.
    pub fn with_study_limits(mut self, limits: SlotLimits) -> Self {
        self.study_limits = limits;
        self
    }

    /// Sets the standard-sequence table.
    pub fn with_standard_sequence(mut self, sequence: StandardSequence) -> Self {
        self.standard_sequence = sequence;
        self
    }

    /// Default limits for a season.
    pub fn limits_for(&self, season: Season) -> SlotLimits {
        match season {
            Season::Summer => self.summer_limits,
            Season::Fall | Season::Winter => self.study_limits,
        }
    }
}

impl Default for ProgramProfile {
    fn default() -> Self {
        Self::new("default")
    }
}
