//! The solve driver: request in, outcome out.
//!
//! One solve is a fresh, self-contained computation over a catalog
//! snapshot: assemble the catalog, seed the grid with manual
//! placements, order the goals, run the backward-chaining placer per
//! goal, trim over-ceiling electives, and derive the structural
//! warnings. Courses that cannot be placed end up in the outcome's
//! unallocated list; the solve itself never fails past catalog
//! assembly.
//!
//! # Determinism
//! Identical requests produce identical outcomes: goal ordering is
//! fully tie-broken and all cross-course iteration runs in sorted
//! order.

mod placer;
mod trimmer;
mod validity;
mod warnings;

pub use validity::slot_admits;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{
    normalize_course_code, slot_index, slot_season, slot_year, Catalog, CatalogError, CourseRecord,
    ProgramProfile, Season, SlotLimits, TermGrid, SLOT_COUNT, YEARS,
};
use crate::priority::{order_goals, AncestorCounts};

use placer::SearchState;

/// Default number of slot trials one solve may spend.
pub const DEFAULT_ITERATION_BUDGET: u64 = 200_000;

/// A manual pre-placement: courses pinned to one term by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrePlacement {
    /// Year, 1-based.
    pub year: usize,
    pub season: Season,
    /// Course ids to pin into the slot.
    pub courses: Vec<String>,
}

/// A per-slot capacity override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLimitOverride {
    /// Year, 1-based.
    pub year: usize,
    pub season: Season,
    pub limits: SlotLimits,
}

/// Input container for one solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Catalog records for the program.
    pub records: Vec<CourseRecord>,
    /// Program configuration.
    #[serde(default)]
    pub profile: ProgramProfile,
    /// Courses already bound to terms by the caller.
    #[serde(default)]
    pub pre_placed: Vec<PrePlacement>,
    /// Per-slot capacity overrides.
    #[serde(default)]
    pub limit_overrides: Vec<SlotLimitOverride>,
    /// Course ids to place.
    #[serde(default)]
    pub goals: Vec<String>,
    /// Course ids flagged to be repeated.
    #[serde(default)]
    pub repeats: Vec<String>,
}

/// One placed course as the caller displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntry {
    pub id: String,
    pub display: String,
    pub work_term: bool,
}

/// One term of the resulting plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermPlan {
    /// Year, 1-based.
    pub year: usize,
    pub season: Season,
    /// Accounted credit held by the term.
    pub credits: f64,
    pub courses: Vec<PlacedEntry>,
}

/// An unplaced course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedCourse {
    pub id: String,
    pub display: String,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// All 21 terms in slot order, including empty ones.
    pub terms: Vec<TermPlan>,
    /// Courses that remained unplaced after trimming, sorted by id.
    pub unallocated: Vec<UnallocatedCourse>,
    /// Structural warning strings.
    pub warnings: Vec<String>,
}

/// Failure while preparing a solve.
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A pre-placement or limit override names a year outside 1..=7.
    #[error("year {year} is outside the plan range 1..=7")]
    YearOutOfRange { year: usize },
}

/// The sequence solver.
///
/// # Example
///
/// ```
/// use course_sequencer::models::CourseRecord;
/// use course_sequencer::solver::{SolveRequest, Solver};
///
/// let request = SolveRequest {
///     records: vec![
///         CourseRecord::new("ENGR 213").with_credit(3.0).offered_every_season(),
///         CourseRecord::new("ENGR 311")
///             .with_credit(3.0)
///             .with_prerequisites("ENGR 213")
///             .offered_every_season(),
///     ],
///     goals: vec!["ENGR 311".into()],
///     ..SolveRequest::default()
/// };
///
/// let outcome = Solver::new().solve(&request).expect("solve");
/// assert!(outcome.unallocated.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    iteration_budget: u64,
}

impl Solver {
    /// Creates a solver with the default iteration budget.
    pub fn new() -> Self {
        Self {
            iteration_budget: DEFAULT_ITERATION_BUDGET,
        }
    }

    /// Sets the slot-trial budget for one solve.
    pub fn with_iteration_budget(mut self, budget: u64) -> Self {
        self.iteration_budget = budget;
        self
    }

    /// Runs one solve.
    pub fn solve(&self, request: &SolveRequest) -> Result<SolveOutcome, SolveError> {
        let mut catalog = Catalog::from_records(&request.records)?;
        catalog.apply_repeats(&request.repeats);

        let mut grid = TermGrid::with_defaults(
            request.profile.summer_limits,
            request.profile.study_limits,
        );
        for over in &request.limit_overrides {
            grid.set_limits(checked_slot(over.year, over.season)?, over.limits);
        }

        let mut state = SearchState::new(&catalog, &request.profile, grid, self.iteration_budget);

        // Exempt credit is satisfied without occupying a slot.
        for course in catalog.courses() {
            if course.kind == crate::models::CourseKind::ExemptCredit {
                state.taken.insert(course.id.clone());
            }
        }

        // Manual placements bypass the search but not the bookkeeping.
        for pre in &request.pre_placed {
            let index = checked_slot(pre.year, pre.season)?;
            for raw in &pre.courses {
                let id = normalize_course_code(raw);
                if let Some(course) = catalog.get(&id) {
                    let course = course.clone();
                    state.grid.place(&course, index);
                    state.taken.insert(id);
                }
            }
        }

        state.remaining = request
            .goals
            .iter()
            .map(|raw| normalize_course_code(raw))
            .filter(|id| catalog.contains(id) && !state.taken.contains(id))
            .collect();

        let counts = AncestorCounts::compute(&catalog);
        let ordered = order_goals(&catalog, &counts, &state.remaining);
        debug!(goals = ordered.len(), "starting placement pass");
        for goal in &ordered {
            if state.remaining.contains(goal) {
                state.place_goal(goal);
            }
        }

        trimmer::trim_to_ceiling(
            &mut state.grid,
            &catalog,
            request.profile.credit_ceiling,
            &mut state.taken,
            &mut state.remaining,
        );

        let warnings = warnings::structural_warnings(&state.grid, &catalog, &request.profile);

        Ok(build_outcome(&state.grid, &catalog, &state.remaining, warnings))
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_slot(year: usize, season: Season) -> Result<usize, SolveError> {
    if !(1..=YEARS).contains(&year) {
        return Err(SolveError::YearOutOfRange { year });
    }
    Ok(slot_index(year, season))
}

fn build_outcome(
    grid: &TermGrid,
    catalog: &Catalog,
    remaining: &BTreeSet<String>,
    warnings: Vec<String>,
) -> SolveOutcome {
    let terms = (0..SLOT_COUNT)
        .map(|index| {
            let slot = grid.slot(index);
            TermPlan {
                year: slot_year(index),
                season: slot_season(index),
                credits: slot.credits,
                courses: slot
                    .courses
                    .iter()
                    .map(|id| PlacedEntry {
                        id: id.clone(),
                        display: catalog
                            .get(id)
                            .map(|c| c.display())
                            .unwrap_or_else(|| id.clone()),
                        work_term: crate::models::is_work_term(id),
                    })
                    .collect(),
            }
        })
        .collect();

    let unallocated = remaining
        .iter()
        .map(|id| UnallocatedCourse {
            id: id.clone(),
            display: catalog
                .get(id)
                .map(|c| c.display())
                .unwrap_or_else(|| id.clone()),
        })
        .collect();

    SolveOutcome {
        terms,
        unallocated,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StandardSequence;

    fn record(code: &str, credit: f64) -> CourseRecord {
        CourseRecord::new(code)
            .with_credit(credit)
            .with_kind("CORE")
            .offered_every_season()
    }

    fn placement_of(outcome: &SolveOutcome, id: &str) -> Option<usize> {
        outcome.terms.iter().enumerate().find_map(|(index, term)| {
            term.courses
                .iter()
                .any(|c| c.id == id)
                .then_some(index)
        })
    }

    #[test]
    fn test_scenario_prerequisite_chain_ordering() {
        // X300 requires X200; solving X300 places both, in order.
        let request = SolveRequest {
            records: vec![
                record("XRAY200", 3.0),
                record("XRAY300", 3.0).with_prerequisites("XRAY 200"),
            ],
            goals: vec!["XRAY300".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        let pre = placement_of(&outcome, "XRAY200").expect("prereq placed");
        let dep = placement_of(&outcome, "XRAY300").expect("dependent placed");
        assert!(pre < dep);
        assert!(outcome.unallocated.is_empty());
    }

    #[test]
    fn test_scenario_capacity_pushes_to_next_offering() {
        // Two Winter-only 3-credit courses under a 3-credit/1-course
        // cap: the second lands in the following Winter.
        let mut records = vec![
            CourseRecord::new("AAAA201").with_credit(3.0).offered(false, false, true),
            CourseRecord::new("BBBB201").with_credit(3.0).offered(false, false, true),
        ];
        for r in &mut records {
            r.kind = "CORE".into();
        }
        let request = SolveRequest {
            records,
            profile: ProgramProfile::default().with_study_limits(SlotLimits::new(3.0, 1)),
            goals: vec!["AAAA201".into(), "BBBB201".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        let first = placement_of(&outcome, "AAAA201").expect("first placed");
        let second = placement_of(&outcome, "BBBB201").expect("second placed");
        assert_eq!(slot_season(first), Season::Winter);
        assert_eq!(slot_season(second), Season::Winter);
        assert_eq!(second, first + 3);
    }

    #[test]
    fn test_scenario_capstone_adjacency() {
        let request = SolveRequest {
            records: vec![
                CourseRecord::new("MECH490A")
                    .with_credit(2.0)
                    .with_kind("PROG")
                    .offered(false, true, false),
                CourseRecord::new("MECH490B")
                    .with_credit(2.0)
                    .with_kind("PROG")
                    .with_prerequisites("MECH 490A")
                    .offered(false, false, true),
            ],
            goals: vec!["MECH490B".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        let a = placement_of(&outcome, "MECH490A").expect("A placed");
        let b = placement_of(&outcome, "MECH490B").expect("B placed");
        assert_eq!(b, a + 1);
        assert_eq!(slot_season(a), Season::Fall);
        assert_eq!(slot_season(b), Season::Winter);
    }

    #[test]
    fn test_scenario_repeat_shadow_rewires_dependents() {
        let request = SolveRequest {
            records: vec![
                record("MECH211", 3.0),
                record("MECH311", 3.0).with_prerequisites("MECH 211"),
            ],
            goals: vec!["MECH211".into(), "MECH311".into()],
            repeats: vec!["MECH211".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        let shadow = placement_of(&outcome, "REP1_MECH211").expect("shadow placed");
        let original = placement_of(&outcome, "MECH211").expect("original placed");
        let dependent = placement_of(&outcome, "MECH311").expect("dependent placed");
        assert!(shadow < original);
        assert!(shadow < dependent);
        assert!(original < dependent);
    }

    #[test]
    fn test_scenario_credit_ceiling_trims_tail_electives() {
        // 18 core credits + six 1-credit electives pre-placed in the
        // last year; ceiling 18 forces exactly the six electives out.
        let mut records: Vec<CourseRecord> = (0..6)
            .map(|i| record(&format!("CORE2{:02}", i), 3.0))
            .collect();
        let mut pre_placed = vec![
            PrePlacement {
                year: 1,
                season: Season::Fall,
                courses: (0..3).map(|i| format!("CORE2{:02}", i)).collect(),
            },
            PrePlacement {
                year: 1,
                season: Season::Winter,
                courses: (3..6).map(|i| format!("CORE2{:02}", i)).collect(),
            },
        ];
        for i in 0..6 {
            let id = format!("ELEC4{:02}", i);
            records.push(
                CourseRecord::new(&id)
                    .with_credit(1.0)
                    .with_kind("TE")
                    .offered_every_season(),
            );
        }
        pre_placed.push(PrePlacement {
            year: 7,
            season: Season::Fall,
            courses: (0..6).map(|i| format!("ELEC4{:02}", i)).collect(),
        });

        let request = SolveRequest {
            records,
            profile: ProgramProfile::default().with_credit_ceiling(18.0),
            pre_placed,
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        assert_eq!(outcome.unallocated.len(), 6);
        assert!(outcome.unallocated.iter().all(|u| u.id.starts_with("ELEC")));
        let total: f64 = outcome.terms.iter().map(|t| t.credits).sum();
        assert!(total <= 18.0);
    }

    #[test]
    fn test_scenario_unknown_reference_reserves_no_slot() {
        let request = SolveRequest {
            records: vec![record("XRAY300", 3.0).with_prerequisites("GHST 101")],
            goals: vec!["XRAY300".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        assert!(placement_of(&outcome, "XRAY300").is_some());
        assert!(placement_of(&outcome, "GHST101").is_none());
        assert!(outcome.unallocated.is_empty());
    }

    #[test]
    fn test_unsatisfiable_goal_lands_in_unallocated() {
        // Offered nowhere: can never be placed.
        let request = SolveRequest {
            records: vec![CourseRecord::new("XRAY300").with_credit(3.0).with_kind("CORE")],
            goals: vec!["XRAY300".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        assert_eq!(outcome.unallocated.len(), 1);
        assert_eq!(outcome.unallocated[0].id, "XRAY300");
    }

    #[test]
    fn test_determinism_identical_requests_identical_outcomes() {
        let request = SolveRequest {
            records: vec![
                record("MATH203", 3.0),
                record("MATH204", 3.0).with_prerequisites("MATH 203"),
                record("ENGR311", 3.0).with_prerequisites("MATH 204"),
                CourseRecord::new("ELEC498")
                    .with_credit(3.0)
                    .with_kind("TE")
                    .offered_every_season(),
                CourseRecord::new("WT1").offered_every_season(),
            ],
            profile: ProgramProfile::default().with_standard_sequence(
                StandardSequence::new().with_entry("WT1", 6),
            ),
            goals: vec![
                "MATH203".into(),
                "MATH204".into(),
                "ENGR311".into(),
                "ELEC498".into(),
                "WT1".into(),
            ],
            ..SolveRequest::default()
        };
        let a = Solver::new().solve(&request).expect("first solve");
        let b = Solver::new().solve(&request).expect("second solve");
        assert_eq!(a, b);
    }

    #[test]
    fn test_manual_placement_feeds_lower_bound() {
        let request = SolveRequest {
            records: vec![
                record("XRAY200", 3.0),
                record("XRAY300", 3.0).with_prerequisites("XRAY 200"),
            ],
            pre_placed: vec![PrePlacement {
                year: 3,
                season: Season::Fall,
                courses: vec!["XRAY200".into()],
            }],
            goals: vec!["XRAY300".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        let pinned = placement_of(&outcome, "XRAY200").expect("pinned");
        assert_eq!(pinned, slot_index(3, Season::Fall));
        let dep = placement_of(&outcome, "XRAY300").expect("dependent");
        assert!(dep > pinned);
    }

    #[test]
    fn test_year_out_of_range_is_rejected() {
        let request = SolveRequest {
            records: vec![record("XRAY200", 3.0)],
            pre_placed: vec![PrePlacement {
                year: 9,
                season: Season::Fall,
                courses: vec!["XRAY200".into()],
            }],
            ..SolveRequest::default()
        };
        let err = Solver::new().solve(&request).expect_err("out of range");
        assert_eq!(err, SolveError::YearOutOfRange { year: 9 });
    }

    #[test]
    fn test_work_term_exclusivity_in_full_solve() {
        let request = SolveRequest {
            records: vec![record("XRAY200", 3.0), CourseRecord::new("WT1").offered_every_season()],
            goals: vec!["XRAY200".into(), "WT1".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");

        for term in &outcome.terms {
            if term.courses.iter().any(|c| c.work_term) {
                assert_eq!(term.courses.len(), 1);
            }
        }
    }

    #[test]
    fn test_outcome_serde_round_trip() {
        let request = SolveRequest {
            records: vec![record("XRAY200", 3.0)],
            goals: vec!["XRAY200".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");
        let json = serde_json::to_string(&outcome).expect("serialize");
        let back: SolveOutcome = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(outcome, back);
    }

    #[test]
    fn test_request_serde_round_trip() {
        let request = SolveRequest {
            records: vec![record("XRAY200", 3.0)],
            profile: ProgramProfile::default().with_credit_ceiling(116.5),
            pre_placed: vec![PrePlacement {
                year: 1,
                season: Season::Fall,
                courses: vec!["XRAY200".into()],
            }],
            limit_overrides: vec![SlotLimitOverride {
                year: 2,
                season: Season::Winter,
                limits: SlotLimits::new(13.0, 4),
            }],
            goals: vec!["XRAY200".into()],
            repeats: vec![],
        };
        let json = serde_json::to_string(&request).expect("serialize");
        let back: SolveRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(request, back);
    }

    #[test]
    fn test_limit_override_applies_to_slot() {
        // Close year 1 Fall entirely; the course must land later.
        let request = SolveRequest {
            records: vec![CourseRecord::new("XRAY200")
                .with_credit(3.0)
                .with_kind("CORE")
                .offered(false, true, false)],
            limit_overrides: vec![SlotLimitOverride {
                year: 1,
                season: Season::Fall,
                limits: SlotLimits::new(0.0, 0),
            }],
            goals: vec!["XRAY200".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new().solve(&request).expect("solve");
        let placed = placement_of(&outcome, "XRAY200").expect("placed");
        assert_eq!(placed, slot_index(2, Season::Fall));
    }

    #[test]
    fn test_budget_exhaustion_never_panics() {
        let request = SolveRequest {
            records: vec![
                record("XRAY200", 3.0),
                record("XRAY300", 3.0).with_prerequisites("XRAY 200"),
            ],
            goals: vec!["XRAY300".into()],
            ..SolveRequest::default()
        };
        let outcome = Solver::new()
            .with_iteration_budget(1)
            .solve(&request)
            .expect("solve");
        assert_eq!(outcome.unallocated.len(), 1);
    }
}
