//! Goal ordering for the placement search.
//!
//! The placer attacks goals greedily, so the order across independent
//! goals decides who gets first pick of congested slots. Goals are
//! ranked by an ancestor count (an approximate size of the course's
//! transitive requirement chain) so that deep chains are placed while
//! the grid is still open.
//!
//! Electives rank *before* mandatory courses on purpose: the credit-cap
//! trimmer removes electives from the tail of the sequence, and placing
//! them first pushes them toward slots the trimmer visits first.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{course_level, Catalog, CourseKind};

/// Memoized transitive-requirement-chain sizes for one catalog.
#[derive(Debug, Clone)]
pub struct AncestorCounts {
    counts: BTreeMap<String, u32>,
}

impl AncestorCounts {
    /// Computes counts for every course in the catalog.
    ///
    /// For each prerequisite and co-requisite AND-group, the first
    /// alternative defined by the catalog contributes
    /// `1 + ancestor_count(alternative)`; groups with no in-catalog
    /// alternative contribute nothing. A cycle guard makes re-entered
    /// courses contribute 0, so cyclic chains terminate.
    pub fn compute(catalog: &Catalog) -> Self {
        let mut counts = BTreeMap::new();
        let mut in_progress = BTreeSet::new();
        for id in catalog.ids() {
            count_for(catalog, id, &mut counts, &mut in_progress);
        }
        Self { counts }
    }

    /// Ancestor count for a course; 0 for unknown ids.
    pub fn get(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }
}

fn count_for(
    catalog: &Catalog,
    id: &str,
    counts: &mut BTreeMap<String, u32>,
    in_progress: &mut BTreeSet<String>,
) -> u32 {
    if let Some(&c) = counts.get(id) {
        return c;
    }
    let Some(course) = catalog.get(id) else {
        return 0;
    };
    if !in_progress.insert(id.to_string()) {
        // Cycle guard: a re-entered course contributes nothing.
        return 0;
    }

    let mut total = 0;
    for group in course.prereqs.groups().iter().chain(course.coreqs.groups()) {
        if let Some(alt) = group
            .alternatives()
            .iter()
            .find(|a| catalog.contains(a))
        {
            total += 1 + count_for(catalog, alt, counts, in_progress);
        }
    }

    in_progress.remove(id);
    counts.insert(id.to_string(), total);
    total
}

/// Orders goal courses for the placement driver.
///
/// Key, most significant first: elective (`TechnicalElective`) before
/// mandatory, deeper requirement chains first, higher course level
/// first, then id ascending so the order is fully deterministic.
pub fn order_goals(catalog: &Catalog, counts: &AncestorCounts, goals: &BTreeSet<String>) -> Vec<String> {
    let mut ordered: Vec<String> = goals.iter().cloned().collect();
    ordered.sort_by(|a, b| {
        let key = |id: &str| {
            (
                catalog
                    .get(id)
                    .is_some_and(|c| c.kind == CourseKind::TechnicalElective),
                counts.get(id),
                course_level(id).unwrap_or(9),
            )
        };
        key(b).cmp(&key(a)).then_with(|| a.cmp(b))
    });
    ordered
}
