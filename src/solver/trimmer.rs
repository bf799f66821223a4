//! Credit-cap trimming.
//!
//! After placement, total accounted credit may exceed the program
//! ceiling. One backward pass over the slots (latest first) removes
//! technical electives, most recently added first within a slot,
//! until the ceiling holds or the pass runs out of electives. Mandatory
//! courses and work terms are never removed; removed ids return to the
//! remaining set.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{Catalog, TermGrid, SLOT_COUNT};

/// Trims electives until the ceiling holds. Returns removed ids in
/// removal order.
pub(crate) fn trim_to_ceiling(
    grid: &mut TermGrid,
    catalog: &Catalog,
    ceiling: f64,
    taken: &mut BTreeSet<String>,
    remaining: &mut BTreeSet<String>,
) -> Vec<String> {
    let mut removed = Vec::new();
    if grid.total_credits() <= ceiling {
        return removed;
    }

    for index in (0..SLOT_COUNT).rev() {
        if grid.total_credits() <= ceiling {
            break;
        }
        // Most recently added first within the slot.
        let electives: Vec<String> = grid
            .slot(index)
            .courses
            .iter()
            .rev()
            .filter(|id| {
                catalog
                    .get(id)
                    .is_some_and(|c| c.kind.is_trim_eligible())
            })
            .cloned()
            .collect();

        for id in electives {
            if grid.total_credits() <= ceiling {
                break;
            }
            if let Some(course) = catalog.get(&id).cloned() {
                grid.remove(&course, index);
                taken.remove(&id);
                remaining.insert(id.clone());
                debug!(course = %id, slot = index, "trimmed elective over credit ceiling");
                removed.push(id);
            }
        }
    }

    removed
}
