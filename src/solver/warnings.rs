//! Structural plan warnings.
//!
//! Two advisory checks on the finished grid, reported as strings and
//! never fatal:
//!
//! - Mandatory credit accumulated before the first work term below the
//!   program threshold.
//! - A below-full-time study term somewhere before the last work term.

use crate::models::{slot_season, slot_year, Catalog, ProgramProfile, TermGrid};

/// Runs both structural checks and returns their warning strings.
pub(crate) fn structural_warnings(
    grid: &TermGrid,
    catalog: &Catalog,
    profile: &ProgramProfile,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(first_wt) = grid.first_work_term_slot() {
        let mandatory_credit: f64 = grid
            .placements()
            .filter(|&(_, index)| index < first_wt)
            .filter_map(|(id, _)| catalog.get(id))
            .filter(|c| c.kind.is_mandatory())
            .map(|c| c.credit)
            .sum();
        if mandatory_credit < profile.min_credits_before_work_term {
            warnings.push(format!(
                "Only {:.1} mandatory credits are scheduled before the first work term \
                 (program expects at least {:.1})",
                mandatory_credit, profile.min_credits_before_work_term
            ));
        }
    }

    if let Some(last_wt) = grid.last_work_term_slot() {
        for index in 0..last_wt {
            let slot = grid.slot(index);
            if slot.has_work_term() || slot.counted == 0 {
                continue;
            }
            if slot.credits < profile.full_time_credits {
                warnings.push(format!(
                    "Year {} {} carries {:.1} credits, below the full-time load of {:.1}, \
                     before the last work term",
                    slot_year(index),
                    slot_season(index).label(),
                    slot.credits,
                    profile.full_time_credits
                ));
            }
        }
    }

    warnings
}
