//! Sequence-planning domain models.
//!
//! Core data types for representing one program's catalog snapshot and
//! the mutable placement state of one solve.
//!
//! | Type | Represents |
//! |------|-----------|
//! | `Course` / `CourseKind` | One catalog entry and its classification |
//! | `Requirement` / `ReqGroup` | Parsed AND-of-OR prerequisite structure |
//! | `Catalog` | The read-only course universe of one solve |
//! | `TermGrid` / `SlotState` | Mutable per-slot placement state |
//! | `SlotLimits` / `ProgramProfile` | Capacity and program configuration |
//! | `StandardSequence` | Advisory reference-plan slot table |

pub mod course;
mod catalog;
mod grid;
mod profile;
mod requirement;

pub use catalog::{normalize_course_code, Catalog, CatalogError, CourseRecord};
pub use course::{
    base_id, capstone_part, capstone_partner, course_level, is_repeat_shadow, is_work_term,
    repeat_shadow_id, CapstonePart, Course, CourseKind, Season, SeasonSet,
};
pub use grid::{
    slot_index, slot_season, slot_year, SlotIndex, SlotLimits, SlotState, TermGrid, SLOT_COUNT,
    YEARS,
};
pub use profile::{ProgramProfile, StandardSequence};
pub use requirement::{scan_course_token, ReqGroup, Requirement};
