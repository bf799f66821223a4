//! Constraint-based academic sequence planning.
//!
//! Assigns a student's remaining courses to year/term slots of a multi-year
//! program so that prerequisite, co-requisite, term-offering, capacity, and
//! program-structural rules hold simultaneously. The solver is a
//! backward-chaining backtracking search: placing a goal course recursively
//! places everything it transitively depends on.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Course`, `Requirement`, `Catalog`,
//!   `TermGrid`, `SlotLimits`, `ProgramProfile`, `StandardSequence`
//! - **`validation`**: Catalog integrity checks (duplicate codes, unknown
//!   requirement references, cyclic prerequisite chains)
//! - **`priority`**: Requirement-chain depth estimation and goal ordering
//! - **`solver`**: Slot validity rules, the backward-chaining placer, the
//!   credit-cap trimmer, and the `SolveRequest` → `SolveOutcome` driver
//!
//! # Guarantees
//!
//! A solve never fails as a whole: courses that cannot be placed are
//! reported in the outcome's unallocated list, and structural concerns are
//! reported as warning strings. Given identical inputs, two solves produce
//! identical outcomes.
//!
//! # References
//!
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//!   Ch. 6 (backtracking search), Ch. 9 (backward chaining)
//! - Dechter (2003), "Constraint Processing"

pub mod models;
pub mod priority;
pub mod solver;
pub mod validation;
