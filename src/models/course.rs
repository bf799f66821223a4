//! Course model and course-code conventions.
//!
//! A course code is 3–4 letters followed by a 3-digit number and an
//! optional letter (`ENGR213`, `MECH390A`), or a work-term token
//! (`WT1`). A `REP<n>_` prefix marks the synthetic shadow of a course
//! that must be repeated.
//!
//! The leading digit of the number is the course level; work terms and
//! codes without a number carry no level.

use serde::{Deserialize, Serialize};

use super::Requirement;

/// Academic season within a year.
///
/// The two summer sub-terms of the source data are merged: a course is
/// offered in `Summer` if either sub-term flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// All seasons in slot order.
    pub const ALL: [Season; 3] = [Season::Summer, Season::Fall, Season::Winter];

    /// Position within a year (Summer=0, Fall=1, Winter=2).
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            Season::Summer => 0,
            Season::Fall => 1,
            Season::Winter => 2,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Which seasons a course is offered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSet {
    pub summer: bool,
    pub fall: bool,
    pub winter: bool,
}

impl SeasonSet {
    /// Builds from the raw per-term flags (two summer sub-terms).
    pub fn from_flags(summer_1: bool, summer_2: bool, fall: bool, winter: bool) -> Self {
        Self {
            summer: summer_1 || summer_2,
            fall,
            winter,
        }
    }

    /// A course offered in every season.
    pub fn every_season() -> Self {
        Self {
            summer: true,
            fall: true,
            winter: true,
        }
    }

    /// Whether the course is offered in the given season.
    pub fn offers(&self, season: Season) -> bool {
        match season {
            Season::Summer => self.summer,
            Season::Fall => self.fall,
            Season::Winter => self.winter,
        }
    }

    /// Whether the course is offered in no season at all.
    pub fn is_empty(&self) -> bool {
        !(self.summer || self.fall || self.winter)
    }
}

/// Catalog classification of a course.
///
/// Parsed from the catalog's type tag; behavior that used to hang off
/// string comparisons (trim eligibility, credit accounting) lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseKind {
    /// Structurally mandatory core course.
    Core,
    /// Technical elective; the only kind the credit-cap trimmer may remove.
    TechnicalElective,
    /// Program-specific mandatory course.
    Program,
    /// Exempted/transferred credit; seeds the taken set, never a goal.
    ExemptCredit,
    /// Synthetic shadow of a course flagged for repeat.
    Repeat,
    /// Unrecognized tag.
    Other,
}

impl CourseKind {
    /// Parses the catalog type tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "CORE" => CourseKind::Core,
            "TE" => CourseKind::TechnicalElective,
            "PROG" => CourseKind::Program,
            "ECP" => CourseKind::ExemptCredit,
            "REPEAT" => CourseKind::Repeat,
            _ => CourseKind::Other,
        }
    }

    /// Whether the credit-cap trimmer may remove this course.
    pub fn is_trim_eligible(self) -> bool {
        matches!(self, CourseKind::TechnicalElective)
    }

    /// Whether the course counts toward mandatory-credit checks.
    pub fn is_mandatory(self) -> bool {
        matches!(self, CourseKind::Core | CourseKind::Program)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Normalized course code, unique within a catalog.
    pub id: String,
    /// Display title (falls back to the code).
    pub title: String,
    /// Credit value; work terms and repeat shadows carry 0.
    pub credit: f64,
    /// Seasons the course is offered in.
    pub offered: SeasonSet,
    /// Catalog classification.
    pub kind: CourseKind,
    /// Prerequisite requirement (AND of OR-groups).
    pub prereqs: Requirement,
    /// Co-requisite requirement (AND of OR-groups).
    pub coreqs: Requirement,
}

impl Course {
    /// Creates a course with no requirements, offered nowhere.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            credit: 0.0,
            offered: SeasonSet::default(),
            kind: CourseKind::Other,
            prereqs: Requirement::empty(),
            coreqs: Requirement::empty(),
        }
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the credit value.
    pub fn with_credit(mut self, credit: f64) -> Self {
        self.credit = credit;
        self
    }

    /// Sets the offered seasons.
    pub fn with_offered(mut self, offered: SeasonSet) -> Self {
        self.offered = offered;
        self
    }

    /// Sets the classification.
    pub fn with_kind(mut self, kind: CourseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the prerequisite requirement.
    pub fn with_prereqs(mut self, prereqs: Requirement) -> Self {
        self.prereqs = prereqs;
        self
    }

    /// Sets the co-requisite requirement.
    pub fn with_coreqs(mut self, coreqs: Requirement) -> Self {
        self.coreqs = coreqs;
        self
    }

    /// Whether this course is a work term.
    pub fn is_work_term(&self) -> bool {
        is_work_term(&self.id)
    }

    /// Whether this course is exempt from per-slot credit/count
    /// accounting and from the program credit ceiling.
    ///
    /// Exemption follows classification, not the credit value: a repeat
    /// shadow stays exempt even if it carries a marked credit.
    pub fn is_credit_exempt(&self) -> bool {
        self.is_work_term() || self.kind == CourseKind::Repeat
    }

    /// Display entry, e.g. `"Applied ODEs (3 cr)"`.
    pub fn display(&self) -> String {
        format!("{} ({} cr)", self.title, self.credit)
    }
}

/// Strips a `REP<n>_` repeat prefix, if present.
pub fn base_id(id: &str) -> &str {
    let bytes = id.as_bytes();
    if bytes.len() > 5
        && id.starts_with("REP")
        && bytes[3].is_ascii_digit()
        && bytes[4] == b'_'
    {
        &id[5..]
    } else {
        id
    }
}

/// Whether the id carries a `REP<n>_` repeat prefix.
pub fn is_repeat_shadow(id: &str) -> bool {
    base_id(id) != id
}

/// Shadow id synthesized for a course flagged to be repeated.
pub fn repeat_shadow_id(id: &str) -> String {
    format!("REP1_{id}")
}

/// Whether the id is a work-term token (`WT` + digit).
pub fn is_work_term(id: &str) -> bool {
    let base = base_id(id).as_bytes();
    base.len() == 3 && base[0] == b'W' && base[1] == b'T' && base[2].is_ascii_digit()
}

/// Course level: leading digit of the first 3-digit run in the code.
///
/// Work terms and codes without a number have no level.
pub fn course_level(id: &str) -> Option<u32> {
    let base = base_id(id);
    if is_work_term(base) {
        return None;
    }
    let bytes = base.as_bytes();
    for window in bytes.windows(3) {
        if window.iter().all(|b| b.is_ascii_digit()) {
            return Some(u32::from(window[0] - b'0'));
        }
    }
    None
}

/// Half of a two-part capstone course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapstonePart {
    A,
    B,
}

/// Detects a capstone half by the `490A`/`490B` code suffix.
pub fn capstone_part(id: &str) -> Option<CapstonePart> {
    let base = base_id(id);
    if base.ends_with("490A") {
        Some(CapstonePart::A)
    } else if base.ends_with("490B") {
        Some(CapstonePart::B)
    } else {
        None
    }
}

/// The matching other half of a capstone course.
pub fn capstone_partner(id: &str) -> Option<String> {
    match capstone_part(id)? {
        CapstonePart::A => Some(format!("{}B", &id[..id.len() - 1])),
        CapstonePart::B => Some(format!("{}A", &id[..id.len() - 1])),
    }
}
