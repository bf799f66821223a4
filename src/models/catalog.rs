//! Catalog snapshot: the read-only course universe of one solve.
//!
//! Built once per solve request from raw per-course records; afterwards
//! only [`Catalog::apply_repeats`] may rewrite it, before the search
//! starts. Codes are normalized on the way in, both requirement strings
//! are parsed once, and a reverse-dependency index is derived for
//! callers that need "required by" displays.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    course::{self, CourseKind, SeasonSet},
    requirement::{scan_course_token, ReqGroup},
    Course, Requirement,
};

/// Raw catalog input for one course, as the external catalog mirror
/// provides it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course code, possibly embedded in a longer title string.
    pub code: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Credit value.
    #[serde(default)]
    pub credit: f64,
    /// First summer sub-term offering flag.
    #[serde(default)]
    pub summer_1: bool,
    /// Second summer sub-term offering flag.
    #[serde(default)]
    pub summer_2: bool,
    /// Fall offering flag.
    #[serde(default)]
    pub fall: bool,
    /// Winter offering flag.
    #[serde(default)]
    pub winter: bool,
    /// Catalog type tag (`CORE`, `TE`, `PROG`, `ECP`, ...).
    #[serde(default)]
    pub kind: String,
    /// Raw prerequisite text.
    #[serde(default)]
    pub prerequisites: String,
    /// Raw co-requisite text.
    #[serde(default)]
    pub corequisites: String,
}

impl CourseRecord {
    /// Creates a record for the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the credit value.
    pub fn with_credit(mut self, credit: f64) -> Self {
        self.credit = credit;
        self
    }

    /// Sets the type tag.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the raw prerequisite text.
    pub fn with_prerequisites(mut self, text: impl Into<String>) -> Self {
        self.prerequisites = text.into();
        self
    }

    /// Sets the raw co-requisite text.
    pub fn with_corequisites(mut self, text: impl Into<String>) -> Self {
        self.corequisites = text.into();
        self
    }

    /// Marks the course as offered in every season.
    pub fn offered_every_season(mut self) -> Self {
        self.summer_1 = true;
        self.fall = true;
        self.winter = true;
        self
    }

    /// Sets the offering flags per season.
    pub fn offered(mut self, summer: bool, fall: bool, winter: bool) -> Self {
        self.summer_1 = summer;
        self.summer_2 = false;
        self.fall = fall;
        self.winter = winter;
        self
    }
}

/// Failure while assembling a catalog snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two records normalize to the same course id.
    #[error("duplicate course id {id}")]
    DuplicateCourse { id: String },
    /// A record's code normalizes to nothing.
    #[error("course record with an empty code")]
    EmptyCourseId,
}

/// Normalizes a raw code cell to a catalog id.
///
/// Prefers the first course-code token found in the text; falls back to
/// the uppercased text with separators stripped.
pub fn normalize_course_code(raw: &str) -> String {
    scan_course_token(raw).unwrap_or_else(|| {
        raw.chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect()
    })
}

/// The read-only course universe of one solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    courses: BTreeMap<String, Course>,
    required_by: BTreeMap<String, BTreeSet<String>>,
    corequired_by: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    /// Assembles a snapshot from raw records.
    ///
    /// Codes are normalized, requirement strings parsed, and the
    /// reverse-dependency index built. Duplicate or empty ids are the
    /// only hard failures; malformed requirement text just degrades.
    pub fn from_records(records: &[CourseRecord]) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for record in records {
            let id = normalize_course_code(&record.code);
            if id.is_empty() {
                return Err(CatalogError::EmptyCourseId);
            }
            if catalog.courses.contains_key(&id) {
                return Err(CatalogError::DuplicateCourse { id });
            }
            let title = if record.title.trim().is_empty() {
                record.code.trim().to_string()
            } else {
                record.title.trim().to_string()
            };
            let course = Course::new(id.clone())
                .with_title(title)
                .with_credit(record.credit)
                .with_offered(SeasonSet::from_flags(
                    record.summer_1,
                    record.summer_2,
                    record.fall,
                    record.winter,
                ))
                .with_kind(CourseKind::from_tag(&record.kind))
                .with_prereqs(Requirement::parse(&record.prerequisites))
                .with_coreqs(Requirement::parse(&record.corequisites));
            catalog.courses.insert(id, course);
        }
        catalog.rebuild_reverse_index();
        Ok(catalog)
    }

    /// Looks up a course by id.
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    /// Whether the catalog defines the id.
    pub fn contains(&self, id: &str) -> bool {
        self.courses.contains_key(id)
    }

    /// All course ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.courses.keys().map(String::as_str)
    }

    /// All courses, sorted by id.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses listing `id` as a prerequisite alternative.
    pub fn required_by(&self, id: &str) -> impl Iterator<Item = &str> {
        self.required_by
            .get(id)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Courses listing `id` as a co-requisite alternative.
    pub fn corequired_by(&self, id: &str) -> impl Iterator<Item = &str> {
        self.corequired_by
            .get(id)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Synthesizes repeat shadows for the flagged course ids.
    ///
    /// For each flagged id present in the catalog: a zero-credit shadow
    /// course `REP<n>_<id>` (kind `Repeat`, offered every season) is
    /// added, the original gains the shadow as a prerequisite group, and
    /// every course that listed the original as a prerequisite
    /// alternative gains the shadow as an additional group. Unknown ids
    /// are ignored.
    pub fn apply_repeats(&mut self, ids: &[String]) {
        for raw in ids {
            let id = normalize_course_code(raw);
            if !self.courses.contains_key(&id) {
                continue;
            }
            let shadow_id = course::repeat_shadow_id(&id);
            if self.courses.contains_key(&shadow_id) {
                continue;
            }

            let title = self
                .courses
                .get(&id)
                .map(|c| format!("Repeat: {}", c.title))
                .unwrap_or_else(|| shadow_id.clone());
            let shadow = Course::new(shadow_id.clone())
                .with_title(title)
                .with_kind(CourseKind::Repeat)
                .with_offered(SeasonSet::every_season());
            self.courses.insert(shadow_id.clone(), shadow);

            let dependents: Vec<String> = self
                .courses
                .iter()
                .filter(|(cid, c)| **cid != shadow_id && c.prereqs.references(&id))
                .map(|(cid, _)| cid.clone())
                .collect();
            for dep in dependents {
                if let Some(c) = self.courses.get_mut(&dep) {
                    c.prereqs.push_group(ReqGroup::new([shadow_id.clone()]));
                }
            }
            if let Some(original) = self.courses.get_mut(&id) {
                original
                    .prereqs
                    .push_group(ReqGroup::new([shadow_id.clone()]));
            }
        }
        self.rebuild_reverse_index();
    }

    fn rebuild_reverse_index(&mut self) {
        self.required_by.clear();
        self.corequired_by.clear();
        for (id, course) in &self.courses {
            for referenced in course.prereqs.referenced_ids() {
                self.required_by
                    .entry(referenced.to_string())
                    .or_default()
                    .insert(id.clone());
            }
            for referenced in course.coreqs.referenced_ids() {
                self.corequired_by
                    .entry(referenced.to_string())
                    .or_default()
                    .insert(id.clone());
            }
        }
    }
}
