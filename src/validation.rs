//! Catalog integrity checks.
//!
//! Surfaces structural problems in a catalog snapshot before solving:
//! - Requirement references to ids the catalog does not define
//! - Courses offered in no season at all
//! - Circular prerequisite chains (DFS cycle detection)
//!
//! Findings are informational: the solver runs regardless. Unknown
//! references are deliberately treated as satisfied during the search
//! (the catalog mirror may simply not carry the referenced program's
//! courses), and cycles are bounded by the placer's depth guard; the
//! findings make both visible without changing solve behavior.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::Catalog;

/// A single integrity finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFinding {
    /// Finding category.
    pub kind: ValidationKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of integrity findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// A requirement references an id absent from the catalog.
    UnknownReference,
    /// A course is offered in no season and can never be placed.
    NeverOffered,
    /// The prerequisite graph contains a cycle.
    CyclicRequirement,
}

impl ValidationFinding {
    fn new(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks a catalog snapshot and returns all findings.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    let mut unknown: BTreeSet<(String, String)> = BTreeSet::new();
    for course in catalog.courses() {
        for referenced in course
            .prereqs
            .referenced_ids()
            .chain(course.coreqs.referenced_ids())
        {
            if !catalog.contains(referenced) {
                unknown.insert((course.id.clone(), referenced.to_string()));
            }
        }
        if course.offered.is_empty() {
            findings.push(ValidationFinding::new(
                ValidationKind::NeverOffered,
                format!("Course {} is offered in no season", course.id),
            ));
        }
    }
    for (from, to) in unknown {
        findings.push(ValidationFinding::new(
            ValidationKind::UnknownReference,
            format!("Course {from} references {to}, which is not in the catalog"),
        ));
    }

    if let Some(cycle) = detect_cycle(catalog) {
        findings.push(cycle);
    }

    findings
}

/// Detects cycles in the prerequisite graph using DFS.
///
/// Edges run from a course to every in-catalog alternative of every
/// prerequisite group. A back-edge (a node already on the recursion
/// stack) means a cycle.
fn detect_cycle(catalog: &Catalog) -> Option<ValidationFinding> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for course in catalog.courses() {
        let targets: Vec<&str> = course
            .prereqs
            .referenced_ids()
            .filter(|id| catalog.contains(id))
            .collect();
        adj.insert(course.id.as_str(), targets);
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for id in catalog.ids() {
        if !visited.contains(id) && has_cycle_dfs(id, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationFinding::new(
                ValidationKind::CyclicRequirement,
                format!("Circular prerequisite chain involving {id}"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true;
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
