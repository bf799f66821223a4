//! Requirement structure and free-text requirement parsing.
//!
//! A requirement is an AND of OR-groups: every group must be satisfied,
//! and a group is satisfied by any one of its alternatives. Raw catalog
//! text like `"ENGR 213; MATH 204 or MATH 205"` parses into
//! `[[ENGR213], [MATH204, MATH205]]`.
//!
//! Parsing is a small hand-rolled tokenizer, not a regex: `;`/`,` split
//! AND-groups, the standalone word `or` splits alternatives, and each
//! alternative is scanned for the first course-code token. A group that
//! yields no valid token is dropped entirely; malformed text degrades
//! rather than erroring.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One OR-group: any listed alternative satisfies the group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqGroup {
    alternatives: Vec<String>,
}

impl ReqGroup {
    /// Creates a group from alternatives. Empty-id entries are dropped.
    pub fn new<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alternatives: alternatives
                .into_iter()
                .map(Into::into)
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// The acceptable course ids, in catalog order.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Whether the group lists the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.alternatives.iter().any(|a| a == id)
    }

    /// Whether the group has no alternatives.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

/// An AND-of-OR requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    groups: Vec<ReqGroup>,
}

impl Requirement {
    /// A requirement with no groups (always satisfied).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a requirement from groups, dropping empty ones.
    pub fn new<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = ReqGroup>,
    {
        Self {
            groups: groups.into_iter().filter(|g| !g.is_empty()).collect(),
        }
    }

    /// Parses raw catalog requirement text.
    ///
    /// `""`, `"N/A"`, and `"None"` all parse to the empty requirement.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Self::empty();
        }

        let groups = trimmed
            .split([';', ','])
            .map(|part| {
                ReqGroup::new(
                    split_on_word_or(part)
                        .into_iter()
                        .filter_map(scan_course_token),
                )
            })
            .filter(|g| !g.is_empty())
            .collect();

        Self { groups }
    }

    /// The AND-groups.
    pub fn groups(&self) -> &[ReqGroup] {
        &self.groups
    }

    /// Whether the requirement has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Appends a group. Empty groups are ignored.
    pub fn push_group(&mut self, group: ReqGroup) {
        if !group.is_empty() {
            self.groups.push(group);
        }
    }

    /// Whether any group lists the given id as an alternative.
    pub fn references(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.contains(id))
    }

    /// Every id referenced by any group.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.alternatives.iter().map(String::as_str))
    }
}

impl fmt::Display for Requirement {
    /// Serializes back to parseable text: groups joined by `"; "`,
    /// alternatives by `" or "`. Re-parsing yields the same structure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            for (j, alt) in group.alternatives.iter().enumerate() {
                if j > 0 {
                    f.write_str(" or ")?;
                }
                f.write_str(alt)?;
            }
        }
        Ok(())
    }
}

/// Splits on the standalone word `or`, case-insensitive.
fn split_on_word_or(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 2 <= bytes.len() {
        let at_word = bytes[i..i + 2].eq_ignore_ascii_case(b"or")
            && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric())
            && (i + 2 == bytes.len() || !bytes[i + 2].is_ascii_alphanumeric());
        if at_word {
            pieces.push(&text[start..i]);
            start = i + 2;
            i += 2;
        } else {
            i += 1;
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Scans a text fragment for the first course-code token and returns it
/// normalized (uppercased, separators removed).
///
/// Recognized shapes: 3–4 letters, optional spaces/hyphens, 3 digits,
/// optional trailing letter (`ENGR213`, `MATH 204`, `MECH-490A`); the
/// work-term token `WT<digit>`; either optionally prefixed `REP<digit>_`.
pub fn scan_course_token(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        // Token boundary on the left.
        if start > 0 && bytes[start - 1].is_ascii_alphanumeric() {
            continue;
        }
        if let Some(token) = match_token(bytes, start) {
            return Some(token);
        }
    }
    None
}

fn match_token(bytes: &[u8], start: usize) -> Option<String> {
    // REP<digit>_ prefix, then a plain token.
    if bytes.len() >= start + 5
        && bytes[start..start + 3].eq_ignore_ascii_case(b"REP")
        && bytes[start + 3].is_ascii_digit()
        && bytes[start + 4] == b'_'
    {
        let rest = match_plain_token(bytes, start + 5)?;
        return Some(format!(
            "REP{}_{rest}",
            char::from(bytes[start + 3])
        ));
    }
    match_plain_token(bytes, start)
}

fn match_plain_token(bytes: &[u8], start: usize) -> Option<String> {
    // Work-term token: WT + one digit.
    if bytes.len() >= start + 3
        && bytes[start..start + 2].eq_ignore_ascii_case(b"WT")
        && bytes[start + 2].is_ascii_digit()
        && !boundary_violated(bytes, start + 3)
    {
        return Some(format!("WT{}", char::from(bytes[start + 2])));
    }

    // 3-4 letters.
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    let letters = i - start;
    if !(3..=4).contains(&letters) {
        return None;
    }

    // Optional separators between letters and digits.
    let mut j = i;
    while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'-') {
        j += 1;
    }

    // Exactly 3 digits.
    if bytes.len() < j + 3 || !bytes[j..j + 3].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut end = j + 3;

    // Optional trailing letter.
    if end < bytes.len() && bytes[end].is_ascii_alphabetic() && !boundary_violated(bytes, end + 1) {
        end += 1;
    }
    if boundary_violated(bytes, end) {
        return None;
    }

    let mut token = String::with_capacity(end - start);
    for &b in &bytes[start..end] {
        if b != b' ' && b != b'-' {
            token.push(char::from(b.to_ascii_uppercase()));
        }
    }
    Some(token)
}

/// A token must not be immediately followed by another alphanumeric.
fn boundary_violated(bytes: &[u8], end: usize) -> bool {
    end < bytes.len() && bytes[end].is_ascii_alphanumeric()
}
