//! Boundary resolution: partitioning changed files by path-prefix rules.
//!
//! A rule is a `/`-separated pattern where `*` matches exactly one path
//! segment. Each changed file is assigned to the boundary named by the most
//! specific rule that prefix-matches it, or to the catch-all [`CATCH_ALL`]
//! boundary when nothing matches.

use std::collections::BTreeMap;

/// Name of the boundary collecting files that match no rule.
pub const CATCH_ALL: &str = "*";

/// Infix joining the source branch and the sanitized boundary name.
pub const MIRROR_INFIX: &str = ".erised.";

/// A single boundary pattern, pre-split into its non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRule {
    pattern: String,
    segments: Vec<String>,
}

impl BoundaryRule {
    /// Parses a rule such as `packages/*` or `apps/web/`.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            segments: split_segments(pattern),
        }
    }

    /// The pattern as written by the user.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the matched prefix of `file_segments`, with wildcards replaced
    /// by the concrete segment, or `None` when the rule does not apply.
    fn matched_prefix(&self, file_segments: &[&str]) -> Option<String> {
        if self.segments.len() > file_segments.len() {
            return None;
        }
        let mut matched = Vec::with_capacity(self.segments.len());
        for (rule_segment, file_segment) in self.segments.iter().zip(file_segments) {
            if rule_segment == "*" || rule_segment == file_segment {
                matched.push(*file_segment);
            } else {
                return None;
            }
        }
        Some(matched.join("/"))
    }
}

/// An ordered rule set, sorted once so that the longest pattern is tried
/// first. Ties keep the order the rules were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryRules {
    rules: Vec<BoundaryRule>,
}

impl BoundaryRules {
    /// Builds a rule set from raw patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: Vec<BoundaryRule> = patterns
            .into_iter()
            .map(|p| BoundaryRule::new(p.as_ref()))
            .collect();
        // Stable sort keeps the supplied order among equally long patterns.
        rules.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
        Self { rules }
    }

    /// Rules in the order they are tried.
    #[must_use]
    pub fn rules(&self) -> &[BoundaryRule] {
        &self.rules
    }

    /// Returns the boundary name for a single changed file.
    #[must_use]
    pub fn boundary_of(&self, changed_file: &str) -> String {
        let file_segments = split_segments(changed_file);
        let file_segments: Vec<&str> = file_segments.iter().map(String::as_str).collect();
        self.rules
            .iter()
            .find_map(|rule| rule.matched_prefix(&file_segments))
            .unwrap_or_else(|| CATCH_ALL.to_string())
    }
}

/// A named group of changed files destined for its own branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Canonical boundary name (matched prefix or [`CATCH_ALL`]).
    pub name: String,
    /// Files assigned to this boundary, in input order.
    pub changed_files: Vec<String>,
}

impl Boundary {
    /// Name of the branch this boundary is mirrored to.
    #[must_use]
    pub fn branch_name(&self, current_branch: &str) -> String {
        mirrored_branch_name(current_branch, &self.name)
    }
}

/// Partitions `changed_files` into boundaries, sorted by boundary name.
///
/// Every input file lands in exactly one boundary. An empty input yields no
/// boundaries at all, not even the catch-all.
#[must_use]
pub fn resolve(rules: &BoundaryRules, changed_files: &[String]) -> Vec<Boundary> {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in changed_files {
        by_name
            .entry(rules.boundary_of(file))
            .or_default()
            .push(file.clone());
    }
    by_name
        .into_iter()
        .map(|(name, changed_files)| Boundary {
            name,
            changed_files,
        })
        .collect()
}

/// Derives `<current>.erised.<boundary>` with every run of characters
/// outside `[a-z0-9]` collapsed to a single underscore.
#[must_use]
pub fn mirrored_branch_name(current_branch: &str, boundary: &str) -> String {
    format!("{current_branch}{MIRROR_INFIX}{}", sanitize(boundary))
}

/// Keeps only the branches mirrored from `current_branch`.
#[must_use]
pub fn filter_mirrored_branches(branches: &[String], current_branch: &str) -> Vec<String> {
    let prefix = format!("{current_branch}{MIRROR_INFIX}");
    branches
        .iter()
        .filter(|b| b.starts_with(&prefix))
        .cloned()
        .collect()
}

/// The sanitized boundary part of a mirrored branch name.
#[must_use]
pub fn short_name(branch: &str) -> &str {
    branch
        .rfind(MIRROR_INFIX)
        .map_or(branch, |idx| &branch[idx + MIRROR_INFIX.len()..])
}

fn sanitize(boundary: &str) -> String {
    let mut out = String::with_capacity(boundary.len());
    let mut in_run = false;
    for c in boundary.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
