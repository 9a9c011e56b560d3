//! Action filtering: which actions take part in a run.
//!
//! Rules, in precedence order:
//! 1. a name matching any skip pattern is excluded;
//! 2. when groups are selected, only members of a selected group run;
//! 3. otherwise everything runs except actions marked manual.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use regex::RegexSet;
use tracing::info;

use crate::domain::DomainError;

/// Decides whether an action participates in the run.
pub trait ActionFilter: Send + Sync {
    fn matches(&self, action: &str) -> bool;
}

/// Filter that lets every action through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ActionFilter for AcceptAll {
    fn matches(&self, _action: &str) -> bool {
        true
    }
}

/// Raw selection input, as collected from flags and the action file.
#[derive(Debug, Clone, Default)]
pub struct ActionSelection {
    /// Regular expressions; an action matching any of them is skipped.
    pub skip: Vec<String>,
    /// Groups chosen for this run.
    pub groups: Vec<String>,
    /// Action name to the groups it belongs to.
    pub membership: HashMap<String, HashSet<String>>,
    /// Actions that only run when one of their groups is selected.
    pub manual: HashSet<String>,
}

/// Filter built from skip patterns, group selection and manual markers.
#[derive(Debug)]
pub struct SelectionFilter {
    skip: Option<RegexSet>,
    groups: HashSet<String>,
    membership: HashMap<String, HashSet<String>>,
    manual: HashSet<String>,
    reported: Mutex<HashSet<String>>,
}

impl SelectionFilter {
    pub fn new(selection: ActionSelection) -> Result<Self, DomainError> {
        let mut patterns: Vec<String> = Vec::with_capacity(selection.skip.len());
        for pattern in selection.skip {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }

        // Compile one by one so the error names the offending pattern.
        for pattern in &patterns {
            regex::Regex::new(pattern).map_err(|e| DomainError::InvalidSkipPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        let skip = if patterns.is_empty() {
            None
        } else {
            Some(
                RegexSet::new(&patterns).map_err(|e| DomainError::InvalidSkipPattern {
                    pattern: patterns.join("|"),
                    reason: e.to_string(),
                })?,
            )
        };

        Ok(Self {
            skip,
            groups: selection.groups.into_iter().collect(),
            membership: selection.membership,
            manual: selection.manual,
            reported: Mutex::new(HashSet::new()),
        })
    }

    fn decide(&self, action: &str) -> Result<(), &'static str> {
        if self.skip.as_ref().is_some_and(|set| set.is_match(action)) {
            return Err("matches a skip pattern");
        }

        if !self.groups.is_empty() {
            let selected = self
                .membership
                .get(action)
                .is_some_and(|groups| groups.iter().any(|g| self.groups.contains(g)));
            return if selected {
                Ok(())
            } else {
                Err("not in a selected group")
            };
        }

        if self.manual.contains(action) {
            return Err("manual action, select one of its groups to run it");
        }

        Ok(())
    }

    fn report(&self, action: &str, reason: &str) {
        let first_time = match self.reported.lock() {
            Ok(mut reported) => reported.insert(action.to_owned()),
            Err(_) => true,
        };
        if first_time {
            info!(action, reason, "skip action");
        }
    }
}

impl ActionFilter for SelectionFilter {
    fn matches(&self, action: &str) -> bool {
        match self.decide(action) {
            Ok(()) => true,
            Err(reason) => {
                self.report(action, reason);
                false
            }
        }
    }
}
