//! Skill assignment diffing.
//!
//! Everything here is pure: given the skill ids a technician currently holds
//! and the ids the targeted group wants, decide what to remove and what to
//! add. Sets are ordered so that previews, logs and remote calls always
//! iterate in the same order.

use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::error::{Error, Result};

/// Policy for current assignments that the group does not ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Never remove anything; only add what is missing.
    AddOnly,
    /// Remove every current assignment, then add the group.
    ResetToGroup,
    /// Remove only assignments outside the group.
    AlignToGroup,
}

impl Mode {
    /// All modes in menu order.
    pub const ALL: [Self; 3] = [Self::AddOnly, Self::ResetToGroup, Self::AlignToGroup];

    /// Menu number of the mode.
    pub fn number(self) -> u8 {
        match self {
            Self::AddOnly => 1,
            Self::ResetToGroup => 2,
            Self::AlignToGroup => 3,
        }
    }

    /// Short name accepted on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::AddOnly => "add-only",
            Self::ResetToGroup => "reset",
            Self::AlignToGroup => "align",
        }
    }

    /// One-line description for prompts and previews.
    pub fn description(self) -> &'static str {
        match self {
            Self::AddOnly => "remove nothing, only add what the group is missing",
            Self::ResetToGroup => "remove every current skill and keep only the group",
            Self::AlignToGroup => "remove only skills that are not part of the group",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode {} ({})", self.number(), self.description())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| normalized == mode.number().to_string() || normalized == mode.id())
            .ok_or_else(|| Error::InvalidMode {
                value: value.to_string(),
            })
    }
}

/// Assignments to remove and to add, keyed by skill id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Skill ids whose current assignment is removed.
    pub to_remove: BTreeSet<String>,
    /// Skill ids that get a new assignment.
    pub to_add: BTreeSet<String>,
}

impl Changes {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the changes that bring `current` in line with `desired` under `mode`.
pub fn compute_changes(
    mode: Mode,
    current: &BTreeSet<String>,
    desired: &BTreeSet<String>,
) -> Changes {
    let to_remove = match mode {
        Mode::AddOnly => BTreeSet::new(),
        Mode::ResetToGroup => current.clone(),
        Mode::AlignToGroup => current.difference(desired).cloned().collect(),
    };
    let to_add = desired.difference(current).cloned().collect();
    Changes { to_remove, to_add }
}

/// Changes that strip a group's skills from a technician without adding anything.
pub fn strip_group(current: &BTreeSet<String>, group: &BTreeSet<String>) -> Changes {
    Changes {
        to_remove: current.intersection(group).cloned().collect(),
        to_add: BTreeSet::new(),
    }
}
