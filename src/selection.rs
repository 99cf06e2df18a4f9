//! Choosing a subset of a group's skills.

use std::{collections::BTreeSet, convert::Infallible, str::FromStr};

use crate::catalog::ResolvedSkill;

/// Which of a group's resolved skills to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Apply every resolved skill.
    All,
    /// Apply the skills at these 1-based positions.
    Indices(BTreeSet<usize>),
}

impl FromStr for Selection {
    type Err = Infallible;

    /// Parse `A`, an empty string, or a comma-separated list such as `1,2,5`.
    ///
    /// Parts that are not numbers are ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("a") {
            return Ok(Self::All);
        }
        let indices = trimmed
            .split(',')
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .collect();
        Ok(Self::Indices(indices))
    }
}

/// Pick the chosen skills, keeping the group's configured order.
pub fn choose_subset(resolved: &[ResolvedSkill], selection: &Selection) -> Vec<ResolvedSkill> {
    match selection {
        Selection::All => resolved.to_vec(),
        Selection::Indices(indices) => resolved
            .iter()
            .enumerate()
            .filter(|(index, _)| indices.contains(&(index + 1)))
            .map(|(_, skill)| skill.clone())
            .collect(),
    }
}
