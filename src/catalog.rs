//! Skill catalog: remote skills matched against the configured groups.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::{
    config::{Config, Group},
    error::{Error, Result},
    model::Skill,
    remote::FieldService,
};

/// A configured label that exists remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSkill {
    /// Configured label.
    pub label: String,
    /// Remote skill id.
    pub id: String,
}

/// A group split into labels that exist remotely and labels that do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResolution {
    /// Group name.
    pub name: String,
    /// Labels with a remote match, in configured order.
    pub resolved: Vec<ResolvedSkill>,
    /// Labels without a remote match, in configured order.
    pub missing: Vec<String>,
}

impl GroupResolution {
    /// Ids of the resolved skills.
    pub fn ids(&self) -> BTreeSet<String> {
        self.resolved.iter().map(|skill| skill.id.clone()).collect()
    }
}

/// How much of a group a technician already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCoverage {
    /// Group name.
    pub name: String,
    /// Resolved group skills the technician holds.
    pub found: usize,
    /// Resolved group skills.
    pub total: usize,
}

impl GroupCoverage {
    /// True when the group has skills and the technician holds all of them.
    pub fn complete(&self) -> bool {
        self.total > 0 && self.found == self.total
    }
}

/// Remote skills for this run, resolved against every configured group.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    /// Label to id; the last skill with a given label wins.
    by_label: HashMap<String, String>,
    /// Resolution of every group, in display order.
    groups: Vec<GroupResolution>,
}

impl SkillCatalog {
    /// Fetch the remote skills and resolve the configured groups.
    pub async fn fetch(remote: &dyn FieldService, config: &Config) -> Result<Self> {
        let skills = remote.skills(config.skill_limit()).await?;
        debug!(count = skills.len(), "fetched skill catalog");
        Ok(Self::build(&skills, config.groups()))
    }

    /// Resolve `groups` against an already fetched skill list.
    pub fn build(skills: &[Skill], groups: &[Group]) -> Self {
        let mut by_label = HashMap::new();
        for skill in skills {
            let label = skill.label.trim();
            if label.is_empty() || skill.id.is_empty() {
                continue;
            }
            by_label.insert(label.to_string(), skill.id.clone());
        }

        let groups = groups
            .iter()
            .map(|group| resolve_group(group, &by_label))
            .collect();
        Self { by_label, groups }
    }

    /// Look up the remote id of a label.
    pub fn id_for(&self, label: &str) -> Option<&str> {
        self.by_label.get(label.trim()).map(String::as_str)
    }

    /// Resolution of every group, in display order.
    pub fn groups(&self) -> &[GroupResolution] {
        &self.groups
    }

    /// Resolution of a group by exact name.
    pub fn group(&self, name: &str) -> Option<&GroupResolution> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Resolution of a group an operation is about to apply.
    ///
    /// Fails when the group is unknown or none of its labels exist remotely.
    pub fn target(&self, name: &str) -> Result<&GroupResolution> {
        let group = self.group(name).ok_or_else(|| Error::InvalidGroup {
            value: name.to_string(),
        })?;
        if group.resolved.is_empty() {
            return Err(Error::EmptyGroup {
                group: group.name.clone(),
                missing: group.missing.clone(),
            });
        }
        Ok(group)
    }

    /// Coverage of every group for a technician holding `current` skill ids.
    pub fn coverage(&self, current: &BTreeSet<String>) -> Vec<GroupCoverage> {
        self.groups
            .iter()
            .map(|group| {
                let ids = group.ids();
                GroupCoverage {
                    name: group.name.clone(),
                    found: ids.intersection(current).count(),
                    total: ids.len(),
                }
            })
            .collect()
    }
}

/// Split a group's labels into resolved and missing.
fn resolve_group(group: &Group, by_label: &HashMap<String, String>) -> GroupResolution {
    let mut resolved = Vec::new();
    let mut missing = Vec::new();
    for label in &group.skills {
        match by_label.get(label.trim()) {
            Some(id) => resolved.push(ResolvedSkill {
                label: label.clone(),
                id: id.clone(),
            }),
            None => missing.push(label.clone()),
        }
    }
    GroupResolution {
        name: group.name.clone(),
        resolved,
        missing,
    }
}
