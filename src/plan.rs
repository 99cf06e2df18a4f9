//! Per-technician planning and execution.
//!
//! Planning resolves an identifier, applies the inactive-technician policy
//! and snapshots the current links. Execution turns a [`Changes`] set into
//! remote deletions and creations, counting outcomes instead of stopping on
//! the first failure.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    ops::AddAssign,
};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    model::{NewSkillLink, SkillLink, Technician},
    reconcile::Changes,
    remote::FieldService,
    resolve::resolve_identifier,
};

/// Timestamp layout the API expects for `EffectiveStartDate`.
const START_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Terminal state of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Ready to execute.
    Ok,
    /// Inactive technician left alone.
    Skip,
    /// Identifier or link lookup failed.
    Error,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ok => "OK",
            Self::Skip => "SKIP",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Outcome of planning one technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The technician resolved, is active and its links are known.
    Ready(ReadyPlan),
    /// The technician is inactive and was not activated.
    Skipped {
        /// Identifier as supplied by the operator.
        identifier: String,
        /// The resolved technician.
        technician: Technician,
        /// Why the technician was skipped.
        reason: String,
    },
    /// The identifier could not be planned.
    Failed {
        /// Identifier as supplied by the operator.
        identifier: String,
        /// Why planning failed.
        reason: String,
    },
}

impl Plan {
    /// Terminal state of the plan.
    pub fn status(&self) -> PlanStatus {
        match self {
            Self::Ready(_) => PlanStatus::Ok,
            Self::Skipped { .. } => PlanStatus::Skip,
            Self::Failed { .. } => PlanStatus::Error,
        }
    }

    /// Identifier the plan was built for.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Ready(ready) => &ready.identifier,
            Self::Skipped { identifier, .. } | Self::Failed { identifier, .. } => identifier,
        }
    }

    /// The executable plan, if any.
    pub fn ready(&self) -> Option<&ReadyPlan> {
        match self {
            Self::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

/// An active technician and a snapshot of its current links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyPlan {
    /// Identifier as supplied by the operator.
    pub identifier: String,
    /// The resolved technician.
    pub technician: Technician,
    /// Current skill links.
    pub links: Vec<SkillLink>,
}

impl ReadyPlan {
    /// Skill ids the technician currently holds.
    pub fn current_ids(&self) -> BTreeSet<String> {
        self.links
            .iter()
            .filter(|link| !link.skill_id.is_empty())
            .map(|link| link.skill_id.clone())
            .collect()
    }

    /// Labels of the current links, in fetch order.
    pub fn current_labels(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.label.as_str()).collect()
    }

    /// Label of a held skill, if any link carries it.
    pub fn label_for(&self, skill_id: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.skill_id == skill_id)
            .map(|link| link.label.as_str())
    }

    /// Skill id to link id; the last link for a skill wins.
    fn link_ids(&self) -> HashMap<&str, &str> {
        self.links
            .iter()
            .filter(|link| !link.link_id.is_empty())
            .map(|link| (link.skill_id.as_str(), link.link_id.as_str()))
            .collect()
    }
}

/// Resolve an identifier and snapshot the technician's links.
pub async fn plan_technician(
    remote: &dyn FieldService,
    identifier: &str,
    activate_inactive: bool,
) -> Plan {
    let mut technician = match resolve_identifier(remote, identifier).await {
        Ok(technician) => technician,
        Err(error) => {
            return Plan::Failed {
                identifier: identifier.to_string(),
                reason: error.to_string(),
            };
        }
    };

    if !technician.is_active {
        if !activate_inactive {
            return skipped(identifier, technician, "inactive".to_string());
        }
        match activate(remote, &technician).await {
            Ok(refreshed) => technician = refreshed,
            Err(reason) => {
                return skipped(
                    identifier,
                    technician,
                    format!("inactive, activation failed: {reason}"),
                );
            }
        }
        if !technician.is_active {
            return skipped(identifier, technician, "inactive".to_string());
        }
    }

    match remote.skill_links(&technician.id).await {
        Ok(links) => {
            debug!(technician = %technician.id, links = links.len(), "planned technician");
            Plan::Ready(ReadyPlan {
                identifier: identifier.to_string(),
                technician,
                links,
            })
        }
        Err(error) => Plan::Failed {
            identifier: identifier.to_string(),
            reason: format!("could not fetch current skills: {error}"),
        },
    }
}

/// Activate a technician and read it back, keeping resolved display fields.
async fn activate(
    remote: &dyn FieldService,
    technician: &Technician,
) -> Result<Technician, String> {
    remote
        .activate_technician(&technician.id)
        .await
        .map_err(|error| error.to_string())?;
    let refreshed = remote
        .technician_by_id(&technician.id)
        .await
        .map_err(|error| error.to_string())?
        .ok_or_else(|| "technician disappeared after activation".to_string())?;
    debug!(technician = %technician.id, active = refreshed.is_active, "activated technician");
    Ok(Technician {
        is_active: refreshed.is_active,
        ..technician.clone()
    })
}

/// Build a skipped plan.
fn skipped(identifier: &str, technician: Technician, reason: String) -> Plan {
    Plan::Skipped {
        identifier: identifier.to_string(),
        technician,
        reason,
    }
}

/// Outcome counts of executed mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Links deleted.
    pub removed_ok: usize,
    /// Link deletions that failed.
    pub removed_fail: usize,
    /// Links created.
    pub added_ok: usize,
    /// Link creations that failed.
    pub added_fail: usize,
}

impl Tally {
    /// Number of failed mutations.
    pub fn failures(&self) -> usize {
        self.removed_fail + self.added_fail
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.removed_ok += other.removed_ok;
        self.removed_fail += other.removed_fail;
        self.added_ok += other.added_ok;
        self.added_fail += other.added_fail;
    }
}

/// Apply `changes` to a ready technician: removals first, then additions.
pub async fn execute_plan(
    remote: &dyn FieldService,
    plan: &ReadyPlan,
    changes: &Changes,
    skill_level: Option<u32>,
) -> Tally {
    let mut tally = Tally::default();
    let technician_id = plan.technician.id.as_str();
    let link_ids = plan.link_ids();

    for skill_id in &changes.to_remove {
        let Some(link_id) = link_ids.get(skill_id.as_str()) else {
            debug!(technician = technician_id, skill = %skill_id, "no link id; skipping removal");
            continue;
        };
        match remote.delete_skill_link(link_id).await {
            Ok(()) => tally.removed_ok += 1,
            Err(error) => {
                warn!(
                    technician = technician_id,
                    link = %link_id,
                    %error,
                    "failed to remove skill"
                );
                tally.removed_fail += 1;
            }
        }
    }

    for skill_id in &changes.to_add {
        let link = NewSkillLink {
            technician_id: technician_id.to_string(),
            skill_id: skill_id.clone(),
            effective_start_date: start_date_now(),
            skill_level,
        };
        match remote.create_skill_link(&link).await {
            Ok(link_id) => {
                debug!(technician = technician_id, skill = %skill_id, ?link_id, "added skill");
                tally.added_ok += 1;
            }
            Err(error) => {
                warn!(technician = technician_id, skill = %skill_id, %error, "failed to add skill");
                tally.added_fail += 1;
            }
        }
    }

    tally
}

/// Current UTC time in the `EffectiveStartDate` layout.
pub fn start_date_now() -> String {
    Utc::now().format(START_DATE_FORMAT).to_string()
}

/// Plan counts per terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Plans ready to execute.
    pub ok: usize,
    /// Skipped technicians.
    pub skipped: usize,
    /// Failed identifiers.
    pub failed: usize,
}

impl BatchSummary {
    /// Count the plans of a batch.
    pub fn of(plans: &[Plan]) -> Self {
        let mut summary = Self::default();
        for plan in plans {
            match plan.status() {
                PlanStatus::Ok => summary.ok += 1,
                PlanStatus::Skip => summary.skipped += 1,
                PlanStatus::Error => summary.failed += 1,
            }
        }
        summary
    }
}
