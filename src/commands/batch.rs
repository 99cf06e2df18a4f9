//! Plan, preview and execute a batch of technicians.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::{
    catalog::ResolvedSkill,
    error::Result,
    palette::{fmt_detail, fmt_error, fmt_heading, fmt_label, fmt_ok, fmt_skip, fmt_technician},
    plan::{BatchSummary, Plan, ReadyPlan, Tally, execute_plan, plan_technician},
    reconcile::{Changes, Mode, compute_changes, strip_group},
    remote::FieldService,
};

/// How a technician's changes are derived from the targeted skills.
#[derive(Debug, Clone, Copy)]
pub(super) enum ChangeRule {
    /// Reconcile current skills against the targeted skills.
    Reconcile(Mode),
    /// Remove the targeted skills the technician holds.
    Strip,
}

/// Parameters shared by every technician of a batch.
#[derive(Debug)]
pub(super) struct Batch<'a> {
    /// Skills the batch targets.
    pub targets: &'a [ResolvedSkill],
    /// How changes are derived.
    pub rule: ChangeRule,
    /// Activate inactive technicians instead of skipping them.
    pub activate_inactive: bool,
    /// Level sent with every new assignment.
    pub skill_level: Option<u32>,
    /// Preview only.
    pub dry_run: bool,
}

/// What a batch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BatchOutcome {
    /// Plan counts.
    pub summary: BatchSummary,
    /// Technicians with at least one pending change.
    pub pending: usize,
    /// Mutation counts, when changes were sent.
    pub tally: Option<Tally>,
}

/// A ready technician and the changes it needs.
struct Pending {
    /// Planned technician.
    plan: ReadyPlan,
    /// Changes to send.
    changes: Changes,
}

impl Batch<'_> {
    /// Ids of the targeted skills.
    fn target_ids(&self) -> BTreeSet<String> {
        self.targets.iter().map(|skill| skill.id.clone()).collect()
    }

    /// Changes for one technician.
    fn changes_for(&self, plan: &ReadyPlan) -> Changes {
        let current = plan.current_ids();
        match self.rule {
            ChangeRule::Reconcile(mode) => compute_changes(mode, &current, &self.target_ids()),
            ChangeRule::Strip => strip_group(&current, &self.target_ids()),
        }
    }
}

/// Plan every identifier, preview, then execute after confirmation.
///
/// `confirm` is only consulted for live runs with pending changes.
pub(super) async fn run_batch<F>(
    remote: &dyn FieldService,
    identifiers: &[String],
    batch: &Batch<'_>,
    use_color: bool,
    confirm: F,
) -> Result<BatchOutcome>
where
    F: FnOnce(&str) -> Result<bool>,
{
    let target_labels: HashMap<&str, &str> = batch
        .targets
        .iter()
        .map(|skill| (skill.id.as_str(), skill.label.as_str()))
        .collect();

    let mut plans = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        plans.push(plan_technician(remote, identifier, batch.activate_inactive).await);
    }

    let mut pending = Vec::new();
    let mut to_remove = 0;
    let mut to_add = 0;
    for plan in &plans {
        match plan {
            Plan::Ready(ready) => {
                let changes = batch.changes_for(ready);
                print_ready(ready, &changes, &target_labels, use_color);
                to_remove += changes.to_remove.len();
                to_add += changes.to_add.len();
                if !changes.is_empty() {
                    pending.push(Pending {
                        plan: ready.clone(),
                        changes,
                    });
                }
            }
            Plan::Skipped {
                identifier,
                technician,
                reason,
            } => {
                info!(%identifier, %reason, "skipped technician");
                println!(
                    "{} {} {} ({})",
                    fmt_technician(&technician.name, use_color),
                    fmt_detail(&format!("[{}]", technician.id), use_color),
                    fmt_skip(&plan.status().to_string(), use_color),
                    reason
                );
            }
            Plan::Failed { identifier, reason } => println!(
                "{} {} ({})",
                fmt_technician(identifier, use_color),
                fmt_error(&plan.status().to_string(), use_color),
                reason
            ),
        }
    }

    let summary = BatchSummary::of(&plans);
    println!();
    println!(
        "{} {} technician(s): {} ok, {} skipped, {} failed; {} to remove, {} to add.",
        fmt_heading("Summary:", use_color),
        plans.len(),
        summary.ok,
        summary.skipped,
        summary.failed,
        to_remove,
        to_add
    );

    let mut outcome = BatchOutcome {
        summary,
        pending: pending.len(),
        tally: None,
    };
    if pending.is_empty() {
        println!("Nothing to change.");
        return Ok(outcome);
    }
    if batch.dry_run {
        println!(
            "{} {} technician(s) would change; nothing was sent.",
            fmt_label("Dry run:", use_color),
            pending.len()
        );
        return Ok(outcome);
    }
    if !confirm(&format!("Apply changes to {} technician(s)?", pending.len()))? {
        println!("Aborted.");
        return Ok(outcome);
    }

    let mut total = Tally::default();
    for entry in &pending {
        let tally = execute_plan(remote, &entry.plan, &entry.changes, batch.skill_level).await;
        println!(
            "{} removed {}/{}, added {}/{}",
            fmt_technician(&entry.plan.technician.name, use_color),
            tally.removed_ok,
            entry.changes.to_remove.len(),
            tally.added_ok,
            entry.changes.to_add.len()
        );
        total += tally;
    }

    println!();
    let failures = total.failures().to_string();
    println!(
        "{} removed {} ({} failed), added {} ({} failed); {} failure(s).",
        fmt_label("Done:", use_color),
        total.removed_ok,
        total.removed_fail,
        total.added_ok,
        total.added_fail,
        if total.failures() == 0 {
            fmt_ok(&failures, use_color)
        } else {
            fmt_error(&failures, use_color)
        }
    );
    outcome.tally = Some(total);
    Ok(outcome)
}

/// Print the preview of a ready technician.
fn print_ready(
    plan: &ReadyPlan,
    changes: &Changes,
    target_labels: &HashMap<&str, &str>,
    use_color: bool,
) {
    println!(
        "{} {} {}",
        fmt_technician(&plan.technician.name, use_color),
        fmt_detail(&format!("[{}]", plan.technician.id), use_color),
        fmt_ok("OK", use_color)
    );
    let current = plan.current_labels();
    if current.is_empty() {
        println!("    {} (none)", fmt_label("current:", use_color));
    } else {
        println!("    {} {}", fmt_label("current:", use_color), current.join(", "));
    }
    if changes.is_empty() {
        println!("    no changes");
        return;
    }
    for skill_id in &changes.to_remove {
        let label = plan.label_for(skill_id).unwrap_or(skill_id);
        println!("    {} {}", fmt_error("-", use_color), label);
    }
    for skill_id in &changes.to_add {
        let label = target_labels
            .get(skill_id.as_str())
            .copied()
            .unwrap_or(skill_id);
        println!("    {} {}", fmt_skip("+", use_color), label);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Batch, ChangeRule, run_batch};
    use crate::{
        catalog::ResolvedSkill, error::Error, plan::Tally, reconcile::Mode,
        testutil::FakeFieldService,
    };

    const MARIA: &str = "0Hn000000000001AAA";
    const PEDRO: &str = "0Hn000000000002AAA";

    fn fake() -> FakeFieldService {
        FakeFieldService::new()
            .with_technician(MARIA, "Maria Silva", true)
            .with_technician(PEDRO, "Pedro Souza", false)
            .with_skill("S1", "Chip")
            .with_skill("S2", "Mesh")
            .with_skill("S3", "TV")
            .with_link(MARIA, "L1", "S1", "Chip")
            .with_link(MARIA, "L2", "S2", "Mesh")
    }

    fn targets() -> Vec<ResolvedSkill> {
        [("S2", "Mesh"), ("S3", "TV")]
            .iter()
            .map(|(id, label)| ResolvedSkill {
                label: (*label).to_string(),
                id: (*id).to_string(),
            })
            .collect()
    }

    fn identifiers() -> Vec<String> {
        vec![MARIA.to_string(), PEDRO.to_string(), "Nobody".to_string()]
    }

    fn batch(targets: &[ResolvedSkill], rule: ChangeRule, dry_run: bool) -> Batch<'_> {
        Batch {
            targets,
            rule,
            activate_inactive: false,
            skill_level: None,
            dry_run,
        }
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let fake = fake();
        let targets = targets();
        let outcome = run_batch(
            &fake,
            &identifiers(),
            &batch(&targets, ChangeRule::Reconcile(Mode::AlignToGroup), true),
            false,
            |_| panic!("dry run must not prompt"),
        )
        .await
        .expect("batch");

        assert_eq!(outcome.summary.ok, 1);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.pending, 1);
        assert_eq!(outcome.tally, None);
        assert!(fake.untouched());
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let fake = fake();
        let targets = targets();
        let outcome = run_batch(
            &fake,
            &identifiers(),
            &batch(&targets, ChangeRule::Reconcile(Mode::ResetToGroup), false),
            false,
            |_| Ok(false),
        )
        .await
        .expect("batch");
        assert_eq!(outcome.tally, None);
        assert!(fake.untouched());
    }

    #[tokio::test]
    async fn confirmed_run_executes_ready_plans() {
        let fake = fake();
        let targets = targets();
        let outcome = run_batch(
            &fake,
            &identifiers(),
            &batch(&targets, ChangeRule::Reconcile(Mode::AlignToGroup), false),
            false,
            |_| Ok(true),
        )
        .await
        .expect("batch");

        assert_eq!(
            outcome.tally,
            Some(Tally {
                removed_ok: 1,
                removed_fail: 0,
                added_ok: 1,
                added_fail: 0,
            })
        );
        let expected: BTreeSet<String> = ["S2", "S3"].iter().map(|id| (*id).to_string()).collect();
        assert_eq!(fake.held_skills(MARIA), expected);
        assert!(fake.activated().is_empty());
    }

    #[tokio::test]
    async fn strip_removes_only_targets() {
        let fake = fake();
        let targets = targets();
        let outcome = run_batch(
            &fake,
            &[MARIA.to_string()],
            &batch(&targets, ChangeRule::Strip, false),
            false,
            |_| Ok(true),
        )
        .await
        .expect("batch");

        assert_eq!(fake.deleted(), vec!["L2".to_string()]);
        assert!(fake.created().is_empty());
        assert_eq!(outcome.tally.map(|tally| tally.removed_ok), Some(1));
    }

    #[tokio::test]
    async fn nothing_pending_skips_confirmation() {
        let fake = fake();
        let targets = targets();
        let outcome = run_batch(
            &fake,
            &[PEDRO.to_string()],
            &batch(&targets, ChangeRule::Reconcile(Mode::AddOnly), false),
            false,
            |_| panic!("nothing to confirm"),
        )
        .await
        .expect("batch");
        assert_eq!(outcome.pending, 0);
    }

    #[tokio::test]
    async fn prompt_errors_propagate() {
        let fake = fake();
        let targets = targets();
        let error = run_batch(
            &fake,
            &[MARIA.to_string()],
            &batch(&targets, ChangeRule::Reconcile(Mode::AddOnly), false),
            false,
            |_| Err(Error::PromptCanceled),
        )
        .await
        .expect_err("should fail");
        assert!(matches!(error, Error::PromptCanceled));
        assert!(fake.untouched());
    }
}
