//! Implementation of the `techskills apply` command.

use std::path::{Path, PathBuf};

use crate::{
    catalog::{GroupResolution, ResolvedSkill, SkillCatalog},
    commands::{
        ColorChoice,
        batch::{Batch, ChangeRule, run_batch},
        confirm, connect, prompt_group, prompt_mode, prompt_selection,
    },
    config::{Config, Credentials},
    error::{Error, Result},
    input::collect_identifiers,
    palette::{fmt_group, fmt_label, fmt_warning},
    reconcile::Mode,
    selection::{Selection, choose_subset},
};

/// Options of the apply command.
#[derive(Debug, Default)]
pub struct ApplyOptions {
    /// Technician ids, names or emails from the command line.
    pub identifiers: Vec<String>,
    /// File with one identifier per line.
    pub file: Option<PathBuf>,
    /// Group name or 1-based number.
    pub group: Option<String>,
    /// Removal mode as a number or name.
    pub mode: Option<String>,
    /// Level sent with every new assignment.
    pub skill_level: Option<u32>,
    /// Activate inactive technicians instead of skipping them.
    pub activate_inactive: bool,
    /// Preview without sending changes.
    pub dry_run: bool,
    /// Pick the group's skills interactively.
    pub select: bool,
    /// Comma-separated 1-based positions of the skills to apply.
    pub only: Option<String>,
    /// Skip the confirmation prompt.
    pub yes: bool,
}

/// Execute the apply command.
pub async fn run(
    color: ColorChoice,
    config_path: Option<&Path>,
    options: &ApplyOptions,
) -> Result<()> {
    let use_color = color.enabled();

    // Validate operator input before touching the network.
    let identifiers = collect_identifiers(&options.identifiers, options.file.as_deref())?;
    let mode = options.mode.as_deref().map(str::parse::<Mode>).transpose()?;
    let config = Config::load(config_path)?;
    let credentials = Credentials::from_env()?;

    let group_name = match options.group.as_deref() {
        Some(value) => config.find_group(value)?.name.clone(),
        None => prompt_group(&config)?,
    };
    let mode = match mode {
        Some(mode) => mode,
        None => prompt_mode()?,
    };

    let client = connect(&config, &credentials).await?;
    let catalog = SkillCatalog::fetch(&client, &config).await?;
    let group = catalog.target(&group_name)?;
    print_group_header(group, mode, use_color);

    let selection = if let Some(only) = options.only.as_deref() {
        let Ok(selection) = only.parse::<Selection>();
        selection
    } else if options.select {
        prompt_selection(&group.resolved)?
    } else {
        Selection::All
    };
    let targets = chosen_skills(group, &selection)?;

    let batch = Batch {
        targets: &targets,
        rule: ChangeRule::Reconcile(mode),
        activate_inactive: options.activate_inactive,
        skill_level: options.skill_level,
        dry_run: options.dry_run,
    };
    let yes = options.yes;
    run_batch(&client, &identifiers, &batch, use_color, |prompt| {
        if yes { Ok(true) } else { confirm(prompt) }
    })
    .await?;
    Ok(())
}

/// Print the targeted group, its missing labels and the mode.
fn print_group_header(group: &GroupResolution, mode: Mode, use_color: bool) {
    println!(
        "{} {} ({} of {} skill(s) found)",
        fmt_label("Group:", use_color),
        fmt_group(&group.name, use_color),
        group.resolved.len(),
        group.resolved.len() + group.missing.len()
    );
    if !group.missing.is_empty() {
        println!(
            "{} {}",
            fmt_warning("Missing remotely:", use_color),
            group.missing.join(", ")
        );
    }
    println!("{} {mode}", fmt_label("Mode:", use_color));
    println!();
}

/// Apply a selection to a group, failing when it leaves nothing.
fn chosen_skills(group: &GroupResolution, selection: &Selection) -> Result<Vec<ResolvedSkill>> {
    let chosen = choose_subset(&group.resolved, selection);
    if chosen.is_empty() {
        return Err(Error::NoSkillsSelected {
            group: group.name.clone(),
        });
    }
    Ok(chosen)
}
