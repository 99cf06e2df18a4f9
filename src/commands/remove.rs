//! Implementation of the `techskills remove` command.

use std::path::Path;

use crate::{
    catalog::SkillCatalog,
    commands::{
        ColorChoice,
        batch::{Batch, ChangeRule, run_batch},
        confirm, connect,
    },
    config::{Config, Credentials},
    error::Result,
    input::collect_identifiers,
    palette::{fmt_group, fmt_label},
};

/// Execute the remove command.
pub async fn run(
    color: ColorChoice,
    config_path: Option<&Path>,
    identifiers: &[String],
    file: Option<&Path>,
    group: &str,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let use_color = color.enabled();
    let identifiers = collect_identifiers(identifiers, file)?;
    let config = Config::load(config_path)?;
    let group_name = config.find_group(group)?.name.clone();
    let credentials = Credentials::from_env()?;

    let client = connect(&config, &credentials).await?;
    let catalog = SkillCatalog::fetch(&client, &config).await?;
    let group = catalog.target(&group_name)?;
    println!(
        "{} removing {} ({} skill(s))",
        fmt_label("Group:", use_color),
        fmt_group(&group.name, use_color),
        group.resolved.len()
    );
    println!();

    let batch = Batch {
        targets: &group.resolved,
        rule: ChangeRule::Strip,
        activate_inactive: false,
        skill_level: None,
        dry_run,
    };
    run_batch(&client, &identifiers, &batch, use_color, |prompt| {
        if yes { Ok(true) } else { confirm(prompt) }
    })
    .await?;
    Ok(())
}
