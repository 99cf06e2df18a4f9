//! Implementation of the `techskills groups` command.

use std::path::Path;

use crate::{
    catalog::SkillCatalog,
    commands::{ColorChoice, connect},
    config::{Config, Credentials},
    error::Result,
    palette::{fmt_detail, fmt_group, fmt_ok, fmt_warning},
};

/// Execute the groups command.
pub async fn run(color: ColorChoice, config_path: Option<&Path>, offline: bool) -> Result<()> {
    let use_color = color.enabled();
    let config = Config::load(config_path)?;

    if offline {
        for (index, group) in config.groups().iter().enumerate() {
            println!("{}. {}", index + 1, fmt_group(&group.name, use_color));
            for label in &group.skills {
                println!("    {label}");
            }
        }
        return Ok(());
    }

    let credentials = Credentials::from_env()?;
    let client = connect(&config, &credentials).await?;
    let catalog = SkillCatalog::fetch(&client, &config).await?;
    print_catalog(&catalog, use_color);
    Ok(())
}

/// Print every group with its resolved and missing labels.
fn print_catalog(catalog: &SkillCatalog, use_color: bool) {
    for (index, group) in catalog.groups().iter().enumerate() {
        let total = group.resolved.len() + group.missing.len();
        let found = format!("{}/{} found", group.resolved.len(), total);
        println!(
            "{}. {} ({})",
            index + 1,
            fmt_group(&group.name, use_color),
            if group.missing.is_empty() {
                fmt_ok(&found, use_color)
            } else {
                fmt_warning(&found, use_color)
            }
        );
        for skill in &group.resolved {
            println!("    {} {}", skill.label, fmt_detail(&skill.id, use_color));
        }
        for label in &group.missing {
            println!("    {} {}", label, fmt_warning("(missing)", use_color));
        }
    }
}
