//! Implementation of the `techskills show` command.

use std::{collections::BTreeSet, path::Path};

use crate::{
    catalog::{GroupCoverage, SkillCatalog},
    commands::{ColorChoice, connect},
    config::{Config, Credentials},
    error::{Error, Result},
    model::{SkillLink, Technician},
    palette::{fmt_detail, fmt_group, fmt_heading, fmt_label, fmt_ok, fmt_skip, fmt_technician},
    remote::FieldService,
    resolve::{find_by_email, resolve_identifier},
};

/// Execute the show command.
pub async fn run(
    color: ColorChoice,
    config_path: Option<&Path>,
    identifier: &str,
    email: bool,
) -> Result<()> {
    let use_color = color.enabled();
    let config = Config::load(config_path)?;
    let credentials = Credentials::from_env()?;
    let client = connect(&config, &credentials).await?;

    let technician = lookup(&client, identifier, email).await?;
    let links = client.skill_links(&technician.id).await?;
    let catalog = SkillCatalog::fetch(&client, &config).await?;
    let current: BTreeSet<String> = links.iter().map(|link| link.skill_id.clone()).collect();

    print_technician(&technician, &links, use_color);
    print_coverage(&catalog.coverage(&current), use_color);
    Ok(())
}

/// Resolve the technician, through the owning user's email when asked.
async fn lookup(remote: &dyn FieldService, identifier: &str, email: bool) -> Result<Technician> {
    if !email {
        return resolve_identifier(remote, identifier).await;
    }
    find_by_email(remote, identifier)
        .await?
        .ok_or_else(|| Error::NotFound {
            identifier: identifier.to_string(),
        })
}

/// Print the technician and its current skills.
fn print_technician(technician: &Technician, links: &[SkillLink], use_color: bool) {
    let state = if technician.is_active {
        fmt_ok("active", use_color)
    } else {
        fmt_skip("inactive", use_color)
    };
    println!(
        "{} {} {}",
        fmt_technician(&technician.name, use_color),
        fmt_detail(&format!("[{}]", technician.id), use_color),
        state
    );
    if let Some(email) = &technician.email {
        println!("    {} {email}", fmt_label("email:", use_color));
    }
    println!();
    println!(
        "{}",
        fmt_heading(&format!("Current skills ({}):", links.len()), use_color)
    );
    for link in links {
        println!("    {} {}", link.label, fmt_detail(&link.skill_id, use_color));
    }
}

/// Print how much of each group the technician holds.
fn print_coverage(coverage: &[GroupCoverage], use_color: bool) {
    println!();
    println!("{}", fmt_heading("Groups:", use_color));
    for group in coverage {
        let count = format!("{}/{}", group.found, group.total);
        println!(
            "    {} {}",
            fmt_group(&group.name, use_color),
            if group.complete() {
                fmt_ok(&count, use_color)
            } else {
                fmt_detail(&count, use_color)
            }
        );
    }
}
