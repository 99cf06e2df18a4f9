//! Implementation of the `techskills init` command.

use std::{fs, path::Path};

use crate::{
    config::{Config, config_path},
    error::{Error, Result},
    paths::display_path,
};

/// Execute the init command.
pub async fn run(explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit)?;
    if path.is_file() {
        println!("Config already exists at {}", display_path(&path));
        return Ok(());
    }
    write_default(&path)?;
    println!("Created config at {}", display_path(&path));
    Ok(())
}

/// Write the built-in groups to `path`, creating parent directories.
fn write_default(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| Error::ConfigWrite {
            path: parent.to_path_buf(),
            source: error,
        })?;
    }
    let contents = Config::default().to_toml()?;
    fs::write(path, contents).map_err(|error| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: error,
    })
}
