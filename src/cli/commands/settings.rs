//! Settings command implementation.

use colored::Colorize;
use serde::Serialize;

use super::print_json;
use crate::config::{Settings, load_settings, resolve_settings_path, save_settings};
use crate::error::{Error, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsOutput {
    prepend: bool,
    copy_with_links: bool,
    path: String,
}

/// Show the settings, updating them first when any value is given.
///
/// # Errors
///
/// Returns `Error::Config` if the settings file cannot be read or written.
pub fn execute(prepend: Option<bool>, copy_with_links: Option<bool>, json: bool) -> Result<()> {
    let path = resolve_settings_path()
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;

    let changes = Settings {
        prepend,
        copy_with_links,
    };
    let settings = if changes == Settings::default() {
        load_settings(&path)?
    } else {
        save_settings(&path, &changes)?
    };
    let preferences = settings.preferences();

    if json {
        return print_json(&SettingsOutput {
            prepend: preferences.insert_mode.is_prepend(),
            copy_with_links: preferences.copy_with_links,
            path: path.display().to_string(),
        });
    }

    let on_off = |v: bool| if v { "on".green() } else { "off".dimmed() };
    println!("Add to start:    {}", on_off(preferences.insert_mode.is_prepend()));
    println!("Copy with links: {}", on_off(preferences.copy_with_links));
    println!("{}", path.display().to_string().dimmed());
    Ok(())
}
