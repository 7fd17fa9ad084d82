//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. They call
//! into [`Engine`] for the actual work and render the result through
//! [`Ui`]; errors are returned with context so `main` can report them and
//! exit non-zero.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use chrono::Local;
use inquire::Select;

use crate::doctor::run_doctor;
use crate::switch::{ConfigInfo, Engine, LinkStatus};
use crate::ui::Ui;

/// The (client, config type) pair a command operates on
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub client: &'a str,
    pub config_type: &'a str,
}

impl std::fmt::Display for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.client, self.config_type)
    }
}

/// How `ls` renders its rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub detail: bool,
    pub json: bool,
}

/// List the variants of the selected client/type
pub fn list(engine: &Engine, sel: Selection, options: ListOptions, ui: &Ui) -> Result<()> {
    let configs = engine
        .list(sel.client, sel.config_type)
        .with_context(|| format!("Failed to list {} configurations", sel))?;

    if options.json {
        let json = serde_json::to_string_pretty(&configs)
            .context("Failed to serialize configuration list")?;
        ui.println(json);
        return Ok(());
    }

    if configs.is_empty() {
        ui.warn(format!("No configurations found for {}", sel));
        let dir = engine.client_dir(sel.client)?;
        let spec = engine.registry().find_file_spec(sel.client, sel.config_type)?;
        ui.println(format!(
            "Variants are files named {} in {}",
            ui.bold(&spec.pattern),
            dir.display()
        ));
        return Ok(());
    }

    ui.section(format!("Available {} configurations:", sel));
    ui.println(render_configs(&configs, options.detail, ui));
    Ok(())
}

fn render_configs(configs: &[ConfigInfo], detail: bool, ui: &Ui) -> String {
    let mut table = ui.simple_table();
    if detail {
        table.set_header(vec![
            ui.header_cell(""),
            ui.header_cell("Name"),
            ui.header_cell("Modified"),
            ui.header_cell("Path"),
        ]);
    }

    for config in configs {
        let marker = if config.is_current { ui.current_marker() } else { "" };
        let name_cell = if config.is_current {
            ui.colored_cell(format!("{} (current)", config.name), AnsiColor::Green)
        } else {
            ui.cell(&config.name)
        };

        let mut row = vec![ui.cell(marker), name_cell];
        if detail {
            let modified = config
                .modified
                .map(|m| m.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            row.push(ui.cell(modified));
            row.push(ui.cell(config.full_path.display().to_string()));
        }
        table.add_row(row);
    }

    table.to_string()
}

/// Switch the selected client/type, prompting for a name when none is given
pub fn switch(engine: &Engine, sel: Selection, name: Option<&str>, ui: &Ui) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => select_config(engine, sel)?,
    };

    let source = engine
        .switch(sel.client, sel.config_type, &name)
        .with_context(|| format!("Failed to switch {} to '{}'", sel, name))?;

    ui.ok(format!(
        "Switched {} to '{}' {}",
        sel,
        name,
        ui.dim(format!("({})", source.display()))
    ));
    Ok(())
}

/// Interactive picker over the available variants
fn select_config(engine: &Engine, sel: Selection) -> Result<String> {
    let configs = engine
        .list(sel.client, sel.config_type)
        .with_context(|| format!("Failed to list {} configurations", sel))?;

    if configs.is_empty() {
        bail!("No configurations found for {}.\nHint: Pass a name or create a variant file first.", sel);
    }

    let cursor = configs.iter().position(|c| c.is_current).unwrap_or(0);
    let names: Vec<String> = configs.into_iter().map(|c| c.name).collect();

    Select::new(&format!("Switch {} to:", sel), names)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Selection cancelled")
}

/// Show which variant is active and the state of the link
pub fn current(engine: &Engine, sel: Selection, ui: &Ui) -> Result<()> {
    let link = engine.link_path(sel.client, sel.config_type)?;
    let status = engine.link_status(sel.client, sel.config_type)?;

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("Client:"), ui.cell(sel.client)]);
    table.add_row(vec![ui.cell("Type:"), ui.cell(sel.config_type)]);
    table.add_row(vec![ui.cell("Link:"), ui.cell(link.display().to_string())]);

    let status_cell = match &status {
        LinkStatus::Missing => ui.colored_cell("missing", AnsiColor::Yellow),
        LinkStatus::RegularFile => ui.colored_cell("regular file (not managed)", AnsiColor::Yellow),
        LinkStatus::Directory => ui.colored_cell("directory (not managed)", AnsiColor::Red),
        LinkStatus::Symlink { target } => ui.cell(format!("symlink → {}", target.display())),
        LinkStatus::BrokenSymlink { target } => ui.colored_cell(
            format!("broken symlink → {}", target.display()),
            AnsiColor::Red,
        ),
    };
    table.add_row(vec![ui.cell("Status:"), status_cell]);

    let active_cell = match engine.get_current(sel.client, sel.config_type) {
        Ok(name) => ui.colored_cell(name, AnsiColor::Green),
        Err(e) => ui.colored_cell(format!("(none: {})", e), AnsiColor::Yellow),
    };
    table.add_row(vec![ui.cell("Active:"), active_cell]);

    ui.section("Current Configuration");
    ui.println(table.to_string());
    Ok(())
}

/// List registered clients and the config types each supports
pub fn clients(engine: &Engine, ui: &Ui) -> Result<()> {
    let registry = engine.registry();

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell("Client"),
        ui.header_cell("Directory"),
        ui.header_cell("Type"),
        ui.header_cell("Variants"),
        ui.header_cell("Link"),
    ]);

    for client in registry.clients() {
        let dir = engine.client_dir(&client.name)?;
        let mut first = true;
        for config_type in registry.config_types() {
            let Some(spec) = config_type.spec_for(&client.name) else {
                continue;
            };
            let (name, dir) = if first {
                (client.name.clone(), dir.display().to_string())
            } else {
                (String::new(), String::new())
            };
            first = false;
            table.add_row(vec![
                ui.cell(name),
                ui.cell(dir),
                ui.cell(&config_type.name),
                ui.cell(&spec.pattern),
                ui.cell(&spec.link_name),
            ]);
        }
    }

    ui.section("Registered clients");
    ui.println(table.to_string());
    Ok(())
}

/// Run diagnostics across every client and type
pub fn doctor(engine: &Engine, ui: &Ui) -> Result<()> {
    if run_doctor(engine, ui) {
        Ok(())
    } else {
        bail!("Doctor found issues")
    }
}
