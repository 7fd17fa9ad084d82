//! Diagnostic tool for cc-manager.
//!
//! Implements `cc-manager doctor`, which walks every registered client and
//! config type and reports:
//! - whether the client directory exists,
//! - how many variants are present,
//! - the state of the active link.
//!
//! A missing directory only warns (the client may not be installed). Broken
//! links and unmanaged files at the link path count as issues.

use anstyle::AnsiColor;

use crate::registry::Client;
use crate::switch::{Engine, LinkStatus};
use crate::ui::{Mark, Ui};

/// Run the diagnostics, returning `true` when no issues were found
pub fn run_doctor(engine: &Engine, ui: &Ui) -> bool {
    ui.section("cc-manager Doctor");
    ui.newline();

    let mut healthy = true;
    for client in engine.registry().clients() {
        healthy &= check_step(ui, &client.name, || check_client(engine, client, ui));
    }
    healthy
}

fn check_client(engine: &Engine, client: &Client, ui: &Ui) -> bool {
    let dir = match engine.client_dir(&client.name) {
        Ok(dir) => dir,
        Err(e) => {
            ui.println(format!("  {} {}", ui.mark(Mark::Err), e));
            return false;
        }
    };

    if !dir.is_dir() {
        ui.println(format!(
            "  {} Directory missing: {} (client not installed?)",
            ui.mark(Mark::Warn),
            dir.display()
        ));
        return true;
    }
    ui.println(format!("  {} Directory: {}", ui.mark(Mark::Ok), dir.display()));

    let mut ok = true;
    for config_type in engine.registry().config_types() {
        if config_type.spec_for(&client.name).is_none() {
            continue;
        }
        ok &= check_config_type(engine, &client.name, &config_type.name, ui);
    }
    ok
}

fn check_config_type(engine: &Engine, client: &str, config_type: &str, ui: &Ui) -> bool {
    let count = match engine.list(client, config_type) {
        Ok(configs) => configs.len(),
        Err(e) => {
            ui.println(format!("  {} [{}] {}", ui.mark(Mark::Err), config_type, e));
            return false;
        }
    };

    let status = match engine.link_status(client, config_type) {
        Ok(status) => status,
        Err(e) => {
            ui.println(format!("  {} [{}] {}", ui.mark(Mark::Err), config_type, e));
            return false;
        }
    };

    let variants = ui.dim(format!("{} variant(s)", count));
    match status {
        LinkStatus::Missing => {
            ui.println(format!(
                "  {} [{}] no active link, {}",
                ui.mark(Mark::Info),
                config_type,
                variants
            ));
            true
        }
        LinkStatus::Symlink { target } => {
            match engine.get_current(client, config_type) {
                Ok(name) => ui.println(format!(
                    "  {} [{}] active: {}, {}",
                    ui.mark(Mark::Ok),
                    config_type,
                    name,
                    variants
                )),
                Err(_) => ui.println(format!(
                    "  {} [{}] link points outside the variant naming: {}",
                    ui.mark(Mark::Warn),
                    config_type,
                    target.display()
                )),
            }
            true
        }
        LinkStatus::BrokenSymlink { target } => {
            ui.println(format!(
                "  {} [{}] BROKEN link to {}",
                ui.mark(Mark::Err),
                config_type,
                target.display()
            ));
            false
        }
        LinkStatus::RegularFile | LinkStatus::Directory => {
            ui.println(format!(
                "  {} [{}] link path is not a symlink; switching is blocked until it is moved",
                ui.mark(Mark::Err),
                config_type
            ));
            false
        }
    }
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}
