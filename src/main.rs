use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;

use cc_manager::{
    commands::{self, ListOptions, Selection},
    logging,
    registry::Registry,
    switch::Engine,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "cc-manager")]
#[command(about = "Switch AI coding-assistant configurations via symbolic links")]
#[command(version)]
struct Cli {
    /// Client to operate on (default: claude)
    #[arg(short, long, global = true)]
    client: Option<String>,

    /// Config type to operate on (default: config)
    #[arg(short = 't', long = "type", global = true)]
    config_type: Option<String>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors
    #[arg(long, global = true, value_name = "WHEN", value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available configurations; the active one is marked with *
    #[command(visible_alias = "list")]
    Ls {
        /// Show file paths and modification times
        #[arg(short, long)]
        detail: bool,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch the active configuration
    Switch {
        /// Configuration name, e.g. `deepseek` for settings.deepseek.json
        /// (prompts when omitted)
        name: Option<String>,
    },

    /// Show the active configuration and the state of its link
    Current,

    /// List registered clients and their file patterns
    Clients,

    /// Check every client's links for problems
    Doctor,

    /// Generate a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// The CLI with `--client` and `--type` restricted to the names in `registry`
fn cli_command(registry: &Registry) -> Command {
    let clients: Vec<String> = registry.client_names().into_iter().map(String::from).collect();
    let config_types: Vec<String> = registry
        .config_type_names()
        .into_iter()
        .map(String::from)
        .collect();

    Cli::command()
        .mut_arg("client", |arg| arg.value_parser(PossibleValuesParser::new(clients)))
        .mut_arg("config_type", |arg| {
            arg.value_parser(PossibleValuesParser::new(config_types))
        })
}

fn main() -> Result<()> {
    let registry = Registry::builtin().context("Invalid built-in registry")?;

    let matches = cli_command(&registry).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    logging::init(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut cli_command(&registry),
            "cc-manager",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let engine = Engine::new(&registry);
    let ui = Ui::new(cli.color, cli.no_color);

    let client = match cli.client {
        Some(client) => client,
        None => registry
            .default_client()
            .context("No clients registered")?
            .name
            .clone(),
    };
    let config_type = match cli.config_type {
        Some(config_type) => config_type,
        None => registry
            .default_config_type()
            .context("No config types registered")?
            .name
            .clone(),
    };
    let sel = Selection {
        client: &client,
        config_type: &config_type,
    };

    match cli.command {
        Commands::Ls { detail, json } => {
            commands::list(&engine, sel, ListOptions { detail, json }, &ui)
        }
        Commands::Switch { name } => commands::switch(&engine, sel, name.as_deref(), &ui),
        Commands::Current => commands::current(&engine, sel, &ui),
        Commands::Clients => commands::clients(&engine, &ui),
        Commands::Doctor => commands::doctor(&engine, &ui),
        Commands::Completion { .. } => Ok(()),
    }
}
