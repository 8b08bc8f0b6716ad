//! Tally admin CLI
//!
//! Command-line front end of the admin editor:
//! - Show the current form, totals and trend
//! - Save edited values
//! - Reset every entry to zero
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tally::admin::{AdminEditor, AdminView};
use tally::storage::{FileStore, TallyStore};
use tally::{Config, ENTRY_COUNT};

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Edit the character tally")]
#[command(long_about = "Tally keeps six per-character values between 0 and 100.\nEvery save records how each value and the total moved since the previous save.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory shared with tally-ticker
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current values, totals and trend
    Show,

    /// Save values; unspecified entries keep their current value
    Save {
        /// Values for entries 1..=6 in order
        values: Vec<String>,
        /// Edit a single entry, e.g. --set 2=45
        #[arg(short, long = "set", value_parser = parse_edit)]
        set: Vec<(usize, String)>,
    },

    /// Reset every entry to zero
    Reset,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_edit(raw: &str) -> Result<(usize, String), String> {
    let (slot, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got {raw:?}"))?;
    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid entry index {slot:?}"))?;
    Ok((slot, value.to_string()))
}

fn print_view(view: &AdminView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{view}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
    }
    Ok(())
}

fn write_default_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = tally::generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("writing config to {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn open_editor(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<AdminEditor<FileStore>> {
    let config = Config::resolve(config_path)?;
    tally::logging::init(&config.logging)?;

    let data_dir = data_dir.unwrap_or_else(|| config.storage.data_path());
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    let records = TallyStore::with_keys(store, config.storage.record_keys());

    Ok(AdminEditor::load(records, config.labels()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let view = match cli.command {
        Commands::Config { output } => return write_default_config(output),

        Commands::Show => open_editor(config_path, cli.data_dir)?.view(),

        Commands::Save { values, set } => {
            if values.len() > ENTRY_COUNT {
                bail!("expected at most {ENTRY_COUNT} values, got {}", values.len());
            }

            let mut editor = open_editor(config_path, cli.data_dir)?;
            let mut form = editor.form();
            for (i, value) in values.into_iter().enumerate() {
                form.set(i + 1, value)?;
            }
            for (slot, value) in set {
                form.set(slot, value)?;
            }

            editor.save(form.fields()).context("saving snapshot")?
        }

        Commands::Reset => open_editor(config_path, cli.data_dir)?
            .reset()
            .context("resetting snapshot")?,
    };

    print_view(&view, cli.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        assert_eq!(parse_edit("2=45"), Ok((2, "45".to_string())));
        assert_eq!(parse_edit("6="), Ok((6, String::new())));
        assert!(parse_edit("45").is_err());
        assert!(parse_edit("x=1").is_err());
    }

    #[test]
    fn test_cli_parses_save() {
        let cli = Cli::try_parse_from(["tally", "save", "1", "2", "--set", "3=9", "-f", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Save { values, set } => {
                assert_eq!(values, vec!["1", "2"]);
                assert_eq!(set, vec![(3, "9".to_string())]);
            }
            _ => panic!("expected save"),
        }
    }
}
