//! Aldehyde home asset tracker.

mod config;
mod draft;
mod error;
mod export;

#[cfg(feature = "browse")]
mod browse;

use std::fs::OpenOptions;
use std::path::PathBuf;

use aldehyde_assets::{Asset, AssetId, AssetStore, LoadReport, StoreError};
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env, Target};

use crate::config::{log_path, resolve_assets_path};
use crate::draft::{Draft, Field};
use crate::error::AldError;
use crate::export::{export, ExportFormat, ExportOptions};

#[derive(Parser)]
#[command(name = "ald")]
#[command(about = "Track the things you own", long_about = None)]
struct Cli {
    /// Path to the assets file
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "browse")]
    /// Browse, search and edit assets interactively (default)
    Browse,

    /// List all assets
    List,

    /// Show assets whose name contains TEXT (case-insensitive)
    Search { text: String },

    /// Add an asset
    Add {
        name: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change fields of an asset
    Edit {
        id: AssetId,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete an asset
    Delete { id: AssetId },

    /// Report lines of the assets file that could not be read cleanly
    Check,

    /// Export assets to JSON or YAML
    Export {
        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn is_interactive(&self) -> bool {
        #[cfg(feature = "browse")]
        {
            matches!(self, Command::Browse)
        }
        #[cfg(not(feature = "browse"))]
        {
            false
        }
    }

    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Edit { .. } | Command::Delete { .. }
        )
    }
}

#[cfg(feature = "browse")]
fn default_command() -> Command {
    Command::Browse
}

#[cfg(not(feature = "browse"))]
fn default_command() -> Command {
    Command::List
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    location: Option<String>,

    /// Purchase date, YYYY-MM-DD (empty clears it)
    #[arg(long)]
    purchased: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Purchase value, stored as typed
    #[arg(long)]
    value: Option<String>,

    /// Warranty expiration date, YYYY-MM-DD (empty clears it)
    #[arg(long)]
    warranty: Option<String>,
}

impl FieldArgs {
    fn apply(self, draft: &mut Draft) {
        let updates = [
            (Field::Category, self.category),
            (Field::Location, self.location),
            (Field::PurchaseDate, self.purchased),
            (Field::Description, self.description),
            (Field::PurchaseValue, self.value),
            (Field::WarrantyDate, self.warranty),
        ];
        for (field, value) in updates {
            if let Some(value) = value {
                draft.set(field, value);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(default_command);

    init_logging(cli.verbose, cli.quiet, command.is_interactive());

    let path = resolve_assets_path(cli.file);
    let (mut store, mut report) = AssetStore::load(path);
    refuse_write_after_failed_read(&command, &mut report)?;

    match command {
        #[cfg(feature = "browse")]
        Command::Browse => browse::run(store, report)?,
        Command::List => print_assets(store.list().iter()),
        Command::Search { text } => print_assets(store.search(&text)),
        Command::Add { name, fields } => {
            let mut draft = Draft::default();
            draft.set(Field::Name, name);
            fields.apply(&mut draft);
            let id = store.append(draft.to_record()?)?;
            println!("Added {}", id);
        }
        Command::Edit { id, name, fields } => {
            let index = store.position(id).ok_or(AldError::AssetNotFound(id))?;
            let mut draft = Draft::from_record(&store.list()[index].record);
            if let Some(name) = name {
                draft.set(Field::Name, name);
            }
            fields.apply(&mut draft);
            store.update(index, draft.to_record()?)?;
            println!("Updated {}", id);
        }
        Command::Delete { id } => {
            let removed = store.delete(id).map_err(|e| match e {
                StoreError::SelectionRequired => AldError::AssetNotFound(id),
                other => other.into(),
            })?;
            println!("Deleted {} ({})", removed.record.name, removed.id);
        }
        Command::Check => {
            print_report(&store, &report);
            if let Some(err) = report.unavailable {
                return Err(AldError::from(err).into());
            }
        }
        Command::Export {
            format,
            compact,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            let options = ExportOptions { pretty: !compact };
            let content = export(store.list(), format, &options)?;

            match output {
                Some(path) => std::fs::write(path, content)?,
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Fails a mutating command up front with the read error itself.
/// The store refuses such writes too, reporting only `ReadOnly`.
fn refuse_write_after_failed_read(
    command: &Command,
    report: &mut LoadReport,
) -> Result<(), AldError> {
    if command.mutates() {
        if let Some(err) = report.unavailable.take() {
            return Err(err.into());
        }
    }
    Ok(())
}

/// Logs go to stderr, except in the browser where they would corrupt the screen.
fn init_logging(verbose: bool, quiet: bool, interactive: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    if interactive {
        let path = log_path();
        let file = path
            .parent()
            .map_or(Ok(()), |dir| std::fs::create_dir_all(dir))
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
        match file {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn print_assets<'a>(assets: impl IntoIterator<Item = &'a Asset>) {
    println!(
        "{:>5}  {:<24} {:<14} {:<14} {:<10}  {:>10}  {:<10}",
        "ID", "NAME", "CATEGORY", "LOCATION", "PURCHASED", "VALUE", "WARRANTY"
    );
    for asset in assets {
        let r = &asset.record;
        let date = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{:>5}  {:<24} {:<14} {:<14} {:<10}  {:>10}  {:<10}",
            asset.id.get(),
            r.name,
            r.category,
            r.location,
            date(r.purchase_date),
            r.purchase_value,
            date(r.warranty_expiration_date)
        );
    }
}

fn print_report(store: &AssetStore, report: &LoadReport) {
    println!("File: {}", store.path().display());
    if report.missing_file {
        println!("File does not exist yet");
    }
    if let Some(err) = &report.unavailable {
        println!("Unreadable: {}", err);
    }
    println!("Loaded: {}", report.loaded);
    println!("Assigned ids: {}", report.assigned_ids);

    if !report.skipped.is_empty() {
        println!("Skipped lines:");
        for d in &report.skipped {
            println!("  {}: {} ({})", d.line, d.error, d.content);
        }
    }
    if !report.degraded.is_empty() {
        println!("Dates treated as missing:");
        for d in &report.degraded {
            println!("  {}: {}", d.line, d.error);
        }
    }
    if report.is_clean() {
        println!("No problems found");
    }
}
