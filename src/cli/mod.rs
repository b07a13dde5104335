//! # CLI Module
//!
//! Command-line interface for fingerprint catalogs.
//!
//! ## Usage
//! ```bash
//! # Index, hash and export in one go
//! fingerprint run --name photos --search-path ~/Photos
//!
//! # Refresh size and mtime of every cached record
//! fingerprint hash --name photos --search-path ~/Photos --update
//!
//! # Start over
//! fingerprint run --name photos --search-path ~/Photos --recreate
//!
//! # JSON summary
//! fingerprint csv --name photos --search-path ~/Photos --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use file_fingerprint::core::dataset::{DataSet, HashSummary, IndexSummary};
use file_fingerprint::error::Result;
use file_fingerprint::events::{
    Event, EventChannel, EventReceiver, EventSender, ExportEvent, HashEvent, IndexEvent,
    PipelineEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

/// File Fingerprint - cache content hashes of a directory tree
#[derive(Parser, Debug)]
#[command(name = "fingerprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the index of the search path
    Index {
        #[command(flatten)]
        dataset: DataSetArgs,

        /// Rebuild the index even if one exists
        #[arg(long)]
        recreate: bool,
    },
    /// Create or refresh the hash record of every indexed file
    Hash {
        #[command(flatten)]
        dataset: DataSetArgs,

        /// Remove every cached record first
        #[arg(long)]
        recreate: bool,

        /// Reprocess files that already have a record
        #[arg(long)]
        update: bool,
    },
    /// Export the cached records as CSV
    Csv {
        #[command(flatten)]
        dataset: DataSetArgs,
    },
    /// Build the compressed table from the CSV
    Table {
        #[command(flatten)]
        dataset: DataSetArgs,
    },
    /// Run every stage: index, hash, CSV, table
    Run {
        #[command(flatten)]
        dataset: DataSetArgs,

        /// Remove the whole catalog first
        #[arg(long)]
        recreate: bool,

        /// Reprocess files that already have a record
        #[arg(long)]
        update: bool,
    },
}

#[derive(Args, Debug)]
struct DataSetArgs {
    /// Catalog name
    #[arg(short, long)]
    name: String,

    /// Directory tree to fingerprint
    #[arg(short, long)]
    search_path: PathBuf,

    /// Directory holding every catalog
    #[arg(short, long, default_value = ".")]
    metadata_root: PathBuf,

    /// Do not build the index when opening the catalog
    #[arg(long)]
    no_index: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// What a command produced, for the final report
#[derive(Default)]
struct Outcome {
    index: Option<IndexSummary>,
    hash: Option<HashSummary>,
    csv_rows: Option<usize>,
    table_rows: Option<usize>,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let (args, stage): (&DataSetArgs, Stage) = match &cli.command {
        Commands::Index { dataset, recreate } => (dataset, Stage::Index { recreate: *recreate }),
        Commands::Hash {
            dataset,
            recreate,
            update,
        } => (
            dataset,
            Stage::Hash {
                recreate: *recreate,
                update: *update,
            },
        ),
        Commands::Csv { dataset } => (dataset, Stage::Csv),
        Commands::Table { dataset } => (dataset, Stage::Table),
        Commands::Run {
            dataset,
            recreate,
            update,
        } => (
            dataset,
            Stage::Run {
                recreate: *recreate,
                update: *update,
            },
        ),
    };

    file_fingerprint::init_tracing(if args.verbose { "debug" } else { "warn" });
    run_stage(args, stage)
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Index { recreate: bool },
    Hash { recreate: bool, update: bool },
    Csv,
    Table,
    Run { recreate: bool, update: bool },
}

fn run_stage(args: &DataSetArgs, stage: Stage) -> Result<()> {
    let term = Term::stderr();
    let start_time = Instant::now();

    if matches!(args.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("File Fingerprint").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();
    let progress = matches!(args.output, OutputFormat::Pretty).then(new_progress_bar);
    let event_thread = spawn_event_thread(receiver, progress.clone(), args.verbose);

    let result = execute(args, stage, sender);

    // The sender lives inside the DataSet; once `execute` returns it is gone
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let outcome = result?;
    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, args, &outcome, start_time),
        OutputFormat::Json => print_json_results(args, &outcome, start_time),
    }

    Ok(())
}

fn execute(args: &DataSetArgs, stage: Stage, sender: EventSender) -> Result<Outcome> {
    let wipe = matches!(stage, Stage::Run { recreate: true, .. });
    let auto_index = !args.no_index && !matches!(stage, Stage::Index { .. });

    let dataset = DataSet::builder()
        .name(args.name.as_str())
        .search_path(&args.search_path)
        .metadata_root(&args.metadata_root)
        .recreate(wipe)
        .auto_index(auto_index)
        .events(sender)
        .open()?;

    let mut outcome = Outcome::default();
    match stage {
        Stage::Index { recreate } => {
            outcome.index = Some(dataset.build_index(recreate)?);
        }
        Stage::Hash { recreate, update } => {
            outcome.hash = Some(dataset.hash(recreate, update)?);
        }
        Stage::Csv => {
            outcome.csv_rows = Some(dataset.generate_csv()?);
        }
        Stage::Table => {
            outcome.table_rows = Some(dataset.generate_dataframe()?);
        }
        Stage::Run { update, .. } => {
            let summary = dataset.run(update)?;
            outcome.index = Some(summary.index);
            outcome.hash = Some(summary.hash);
            outcome.csv_rows = Some(summary.csv_rows);
            outcome.table_rows = Some(summary.table_rows);
        }
    }

    Ok(outcome)
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);
    pb
}

/// Drive the progress bar from pipeline events until every sender is dropped
fn spawn_event_thread(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = &progress else {
                continue;
            };

            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Index(IndexEvent::Started { .. }) => {
                    pb.set_length(0);
                    pb.set_position(0);
                }
                Event::Index(IndexEvent::FileIndexed { .. }) => {
                    pb.inc_length(1);
                    pb.inc(1);
                }
                Event::Index(IndexEvent::Error { path, message })
                | Event::Hash(HashEvent::Error { path, message }) => {
                    if verbose {
                        pb.println(format!(
                            "  {} {}: {}",
                            style("!").yellow().bold(),
                            path.display(),
                            message
                        ));
                    }
                }
                Event::Hash(HashEvent::Started { total_paths }) => {
                    pb.set_length(total_paths as u64);
                    pb.set_position(0);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(format!(
                            "{} (cached: {})",
                            p.current_path.file_name().unwrap_or_default().to_string_lossy(),
                            p.cache_hits
                        ));
                    }
                }
                Event::Hash(HashEvent::CorruptRecord { path, .. })
                | Event::Export(ExportEvent::RecordSkipped { path, .. }) => {
                    pb.println(format!(
                        "  {} corrupt record {}",
                        style("!").yellow().bold(),
                        path.display()
                    ));
                }
                _ => {}
            }
        }
    })
}

fn print_pretty_results(term: &Term, args: &DataSetArgs, outcome: &Outcome, start: Instant) {
    term.write_line(&format!(
        "{} {} done in {:.1}s",
        style("✓").green().bold(),
        style(&args.name).bold(),
        start.elapsed().as_secs_f64()
    ))
    .ok();
    term.write_line("").ok();

    if let Some(index) = &outcome.index {
        if index.reused {
            term.write_line(&format!("  {} index reused", style("•").dim())).ok();
        } else {
            term.write_line(&format!(
                "  {} files indexed",
                style(index.files_indexed).cyan()
            ))
            .ok();
        }
        if !index.errors.is_empty() {
            term.write_line(&format!(
                "  {} entries skipped while indexing",
                style(index.errors.len()).yellow()
            ))
            .ok();
        }
    }

    if let Some(hash) = &outcome.hash {
        term.write_line(&format!(
            "  {} records written, {} already cached",
            style(hash.processed).cyan(),
            style(hash.skipped).dim()
        ))
        .ok();
        if hash.corrupt > 0 {
            term.write_line(&format!(
                "  {} corrupt records regenerated",
                style(hash.corrupt).yellow()
            ))
            .ok();
        }
        if !hash.errors.is_empty() {
            term.write_line(&format!(
                "  {} files could not be hashed",
                style(hash.errors.len()).red()
            ))
            .ok();
            if args.verbose {
                for error in &hash.errors {
                    term.write_line(&format!("    {}", style(error).dim())).ok();
                }
            }
        }
    }

    if let Some(rows) = outcome.csv_rows {
        term.write_line(&format!("  {} rows in CSV", style(rows).cyan())).ok();
    }
    if let Some(rows) = outcome.table_rows {
        term.write_line(&format!("  {} rows in table", style(rows).cyan())).ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!(
            "Catalog: {}",
            args.metadata_root.join(&args.name).display()
        ))
        .dim()
    ))
    .ok();
}

fn print_json_results(args: &DataSetArgs, outcome: &Outcome, start: Instant) {
    let output = serde_json::json!({
        "name": args.name,
        "metadata_base": args.metadata_root.join(&args.name),
        "duration_ms": start.elapsed().as_millis() as u64,
        "index": outcome.index.as_ref().map(|index| serde_json::json!({
            "files_indexed": index.files_indexed,
            "reused": index.reused,
            "errors": index.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        })),
        "hash": outcome.hash.as_ref().map(|hash| serde_json::json!({
            "total_paths": hash.total_paths,
            "processed": hash.processed,
            "skipped": hash.skipped,
            "corrupt": hash.corrupt,
            "errors": hash.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "duration_ms": hash.duration_ms,
        })),
        "csv_rows": outcome.csv_rows,
        "table_rows": outcome.table_rows,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("failed to render summary: {e}"),
    }
}
