use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use logsift::Sift;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logsift", version, about = "Log field extraction, SQL shape dedup and UID counting")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Print run stats as JSON on stdout
    #[arg(long = "json", global = true, default_value_t = false)] json: bool,
    /// Disable progress bars
    #[arg(long = "no-progress", global = true, default_value_t = false)] no_progress: bool,
    /// Log files processed in parallel (`logs` only)
    #[arg(long = "concurrency", global = true, default_value_t = 1)] concurrency: usize,
    /// Rayon worker threads (defaults to the number of CPUs)
    #[arg(long = "threads", global = true)] threads: Option<usize>,
    /// File-name regex used when an input is a directory
    #[arg(long = "pattern", global = true)] pattern: Option<String>,
    /// Scratch directory for part files
    #[arg(long = "work-dir", global = true)] work_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the log fields of every line into one CSV
    Logs {
        /// Log files or directories (default: `logs/`, created if missing)
        inputs: Vec<PathBuf>,
        #[arg(long, short = 'o', default_value = "output.csv")] out: PathBuf,
    },
    /// Keep the first embedded SQL statement of every shape
    Sql {
        /// Log files or directories (default: `sqlFile/`, created if missing)
        inputs: Vec<PathBuf>,
        #[arg(long, short = 'o', default_value = "unique_sql.txt")] out: PathBuf,
        /// Marker that precedes the quoted statement
        #[arg(long = "marker")] marker: Option<String>,
        /// Treat `\"` inside a statement as part of it instead of its end
        #[arg(long = "escaped-quotes", default_value_t = false)] escaped_quotes: bool,
    },
    /// Split identifiers into unique ones and a duplicate report
    Uids {
        /// Identifier lists (one per line), files or directories (default: `uidFile/`, created if missing)
        inputs: Vec<PathBuf>,
        #[arg(long = "unique-out", default_value = "unique_uids.txt")] unique_out: PathBuf,
        #[arg(long = "report-out", default_value = "uid_report.txt")] report_out: PathBuf,
        /// Duplicate examples listed in the report
        #[arg(long = "examples", default_value_t = logsift::DEFAULT_EXAMPLE_LIMIT)] examples: usize,
    },
}

fn emit<T: Serialize + std::fmt::Debug>(json: bool, stats: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("{stats:#?}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    let mut sift = Sift::new()
        .progress(!common.no_progress)
        .file_concurrency(common.concurrency);
    if let Some(n) = common.threads {
        sift = sift.parallelism(n);
    }
    if let Some(p) = &common.pattern {
        sift = sift.input_pattern(p.clone());
    }
    if let Some(d) = &common.work_dir {
        sift = sift.work_dir(d);
    }

    match cli.command {
        Command::Logs { inputs, out } => {
            let stats = sift.progress_label("Extracting log fields").logs_to_csv(&inputs, &out)?;
            emit(common.json, &stats)?;
        }
        Command::Sql { inputs, out, marker, escaped_quotes } => {
            let mut sift = sift.progress_label("Deduplicating SQL").sql_escaped_quotes(escaped_quotes);
            if let Some(m) = marker {
                sift = sift.sql_marker(m);
            }
            let stats = sift.dedup_sql(&inputs, &out)?;
            emit(common.json, &stats)?;
        }
        Command::Uids { inputs, unique_out, report_out, examples } => {
            let stats = sift
                .progress_label("Counting UIDs")
                .example_limit(examples)
                .dedup_uids(&inputs, &unique_out, &report_out)?;
            emit(common.json, &stats)?;
        }
    }
    Ok(())
}
