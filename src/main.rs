#![forbid(unsafe_code)]
//! # srt_freqs CLI
//!
//! Outputs the frequency of each word that occurs in `.srt` files to a CSV report.
//!
//! ## Example
//! ```bash
//! srt_freqs episode01.srt
//! srt_freqs path/to/season --reference zipfFreqs.csv --open
//! ```
//!
//! See `--help` for all available options.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{error, warn};
use srt_freqs::{
    Corpus, DEFAULT_REFERENCE_FILE, Deviation, ExportFormat, FileTally, ReferenceCorpus, Result,
    RunSummary, SubtitleSource, analyze_file, analyze_parallel, collect_files, open_in_viewer,
    print_failed_files, save_report,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// A single .srt file, or a folder containing .srt files
    path: PathBuf,

    /// Report file (default: srt_frequencies.csv, or .tsv for TSV export)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Reference word-frequency table (columns: word, nchar, zipf, dominant PoS)
    #[arg(long, default_value = DEFAULT_REFERENCE_FILE)]
    reference: PathBuf,

    /// Do not compare against the reference table
    #[arg(long, default_value_t = false)]
    no_reference: bool,

    /// Output format for the report (csv, tsv)
    #[arg(long, default_value = "csv")]
    export_format: ExportFormat,

    /// Standard deviation used in printed summaries (sample, population)
    #[arg(long, default_value = "sample")]
    deviation: Deviation,

    /// Also write the run summary as JSON to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Analyze files in parallel (progress percentages are not shown)
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Do not print progress percentages
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Open the report with the default viewer when done
    #[arg(long, default_value_t = false)]
    open: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let sources = collect_files(&cli.path)?;
    if sources.len() > 1 {
        println!(
            "{} .srt files found in folder '{}'...",
            sources.len(),
            cli.path.display()
        );
    }

    let corpus = analyze(cli, sources);

    println!("Summary:");
    println!(
        " -{}/{} files successfully processed",
        corpus.processed().count(),
        corpus.files().len()
    );
    println!("{}", corpus.summary(cli.deviation));
    print_failed_files(&corpus);

    let reference = if cli.no_reference {
        None
    } else {
        load_reference(&cli.reference)
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(cli.export_format.default_file_name()));
    println!("Output to '{}':", output.display());
    save_report(&output, &corpus, reference.as_ref(), cli.export_format)?;
    println!(" -written to file");

    if let Some(path) = &cli.summary_json {
        RunSummary::new(&corpus, cli.deviation).save_json(path)?;
        println!(" -summary written to '{}'", path.display());
    }

    if cli.open {
        match open_in_viewer(&output) {
            Ok(()) => println!(" -opened"),
            Err(e) => {
                warn!("could not open report: {}", e);
                println!(" -could not open '{}'", output.display());
            }
        }
    }
    Ok(())
}

fn analyze(cli: &Cli, sources: Vec<SubtitleSource>) -> Corpus {
    let total = sources.len();
    if cli.parallel {
        let outcomes = analyze_parallel(&sources);
        let mut corpus = Corpus::new();
        for (i, (source, outcome)) in sources.into_iter().zip(outcomes).enumerate() {
            println!("File {}/{}: '{}'", i + 1, total, source.path.display());
            print_outcome(cli, &outcome);
            corpus.absorb(source, outcome);
        }
        return corpus;
    }

    let mut corpus = Corpus::new();
    for (i, source) in sources.into_iter().enumerate() {
        println!("File {}/{}: '{}'", i + 1, total, source.path.display());
        let outcome = analyze_file(&source, !cli.quiet);
        print_outcome(cli, &outcome);
        corpus.absorb(source, outcome);
    }
    corpus
}

fn print_outcome(cli: &Cli, outcome: &Result<FileTally>) {
    match outcome {
        Ok(tally) => println!("{}", tally.summary(cli.deviation)),
        Err(e) => println!(" -ERROR: Could not process as .srt format? ({})", e),
    }
}

fn load_reference(path: &Path) -> Option<ReferenceCorpus> {
    println!("Reference word frequency data from '{}':", path.display());
    match ReferenceCorpus::load(path) {
        Ok(reference) => {
            println!(" -imported {} entries", reference.len());
            Some(reference)
        }
        Err(e) => {
            warn!("{}", e);
            println!(
                " -Couldn't import from '{}'. Will analyse without reference data.",
                path.display()
            );
            None
        }
    }
}
