//! # srt_freqs
//!
//! Word-frequency statistics for `.srt` subtitle files.
//!
//! The pipeline is: resolve the input path into subtitle files ([`collect_files`]),
//! analyze each file into a [`FileTally`] ([`analyze_file`]), fold the tallies into
//! a [`Corpus`], and write one report row per unique word ([`save_report`]),
//! optionally cross-referenced against a [`ReferenceCorpus`].
//!
//! ```no_run
//! use std::path::Path;
//! use srt_freqs::{Corpus, ExportFormat, analyze_file, collect_files, save_report};
//!
//! let sources = collect_files(Path::new("subs/")).unwrap();
//! let corpus = Corpus::from_outcomes(
//!     sources.into_iter().map(|s| { let r = analyze_file(&s, false); (s, r) }),
//! );
//! save_report(Path::new("srt_frequencies.csv"), &corpus, None, ExportFormat::Csv).unwrap();
//! ```

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

mod error;
mod reference;
mod report;
mod stats;
mod subtitle;
mod tokens;

pub use error::{Error, Result};
pub use reference::{
    DEFAULT_REFERENCE_FILE, NOT_AVAILABLE, ReferenceCorpus, ReferenceEntry, ReferenceMatch,
};
pub use report::{
    ExportFormat, FileSummary, RunSummary, csv_safe_cell, open_in_viewer, report_headers,
    save_report, write_report,
};
pub use stats::{Deviation, Spread, Summary, mean, std_dev};
pub use subtitle::{Subtitle, parse_srt, read_srt, strip_markup};
pub use tokens::{
    PER_MILLION, count_words, count_words_with, fpmw, fpmw_from_zipf, rank_words, tokenize,
    tokenize_into, trim_edges, zipf,
};

/// Extension (without the dot) of the files this crate analyzes.
pub const SUBTITLE_EXTENSION: &str = "srt";

/// A subtitle file to analyze, with the base name used to label its report columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleSource {
    pub path: PathBuf,
    pub name: String,
}

impl SubtitleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        SubtitleSource { path, name }
    }
}

fn has_subtitle_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SUBTITLE_EXTENSION))
        .unwrap_or(false)
}

///Resolves the command-line path into the list of files to analyze.
///A path ending in `.srt` is a single target; anything else is listed as a folder
///(non-recursively) and filtered for `.srt` files, sorted by path.
pub fn collect_files(path: &Path) -> Result<Vec<SubtitleSource>> {
    if has_subtitle_extension(path) {
        return Ok(vec![SubtitleSource::new(path)]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_subtitle_extension(e.path()))
        .map(|e| e.into_path())
        .collect();

    if files.is_empty() {
        return Err(Error::NoSubtitleFiles {
            folder: path.to_path_buf(),
        });
    }
    files.sort();
    log::debug!("{} subtitle files in {}", files.len(), path.display());
    Ok(files.into_iter().map(SubtitleSource::new).collect())
}

/// Word counts of one successfully analyzed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTally {
    pub source: SubtitleSource,
    pub subtitles: usize,
    /// Number of tokens; always equals the sum of `counts`.
    pub total_words: u64,
    pub counts: HashMap<String, u64>,
}

impl FileTally {
    /// Tallies the tokens of `subs`. With `progress`, percentages are written to stderr.
    pub fn from_subtitles(source: SubtitleSource, subs: &[Subtitle], progress: bool) -> Self {
        let mut tokens = Vec::new();
        for (i, sub) in subs.iter().enumerate() {
            tokenize_into(&sub.plain_text(), &mut tokens);
            if progress {
                report_progress("parsing", i, subs.len());
            }
        }
        let step = (tokens.len() / 100).max(1);
        let counts = count_words_with(&tokens, |i| {
            if progress && i % step == 0 {
                report_progress("analysing", i, tokens.len());
            }
        });
        if progress {
            clear_progress();
        }
        FileTally {
            source,
            subtitles: subs.len(),
            total_words: tokens.len() as u64,
            counts,
        }
    }

    pub fn summary(&self, kind: Deviation) -> Summary {
        Summary::from_counts(self.subtitles, &self.counts, self.total_words, kind)
    }
}

fn report_progress(stage: &str, done: usize, total: usize) {
    let percent = done as f64 / total.max(1) as f64 * 100.0;
    eprint!("  {stage}... {}%\r", percent.round());
    let _ = io::stderr().flush();
}

fn clear_progress() {
    eprint!("                                \r");
}

///Parses and tallies a single subtitle file.
pub fn analyze_file(source: &SubtitleSource, progress: bool) -> Result<FileTally> {
    let subs = read_srt(&source.path)?;
    Ok(FileTally::from_subtitles(source.clone(), &subs, progress))
}

///Analyzes every source on the rayon pool. Results come back in input order.
pub fn analyze_parallel(sources: &[SubtitleSource]) -> Vec<Result<FileTally>> {
    sources
        .par_iter()
        .map(|source| analyze_file(source, false))
        .collect()
}

/// What happened to one resolved file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Processed(FileTally),
    Failed {
        source: SubtitleSource,
        reason: String,
    },
}

impl FileOutcome {
    pub fn source(&self) -> &SubtitleSource {
        match self {
            FileOutcome::Processed(tally) => &tally.source,
            FileOutcome::Failed { source, .. } => source,
        }
    }
}

/// Global tallies folded from per-file outcomes, in resolution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    files: Vec<FileOutcome>,
    counts: HashMap<String, u64>,
    total_words: u64,
    subtitles: usize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file's outcome. Failed files keep their column but add no counts.
    pub fn absorb(&mut self, source: SubtitleSource, outcome: Result<FileTally>) {
        match outcome {
            Ok(tally) => {
                for (word, count) in &tally.counts {
                    *self.counts.entry(word.clone()).or_insert(0) += count;
                }
                self.total_words += tally.total_words;
                self.subtitles += tally.subtitles;
                self.files.push(FileOutcome::Processed(tally));
            }
            Err(e) => {
                log::warn!("could not process {}: {e}", source.path.display());
                self.files.push(FileOutcome::Failed {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (SubtitleSource, Result<FileTally>)>,
    {
        let mut corpus = Corpus::new();
        for (source, outcome) in outcomes {
            corpus.absorb(source, outcome);
        }
        corpus
    }

    pub fn files(&self) -> &[FileOutcome] {
        &self.files
    }

    pub fn processed(&self) -> impl Iterator<Item = &FileTally> {
        self.files.iter().filter_map(|f| match f {
            FileOutcome::Processed(tally) => Some(tally),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&SubtitleSource, &str)> {
        self.files.iter().filter_map(|f| match f {
            FileOutcome::Failed { source, reason } => Some((source, reason.as_str())),
            FileOutcome::Processed(_) => None,
        })
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    pub fn subtitles(&self) -> usize {
        self.subtitles
    }

    /// Unique words, most frequent first, ties by word ascending.
    pub fn ranked_words(&self) -> Vec<(&str, u64)> {
        rank_words(&self.counts)
    }

    pub fn summary(&self, kind: Deviation) -> Summary {
        Summary::from_counts(self.subtitles, &self.counts, self.total_words, kind)
    }
}

///Prints the files that could not be processed.
pub fn print_failed_files(corpus: &Corpus) {
    let failed: Vec<_> = corpus.failed().collect();
    if failed.is_empty() {
        return;
    }
    println!(
        " -Could not process the following {} files as .srt (check they are in unicode format?):",
        failed.len()
    );
    for (source, reason) in failed {
        println!("   '{}' ({reason})", source.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(text: &str) -> Subtitle {
        Subtitle {
            index: None,
            start_ms: 0,
            end_ms: 1,
            text: text.to_string(),
        }
    }

    fn tally(name: &str, texts: &[&str]) -> FileTally {
        let subs: Vec<Subtitle> = texts.iter().map(|t| sub(t)).collect();
        FileTally::from_subtitles(SubtitleSource::new(name), &subs, false)
    }

    #[test]
    fn test_tally_totals_match_counts() {
        let t = tally("a.srt", &["<i>Cat, dog!</i>", "CAT... 42"]);
        assert_eq!(t.subtitles, 2);
        assert_eq!(t.total_words, 3);
        assert_eq!(t.counts.values().sum::<u64>(), t.total_words);
        assert_eq!(t.counts["cat"], 2);
        assert_eq!(t.counts["dog"], 1);
    }

    #[test]
    fn test_corpus_fold_sums_per_file() {
        let a = tally("a.srt", &["the cat sat", "the end"]);
        let b = tally("b.srt", &["The dog"]);
        let bad = SubtitleSource::new("bad.srt");
        let corpus = Corpus::from_outcomes(vec![
            (a.source.clone(), Ok(a)),
            (
                bad.clone(),
                Err(Error::NotUnicode {
                    path: bad.path.clone(),
                }),
            ),
            (b.source.clone(), Ok(b)),
        ]);

        assert_eq!(corpus.files().len(), 3);
        assert_eq!(corpus.processed().count(), 2);
        assert_eq!(corpus.failed().count(), 1);
        assert_eq!(corpus.failed().next().unwrap().0.name, "bad.srt");
        assert_eq!(corpus.counts()["the"], 3);

        for (word, count) in corpus.counts() {
            let per_file: u64 = corpus
                .processed()
                .map(|t| t.counts.get(word).copied().unwrap_or(0))
                .sum();
            assert_eq!(*count, per_file, "global count for {word}");
        }
        let per_file_total: u64 = corpus.processed().map(|t| t.total_words).sum();
        assert_eq!(corpus.total_words(), per_file_total);
        assert_eq!(corpus.ranked_words()[0], ("the", 3));
    }

    #[test]
    fn test_source_name_is_base_name() {
        let s = SubtitleSource::new(Path::new("some").join("dir").join("ep1.srt"));
        assert_eq!(s.name, "ep1.srt");
    }

    #[test]
    fn test_collect_files_single_and_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.srt"), "").unwrap();
        std::fs::write(dir.path().join("a.SRT"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested.srt")).unwrap();

        let files = collect_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.SRT", "b.srt"]);

        let single = collect_files(&dir.path().join("missing.srt")).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_collect_files_empty_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let err = collect_files(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoSubtitleFiles { .. }));
        assert!(err.to_string().contains("No files found in folder"));
    }
}
