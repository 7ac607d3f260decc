use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::reference::{NOT_AVAILABLE, ReferenceCorpus, ReferenceMatch};
use crate::stats::{Deviation, Summary};
use crate::tokens::{fpmw, zipf};
use crate::{Corpus, FileOutcome};

/// Delimiter flavour of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    /// Report file name used when no `--output` is given.
    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "srt_frequencies.csv",
            ExportFormat::Tsv => "srt_frequencies.tsv",
        }
    }
}

///Neutralizes cells a spreadsheet would evaluate as a formula by prefixing a single quote.
/// # Example
/// ```
/// use srt_freqs::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=SUM(A1)".to_string()), "'=SUM(A1)");
/// assert_eq!(csv_safe_cell("noun".to_string()), "noun");
/// ```
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Column headers for a report over `corpus`.
pub fn report_headers(corpus: &Corpus, with_reference: bool) -> Vec<String> {
    let mut headers: Vec<String> = ["Word", "Len", "N", "Proportion", "Fpmw", "Zipf"]
        .into_iter()
        .map(String::from)
        .collect();
    if with_reference {
        headers.extend(
            ["RefProportion", "RefFpmw", "RefZipf", "RefDomPoS"]
                .into_iter()
                .map(String::from),
        );
    }
    if corpus.files().len() > 1 {
        for suffix in ["N", "Fpmw", "Zipf"] {
            for file in corpus.files() {
                headers.push(csv_safe_cell(format!("{}_{suffix}", file.source().name)));
            }
        }
    }
    headers
}

/// Writes one row per unique word, most frequent first.
pub fn write_report<W: Write>(
    writer: W,
    corpus: &Corpus,
    reference: Option<&ReferenceCorpus>,
    format: ExportFormat,
) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);
    wtr.write_record(report_headers(corpus, reference.is_some()))?;

    let per_file = corpus.files().len() > 1;
    let total = corpus.total_words();
    for (word, count) in corpus.ranked_words() {
        let word_fpmw = fpmw(count, total);
        let mut row = vec![
            word.to_string(),
            word.chars().count().to_string(),
            count.to_string(),
            (count as f64 / total as f64).to_string(),
            word_fpmw.to_string(),
            zipf(word_fpmw).to_string(),
        ];
        if let Some(reference) = reference {
            let mut cells = reference
                .lookup(word)
                .map(|m| m.cells())
                .unwrap_or_else(ReferenceMatch::missing_cells);
            cells[3] = csv_safe_cell(std::mem::take(&mut cells[3]));
            row.extend(cells);
        }
        if per_file {
            row.extend(per_file_cells(corpus, word));
        }
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|e| Error::io("<report>", e))?;
    Ok(())
}

/// Count, fpmw and zipf blocks for one word, one column per file in each block.
fn per_file_cells(corpus: &Corpus, word: &str) -> Vec<String> {
    let files = corpus.files();
    let mut counts = Vec::with_capacity(files.len());
    let mut fpmws = Vec::with_capacity(files.len());
    let mut zipfs = Vec::with_capacity(files.len());
    for file in files {
        match file {
            FileOutcome::Failed { .. } => {
                counts.push(NOT_AVAILABLE.to_string());
                fpmws.push(NOT_AVAILABLE.to_string());
                zipfs.push(NOT_AVAILABLE.to_string());
            }
            FileOutcome::Processed(tally) => match tally.counts.get(word) {
                Some(&c) => {
                    let f = fpmw(c, tally.total_words);
                    counts.push(c.to_string());
                    fpmws.push(f.to_string());
                    zipfs.push(zipf(f).to_string());
                }
                None => {
                    counts.push("0".to_string());
                    fpmws.push("0".to_string());
                    zipfs.push("0".to_string());
                }
            },
        }
    }
    counts.extend(fpmws);
    counts.extend(zipfs);
    counts
}

///Save the report to path, truncating any previous run. Return the path written.
pub fn save_report(
    path: &Path,
    corpus: &Corpus,
    reference: Option<&ReferenceCorpus>,
    format: ExportFormat,
) -> Result<PathBuf> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_report(io::BufWriter::new(file), corpus, reference, format)?;
    log::info!("report written to {}", path.display());
    Ok(path.to_path_buf())
}

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Machine-readable summary of a whole run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub deviation: Deviation,
    pub processed: usize,
    pub failed: usize,
    pub global: Summary,
    pub files: Vec<FileSummary>,
}

impl RunSummary {
    pub fn new(corpus: &Corpus, kind: Deviation) -> Self {
        let files = corpus
            .files()
            .iter()
            .map(|file| match file {
                FileOutcome::Processed(tally) => FileSummary {
                    name: tally.source.name.clone(),
                    path: tally.source.path.clone(),
                    summary: Some(tally.summary(kind)),
                    error: None,
                },
                FileOutcome::Failed { source, reason } => FileSummary {
                    name: source.name.clone(),
                    path: source.path.clone(),
                    summary: None,
                    error: Some(reason.clone()),
                },
            })
            .collect();
        RunSummary {
            deviation: kind,
            processed: corpus.processed().count(),
            failed: corpus.failed().count(),
            global: corpus.summary(kind),
            files,
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        serde_json::to_writer_pretty(io::BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Opens `path` with the platform's default viewer.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut cmd = Command::new("xdg-open");

    let status = cmd.arg(path).status().map_err(|e| Error::io(path, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::io(
            path,
            io::Error::other(format!("viewer exited with {status}")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_safe_cell() {
        assert_eq!(csv_safe_cell("=X".into()), "'=X");
        assert_eq!(csv_safe_cell("+1".into()), "'+1");
        assert_eq!(csv_safe_cell("-dash.srt_N".into()), "'-dash.srt_N");
        assert_eq!(csv_safe_cell("@cmd".into()), "'@cmd");
        assert_eq!(csv_safe_cell("'@SAFE".into()), "'@SAFE");
        assert_eq!(csv_safe_cell("normal".into()), "normal");
        assert_eq!(csv_safe_cell(String::new()), "");
    }

    #[test]
    fn test_formats() {
        assert_eq!(ExportFormat::Csv.delimiter(), b',');
        assert_eq!(ExportFormat::Tsv.delimiter(), b'\t');
        assert_eq!(ExportFormat::default().default_file_name(), "srt_frequencies.csv");
    }
}
